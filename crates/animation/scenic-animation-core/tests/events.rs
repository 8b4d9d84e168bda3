use scenic_animation_core::{
    Animation, ChangeEvent, ChangeKind, Changeable, ParameterValue, Scope, ValueKind,
};
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<ChangeEvent>>>;

fn recorder() -> (Log, impl Fn(&ChangeEvent) + Send + Sync + 'static) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    (log, move |event: &ChangeEvent| {
        sink.lock().unwrap().push(event.clone())
    })
}

fn keyed() -> (Animation, scenic_animation_core::ParameterId) {
    let mut animation = Animation::new("events");
    let p = animation.add_parameter("camera.latitude", 0.0);
    animation.set_value(p, 0, 10.0, ValueKind::Linear, false).unwrap();
    animation.set_value(p, 20, 30.0, ValueKind::Linear, false).unwrap();
    (animation, p)
}

#[test]
fn removing_a_value_notifies_parameter_keyframe_then_animation() {
    let (mut animation, p) = keyed();
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let sink = |log: &Log| {
        let log = log.clone();
        move |event: &ChangeEvent| log.lock().unwrap().push(event.clone())
    };
    animation.parameter(p).unwrap().add_listener(sink(&log));
    animation.keyframe_at(20).unwrap().add_listener(sink(&log));
    animation.add_listener(sink(&log));

    let removed = animation.remove_value(p, 20).unwrap();
    assert_eq!(removed, ParameterValue::linear(p, 30.0));

    let events = log.lock().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].scope, Scope::Parameter { parameter: p });
    assert!(matches!(events[1].scope, Scope::KeyFrame { frame: 20, .. }));
    assert_eq!(events[2].scope, Scope::Animation);
    for event in events.iter() {
        assert_eq!(event.kind, ChangeKind::Remove);
        assert_eq!(
            event.origin().scope,
            Scope::Value {
                parameter: p,
                frame: 20
            }
        );
        assert_eq!(event.value_snapshot(), Some(&removed));
    }
    assert_eq!(events[2].source.as_deref(), Some(&events[1]));

    // the keyframe outlives its last value
    assert!(animation.keyframe_at(20).unwrap().is_empty());
    assert_eq!(animation.parameter(p).unwrap().frames(), &[0]);
}

#[test]
fn value_events_reach_the_animation_through_the_keyframe() {
    let (mut animation, p) = keyed();
    let (log, listener) = recorder();
    animation.add_listener(listener);

    animation.update_value(p, 0, 12.0).unwrap();

    let events = log.lock().unwrap();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.kind, ChangeKind::Change);
    assert_eq!(event.scope, Scope::Animation);
    let keyframe = event.source.as_deref().unwrap();
    assert!(matches!(keyframe.scope, Scope::KeyFrame { frame: 0, .. }));
    assert_eq!(
        event.value_snapshot().map(ParameterValue::value),
        Some(12.0)
    );
}

#[test]
fn parameter_listeners_see_their_own_values() {
    let (mut animation, p) = keyed();
    let q = animation.add_parameter("fog.distance", 1.0);
    let (log, listener) = recorder();
    animation.parameter(p).unwrap().add_listener(listener);

    animation.set_value(q, 5, 2.0, ValueKind::Linear, false).unwrap();
    assert!(log.lock().unwrap().is_empty());

    animation.set_value(p, 5, 20.0, ValueKind::Linear, false).unwrap();
    let events = log.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ChangeKind::Add);
    assert_eq!(events[0].scope, Scope::Parameter { parameter: p });
}

#[test]
fn removing_a_keyframe_reports_values_then_keyframe() {
    let (mut animation, p) = keyed();
    let (log, listener) = recorder();
    animation.add_listener(listener);
    let id = animation.keyframe_at(20).unwrap().id();

    animation.remove_keyframe(id).unwrap();
    assert!(animation.keyframe_at(20).is_none());
    assert_eq!(animation.parameter(p).unwrap().frames(), &[0]);

    let events = log.lock().unwrap();
    let kinds: Vec<(ChangeKind, bool)> = events
        .iter()
        .map(|e| {
            let from_value = matches!(e.origin().scope, Scope::Value { .. });
            (e.kind, from_value)
        })
        .collect();
    assert_eq!(
        kinds,
        vec![(ChangeKind::Remove, true), (ChangeKind::Remove, false)]
    );
}

#[test]
fn disabled_propagation_stops_at_the_keyframe() {
    let (mut animation, p) = keyed();
    let (top, top_listener) = recorder();
    let (keyframe, keyframe_listener) = recorder();
    animation.add_listener(top_listener);
    animation.keyframe_at(0).unwrap().add_listener(keyframe_listener);

    animation.set_propagation(false);
    animation.update_value(p, 0, 11.0).unwrap();
    assert!(top.lock().unwrap().is_empty());
    assert_eq!(keyframe.lock().unwrap().len(), 1);

    animation.set_propagation(true);
    animation.update_value(p, 0, 13.0).unwrap();
    assert_eq!(top.lock().unwrap().len(), 1);
}

#[test]
fn new_keyframes_and_parameters_are_announced() {
    let mut animation = Animation::new("announce");
    let (log, listener) = recorder();
    animation.add_listener(listener);

    let p = animation.add_parameter("sun.azimuth", 0.0);
    animation.set_value(p, 3, 1.0, ValueKind::Linear, false).unwrap();

    let scopes: Vec<Scope> = log
        .lock()
        .unwrap()
        .iter()
        .map(|e| e.origin().scope.clone())
        .collect();
    assert_eq!(scopes.len(), 3);
    assert_eq!(scopes[0], Scope::Parameter { parameter: p });
    assert!(matches!(scopes[1], Scope::KeyFrame { frame: 3, .. }));
    assert!(matches!(scopes[2], Scope::Value { frame: 3, .. }));
}

#[test]
fn listeners_can_be_removed() {
    let (mut animation, p) = keyed();
    let (log, listener) = recorder();
    let id = animation.add_listener(listener);
    assert!(animation.remove_listener(id));
    animation.update_value(p, 0, 1.0).unwrap();
    assert!(log.lock().unwrap().is_empty());

    let (_, other) = recorder();
    animation.add_listener(other);
    animation.clear_listeners();
    assert!(animation.listeners().is_empty());
}
