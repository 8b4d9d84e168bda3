use approx::assert_abs_diff_eq;
use scenic_animation_core::{
    infer_tangents, Animation, KeyPoint, ParameterValue, Tangent, ValueKind,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TangentCase {
    name: String,
    prev: KeyPoint,
    curr: KeyPoint,
    next: KeyPoint,
    #[serde(rename = "in")]
    r#in: Tangent,
    out: Tangent,
}

fn cases() -> Vec<TangentCase> {
    scenic_test_fixtures::tangents::load("inference").expect("load tangent inference fixture")
}

#[test]
fn fixture_has_all_shapes() {
    assert_eq!(cases().len(), 6);
}

#[test]
fn infer_tangents_matches_fixture() {
    for case in cases() {
        let (r#in, out) = infer_tangents(
            Some(case.prev),
            case.curr,
            Some(case.next),
            0.4,
            0.4,
            1e-9,
        );
        assert_abs_diff_eq!(r#in.value, case.r#in.value, epsilon = 1e-12);
        assert_abs_diff_eq!(out.value, case.out.value, epsilon = 1e-12);
        assert_eq!(r#in.percent, case.r#in.percent, "{}", case.name);
        assert_eq!(out.percent, case.out.percent, "{}", case.name);
    }
}

#[test]
fn keyed_animation_infers_fixture_tangents() {
    // Same geometry, but built through the editing API in shuffled order.
    for case in cases() {
        let mut animation = Animation::new(case.name.clone());
        let p = animation.add_parameter("camera.altitude", 0.0);
        for point in [case.next, case.prev, case.curr] {
            animation
                .set_value(p, point.frame as i64, point.value, ValueKind::Bezier, false)
                .expect("distinct frames");
        }

        let parameter = animation.parameter(p).unwrap();
        let stored = parameter
            .value_at_key(case.curr.frame as i64)
            .expect("middle key");
        let r#in = stored.in_tangent().unwrap();
        let out = stored.out_tangent().unwrap();
        assert!(stored.is_automatic());
        assert_abs_diff_eq!(r#in.value, case.r#in.value, epsilon = 1e-12);
        assert_abs_diff_eq!(out.value, case.out.value, epsilon = 1e-12);
    }
}

#[test]
fn boundary_keys_are_flat() {
    let (r#in, out) = infer_tangents(
        None,
        KeyPoint::new(0.0, 3.0),
        Some(KeyPoint::new(10.0, 8.0)),
        0.4,
        0.4,
        1e-9,
    );
    assert_eq!(r#in, Tangent::new(3.0, 0.4));
    assert_eq!(out, Tangent::new(3.0, 0.4));
}

#[test]
fn authored_tangents_survive_neighbour_edits() {
    let mut animation = Animation::new("authored");
    let p = animation.add_parameter("terrain.exaggeration", 1.0);
    animation.set_value(p, 0, 0.0, ValueKind::Bezier, false).unwrap();
    animation.set_value(p, 10, 10.0, ValueKind::Bezier, false).unwrap();
    animation
        .insert_value(
            5,
            ParameterValue::bezier_with_tangents(
                p,
                5.0,
                Tangent::new(1.0, 0.25),
                Tangent::new(9.0, 0.25),
            ),
            false,
        )
        .unwrap();

    animation.update_value(p, 10, 20.0).unwrap();

    let stored = animation.parameter(p).unwrap().value_at_key(5).unwrap().clone();
    assert!(!stored.is_automatic());
    assert_eq!(stored.in_tangent(), Some(Tangent::new(1.0, 0.25)));
    assert_eq!(stored.out_tangent(), Some(Tangent::new(9.0, 0.25)));
}
