//! Animation: arena owner of parameters and keyframes.
//!
//! Parameters are indexed by `ParameterId`; keyframes are kept sorted by
//! frame (one keyframe per frame) and addressed by `KeyFrameId`. All edits
//! go through the animation so that each parameter's key index, the
//! automatic tangents of neighbouring keys and the change events stay
//! consistent.

use std::sync::Arc;

use log::debug;

use crate::config::Config;
use crate::event::{ChangeEvent, ChangeKind, Changeable, Listeners, PropagatingListener, Scope};
use crate::ids::{IdAllocator, KeyFrameId, ParameterId};
use crate::interp::{CurveCache, Interpolator, InterpolatorFactory};
use crate::keyframe::KeyFrame;
use crate::parameter::{Bracket, Parameter, ParameterRef};
use crate::tangent::KeyPoint;
use crate::value::{ParameterValue, Tangent, ValueKind};
use crate::vector::{frame_point, FramePoint, Vector};
use crate::AnimationError;

#[derive(Debug)]
pub struct Animation {
    name: String,
    config: Config,
    ids: IdAllocator,
    parameters: Vec<Parameter>,
    keyframes: Vec<KeyFrame>,
    factory: InterpolatorFactory<FramePoint>,
    listeners: Listeners,
    propagation: bool,
}

impl Animation {
    /// New animation with the default config and its own curve cache.
    pub fn new(name: impl Into<String>) -> Self {
        let config = Config::default();
        let cache = Arc::new(CurveCache::from_config(&config));
        Self::build(name.into(), config, cache)
    }

    /// New animation with a validated config and its own curve cache.
    pub fn with_config(name: impl Into<String>, config: Config) -> Result<Self, AnimationError> {
        config.validate()?;
        let cache = Arc::new(CurveCache::from_config(&config));
        Ok(Self::build(name.into(), config, cache))
    }

    /// New animation sharing `cache` with other animations or threads.
    pub fn with_cache(
        name: impl Into<String>,
        config: Config,
        cache: Arc<CurveCache<FramePoint>>,
    ) -> Result<Self, AnimationError> {
        config.validate()?;
        Ok(Self::build(name.into(), config, cache))
    }

    fn build(name: String, config: Config, cache: Arc<CurveCache<FramePoint>>) -> Self {
        Self {
            name,
            factory: InterpolatorFactory::from_config(&config, cache),
            config,
            ids: IdAllocator::new(),
            parameters: Vec::new(),
            keyframes: Vec::new(),
            listeners: Listeners::new(),
            propagation: true,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn curve_cache(&self) -> &Arc<CurveCache<FramePoint>> {
        self.factory.cache()
    }

    /// Stop (or resume) forwarding child events to this animation's listeners.
    /// Keyframe and parameter listeners are still notified.
    #[inline]
    pub fn set_propagation(&mut self, enabled: bool) {
        self.propagation = enabled;
    }

    #[inline]
    pub fn propagation_enabled(&self) -> bool {
        self.propagation
    }

    // ----- parameters -----

    pub fn add_parameter(&mut self, name: impl Into<String>, default_value: f64) -> ParameterId {
        let id = self.ids.alloc_parameter();
        let name = name.into();
        debug!("animation '{}': added parameter {:?} '{}'", self.name, id, name);
        self.parameters.push(Parameter::new(id, name, default_value));
        let event = self.parameters[id.index()].fire_event(ChangeKind::Add, None);
        self.propagate(event);
        id
    }

    fn param(&self, id: ParameterId) -> Result<&Parameter, AnimationError> {
        self.parameters
            .get(id.index())
            .ok_or_else(|| AnimationError::ParameterNotFound {
                parameter: format!("{id:?}"),
            })
    }

    fn param_mut(&mut self, id: ParameterId) -> Result<&mut Parameter, AnimationError> {
        self.parameters
            .get_mut(id.index())
            .ok_or_else(|| AnimationError::ParameterNotFound {
                parameter: format!("{id:?}"),
            })
    }

    pub fn parameter(&self, id: ParameterId) -> Result<ParameterRef<'_>, AnimationError> {
        Ok(ParameterRef::new(self, self.param(id)?))
    }

    pub fn parameter_by_name(&self, name: &str) -> Option<ParameterRef<'_>> {
        self.parameters
            .iter()
            .find(|p| p.name() == name)
            .map(|p| ParameterRef::new(self, p))
    }

    pub fn parameters(&self) -> impl Iterator<Item = ParameterRef<'_>> + '_ {
        self.parameters.iter().map(move |p| ParameterRef::new(self, p))
    }

    #[inline]
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn rename_parameter(
        &mut self,
        id: ParameterId,
        name: impl Into<String>,
    ) -> Result<(), AnimationError> {
        let parameter = self.param_mut(id)?;
        parameter.set_name(name.into());
        let event = parameter.fire_event(ChangeKind::Change, None);
        self.propagate(event);
        Ok(())
    }

    /// Disabled parameters keep their keys but are skipped by `insert_keyframe`.
    pub fn set_parameter_enabled(
        &mut self,
        id: ParameterId,
        enabled: bool,
    ) -> Result<(), AnimationError> {
        let parameter = self.param_mut(id)?;
        if parameter.is_enabled() == enabled {
            return Ok(());
        }
        parameter.set_enabled(enabled);
        let event = parameter.fire_event(ChangeKind::Change, None);
        self.propagate(event);
        Ok(())
    }

    // ----- keyframes -----

    /// Keyframes sorted by frame.
    #[inline]
    pub fn keyframes(&self) -> &[KeyFrame] {
        &self.keyframes
    }

    fn keyframe_index(&self, id: KeyFrameId) -> Result<usize, AnimationError> {
        self.keyframes
            .iter()
            .position(|k| k.id() == id)
            .ok_or(AnimationError::KeyFrameNotFound { keyframe: id })
    }

    #[inline]
    fn keyframe_index_at(&self, frame: i64) -> Result<usize, usize> {
        self.keyframes.binary_search_by_key(&frame, KeyFrame::frame)
    }

    pub fn keyframe(&self, id: KeyFrameId) -> Result<&KeyFrame, AnimationError> {
        Ok(&self.keyframes[self.keyframe_index(id)?])
    }

    pub fn keyframe_at(&self, frame: i64) -> Option<&KeyFrame> {
        self.keyframe_index_at(frame)
            .ok()
            .map(|i| &self.keyframes[i])
    }

    /// First and last keyframe frames.
    pub fn frame_range(&self) -> Option<(i64, i64)> {
        match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => Some((first.frame(), last.frame())),
            _ => None,
        }
    }

    fn ensure_keyframe(&mut self, frame: i64) -> usize {
        match self.keyframe_index_at(frame) {
            Ok(idx) => idx,
            Err(idx) => {
                let id = self.ids.alloc_keyframe();
                debug!("animation '{}': added keyframe {:?} at frame {}", self.name, id, frame);
                self.keyframes.insert(idx, KeyFrame::new(id, frame));
                let event = self.keyframes[idx].fire_event(ChangeKind::Add, None);
                self.propagate(event);
                idx
            }
        }
    }

    /// Insert a keyframe at `frame` capturing the current value of every
    /// enabled parameter that has no key there yet. Parameters without any
    /// key contribute their default value.
    pub fn insert_keyframe(&mut self, frame: i64) -> Result<KeyFrameId, AnimationError> {
        self.insert_keyframe_as(frame, self.config.default_value_kind)
    }

    /// Like `insert_keyframe`, capturing values of the given kind.
    pub fn insert_keyframe_as(
        &mut self,
        frame: i64,
        kind: ValueKind,
    ) -> Result<KeyFrameId, AnimationError> {
        let mut captured = Vec::new();
        for parameter in self.parameters.iter().filter(|p| p.is_enabled()) {
            if parameter.has_key_at(frame) {
                continue;
            }
            let value = match self.value_at_frame(parameter.id(), frame) {
                Ok(value) => value,
                Err(AnimationError::NoKeyframes { .. }) => parameter.default_value(),
                Err(err) => return Err(err),
            };
            captured.push((parameter.id(), value));
        }

        let idx = self.ensure_keyframe(frame);
        let id = self.keyframes[idx].id();
        for (parameter, value) in captured {
            let value = ParameterValue::of_kind(
                kind,
                parameter,
                value,
                self.config.default_tangent_percent,
            );
            self.insert_value(frame, value, false)?;
        }
        Ok(id)
    }

    /// Remove a keyframe and every value it holds.
    ///
    /// `Remove` events for the values and then the keyframe itself are fired
    /// while everything is still linked.
    pub fn remove_keyframe(&mut self, id: KeyFrameId) -> Result<(), AnimationError> {
        let idx = self.keyframe_index(id)?;
        let frame = self.keyframes[idx].frame();
        let values: Vec<ParameterValue> = self.keyframes[idx].values().to_vec();

        for value in &values {
            self.notify_value(ChangeKind::Remove, idx, value.clone());
        }
        let event = self.keyframes[idx].fire_event(ChangeKind::Remove, None);
        self.propagate(event);

        debug!("animation '{}': removed keyframe {:?} at frame {}", self.name, id, frame);
        self.keyframes.remove(idx);
        for value in &values {
            let parameter = value.parameter();
            self.parameters[parameter.index()].remove_frame(frame);
            self.resmooth_around(parameter, frame);
        }
        Ok(())
    }

    /// Move a keyframe to `frame`.
    ///
    /// If another keyframe already sits at `frame` the values are merged into
    /// it, unless both hold a value for the same parameter, which fails with
    /// `DuplicateKeyframe`. Returns the id of the keyframe now holding the
    /// values.
    pub fn move_keyframe(
        &mut self,
        id: KeyFrameId,
        frame: i64,
    ) -> Result<KeyFrameId, AnimationError> {
        let idx = self.keyframe_index(id)?;
        let old_frame = self.keyframes[idx].frame();
        if old_frame == frame {
            return Ok(id);
        }

        if let Ok(target) = self.keyframe_index_at(frame) {
            let target_id = self.keyframes[target].id();
            if let Some(parameter) = self.keyframes[idx]
                .parameters()
                .into_iter()
                .find(|p| self.keyframes[target].contains(*p))
            {
                return Err(AnimationError::DuplicateKeyframe { parameter, frame });
            }
            let values = self.keyframes[idx].values().to_vec();
            self.remove_keyframe(id)?;
            for value in values {
                self.insert_value(frame, value, false)?;
            }
            return Ok(target_id);
        }

        debug!(
            "animation '{}': moving keyframe {:?} from frame {} to {}",
            self.name, id, old_frame, frame
        );
        let mut keyframe = self.keyframes.remove(idx);
        keyframe.set_frame(frame);
        let parameters = keyframe.parameters();
        let insert_at = self.keyframes.partition_point(|k| k.frame() < frame);
        self.keyframes.insert(insert_at, keyframe);

        for parameter in &parameters {
            let entry = &mut self.parameters[parameter.index()];
            entry.remove_frame(old_frame);
            entry.insert_frame(frame);
        }

        let event = self.keyframes[insert_at].fire_event(ChangeKind::Change, None);
        self.propagate(event);

        for parameter in parameters {
            self.resmooth_around(parameter, old_frame);
            self.resmooth_around(parameter, frame);
        }
        Ok(id)
    }

    // ----- values -----

    pub(crate) fn stored_value(
        &self,
        parameter: ParameterId,
        frame: i64,
    ) -> Result<&ParameterValue, AnimationError> {
        self.keyframe_at(frame)
            .and_then(|k| k.value(parameter))
            .ok_or(AnimationError::ValueNotFound { parameter, frame })
    }

    /// Key `parameter` at `frame` with a fresh value of `kind`.
    /// Automatic tangents are inferred from the neighbouring keys.
    pub fn set_value(
        &mut self,
        parameter: ParameterId,
        frame: i64,
        value: f64,
        kind: ValueKind,
        overwrite: bool,
    ) -> Result<KeyFrameId, AnimationError> {
        let value =
            ParameterValue::of_kind(kind, parameter, value, self.config.default_tangent_percent);
        self.insert_value(frame, value, overwrite)
    }

    /// Insert `value` at `frame`, creating the keyframe if needed.
    ///
    /// Fails with `DuplicateKeyframe` if the parameter already has a value at
    /// `frame` and `overwrite` is false.
    pub fn insert_value(
        &mut self,
        frame: i64,
        value: ParameterValue,
        overwrite: bool,
    ) -> Result<KeyFrameId, AnimationError> {
        let parameter = value.parameter();
        let keyed = self.param(parameter)?.has_key_at(frame);
        if keyed && !overwrite {
            return Err(AnimationError::DuplicateKeyframe { parameter, frame });
        }

        let idx = self.ensure_keyframe(frame);
        let snapshot = value.clone();
        let replaced = self.keyframes[idx].put_value(value);
        self.parameters[parameter.index()].insert_frame(frame);

        let kind = if replaced.is_some() {
            ChangeKind::Change
        } else {
            ChangeKind::Add
        };
        self.notify_value(kind, idx, snapshot);
        self.resmooth_around(parameter, frame);
        Ok(self.keyframes[idx].id())
    }

    /// Change the stored value of an existing key.
    pub fn update_value(
        &mut self,
        parameter: ParameterId,
        frame: i64,
        value: f64,
    ) -> Result<(), AnimationError> {
        self.edit_value(parameter, frame, |stored| stored.set_value(value))?;
        self.resmooth_around(parameter, frame);
        Ok(())
    }

    /// Author both tangents of a key, converting a linear value to Bezier.
    pub fn set_tangents(
        &mut self,
        parameter: ParameterId,
        frame: i64,
        r#in: Tangent,
        out: Tangent,
    ) -> Result<(), AnimationError> {
        self.edit_value(parameter, frame, |stored| {
            *stored = ParameterValue::bezier_with_tangents(parameter, stored.value(), r#in, out);
        })
    }

    /// Switch a key between linear and Bezier (automatic tangents).
    pub fn set_value_kind(
        &mut self,
        parameter: ParameterId,
        frame: i64,
        kind: ValueKind,
    ) -> Result<(), AnimationError> {
        let percent = self.config.default_tangent_percent;
        self.edit_value(parameter, frame, |stored| {
            *stored = match kind {
                ValueKind::Linear => stored.to_linear(),
                ValueKind::Bezier => stored.to_bezier(percent),
            };
        })?;
        self.resmooth_around(parameter, frame);
        Ok(())
    }

    fn edit_value<F>(&mut self, parameter: ParameterId, frame: i64, edit: F) -> Result<(), AnimationError>
    where
        F: FnOnce(&mut ParameterValue),
    {
        let idx = self
            .keyframe_index_at(frame)
            .map_err(|_| AnimationError::ValueNotFound { parameter, frame })?;
        let stored = self.keyframes[idx]
            .value_mut(parameter)
            .ok_or(AnimationError::ValueNotFound { parameter, frame })?;
        edit(&mut *stored);
        let snapshot = stored.clone();
        self.notify_value(ChangeKind::Change, idx, snapshot);
        Ok(())
    }

    /// Remove the key of `parameter` at `frame`.
    ///
    /// The `Remove` event is fired before the value is unlinked. The keyframe
    /// itself stays, even if it becomes empty.
    pub fn remove_value(
        &mut self,
        parameter: ParameterId,
        frame: i64,
    ) -> Result<ParameterValue, AnimationError> {
        let idx = self
            .keyframe_index_at(frame)
            .map_err(|_| AnimationError::ValueNotFound { parameter, frame })?;
        let snapshot = self.keyframes[idx]
            .value(parameter)
            .cloned()
            .ok_or(AnimationError::ValueNotFound { parameter, frame })?;

        self.notify_value(ChangeKind::Remove, idx, snapshot);

        let removed = self.keyframes[idx]
            .take_value(parameter)
            .ok_or(AnimationError::ValueNotFound { parameter, frame })?;
        self.parameters[parameter.index()].remove_frame(frame);
        self.resmooth_around(parameter, frame);
        Ok(removed)
    }

    // ----- evaluation -----

    /// Evaluate `parameter` at `frame`.
    ///
    /// Exact keys return their stored value untouched; frames outside the
    /// keyed range hold the nearest key; frames in between interpolate the
    /// bracketing segment.
    pub fn value_at_frame(&self, parameter: ParameterId, frame: i64) -> Result<f64, AnimationError> {
        match self.param(parameter)?.bracket(frame) {
            Bracket::Exact(frame) => Ok(self.stored_value(parameter, frame)?.value()),
            Bracket::Between {
                before: None,
                after: None,
            } => Err(AnimationError::NoKeyframes { parameter }),
            Bracket::Between {
                before: Some(held),
                after: None,
            }
            | Bracket::Between {
                before: None,
                after: Some(held),
            } => Ok(self.stored_value(parameter, held)?.value()),
            Bracket::Between {
                before: Some(before),
                after: Some(after),
            } => {
                let start = self.stored_value(parameter, before)?;
                let end = self.stored_value(parameter, after)?;
                let percent = frame_span(before, frame) / frame_span(before, after);
                let mut interpolator = self.segment_interpolator(before, start, after, end);
                Ok(interpolator.compute_value(percent)?.y)
            }
        }
    }

    /// Interpolator for the segment between two keys, in (frame, value) space.
    ///
    /// Bezier is used if either end is a Bezier value. A linear end
    /// contributes a control point on the straight chord.
    pub fn segment_interpolator(
        &self,
        start_frame: i64,
        start: &ParameterValue,
        end_frame: i64,
        end: &ParameterValue,
    ) -> Interpolator<FramePoint> {
        let begin = frame_point(start_frame as f64, start.value());
        let finish = frame_point(end_frame as f64, end.value());
        if !start.is_bezier() && !end.is_bezier() {
            return self.factory.linear(begin, finish);
        }

        let gap = frame_span(start_frame, end_frame);
        let percent = self.config.default_tangent_percent;
        let out = match start.out_tangent() {
            Some(t) => frame_point(start_frame as f64 + t.percent * gap, t.value),
            None => Vector::interpolate(&begin, &finish, percent),
        };
        let r#in = match end.in_tangent() {
            Some(t) => frame_point(end_frame as f64 - t.percent * gap, t.value),
            None => Vector::interpolate(&finish, &begin, percent),
        };
        self.factory.bezier(begin, out, r#in, finish)
    }

    // ----- internals -----

    /// Fire a value event through the parameter, the keyframe and then this
    /// animation.
    fn notify_value(&mut self, kind: ChangeKind, keyframe_idx: usize, value: ParameterValue) {
        let frame = self.keyframes[keyframe_idx].frame();
        let parameter = value.parameter();
        let event = ChangeEvent::new(kind, Scope::Value { parameter, frame }).with_value(value);

        if let Some(owner) = self.parameters.get_mut(parameter.index()) {
            owner.propagate(event.clone());
        }
        if let Some(keyframe_event) = self.keyframes[keyframe_idx].propagate(event) {
            self.propagate(keyframe_event);
        }
    }

    /// Re-infer automatic tangents of the keys next to `frame` (and at it).
    fn resmooth_around(&mut self, parameter: ParameterId, frame: i64) {
        let Some(owner) = self.parameters.get(parameter.index()) else {
            return;
        };
        let idx = owner.lower_bound(frame);
        let last = owner.key_count();
        for key in idx.saturating_sub(1)..(idx + 2).min(last) {
            self.resmooth_key(parameter, key);
        }
    }

    fn resmooth_key(&mut self, parameter: ParameterId, key: usize) {
        let frames = self.parameters[parameter.index()].frames();
        let frame = frames[key];
        let neighbour = |f: i64| {
            self.stored_value(parameter, f)
                .ok()
                .map(|v| KeyPoint::new(f as f64, v.value()))
        };
        let prev = key.checked_sub(1).and_then(|i| neighbour(frames[i]));
        let next = frames.get(key + 1).and_then(|&f| neighbour(f));

        let Ok(idx) = self.keyframe_index_at(frame) else {
            return;
        };
        let tolerance = self.config.collinear_tolerance;
        let snapshot = match self.keyframes[idx].value_mut(parameter) {
            Some(value) => {
                if !value.smooth(prev, frame, next, tolerance) {
                    return;
                }
                value.clone()
            }
            None => return,
        };
        self.notify_value(ChangeKind::Change, idx, snapshot);
    }
}

/// `to - from` as f64, without overflowing for frames near the i64 limits.
#[inline]
fn frame_span(from: i64, to: i64) -> f64 {
    (i128::from(to) - i128::from(from)) as f64
}

impl Changeable for Animation {
    #[inline]
    fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    #[inline]
    fn change_scope(&self) -> Scope {
        Scope::Animation
    }
}

impl PropagatingListener for Animation {
    fn handle_child_event(&mut self, _event: &ChangeEvent) -> bool {
        self.propagation
    }
}
