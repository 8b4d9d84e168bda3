//! Animatable parameters and their read view.

use std::ops::Deref;

use crate::animation::Animation;
use crate::baking::{bake_parameter, BakedParameter};
use crate::event::{Changeable, Listeners, PropagatingListener, Scope};
use crate::ids::ParameterId;
use crate::value::ParameterValue;
use crate::AnimationError;

/// Where a frame falls among a parameter's keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    /// A key sits exactly on the frame.
    Exact(i64),
    /// Nearest keys strictly before and after the frame.
    Between {
        before: Option<i64>,
        after: Option<i64>,
    },
}

/// An animatable scalar property (camera latitude, fog distance, ...).
///
/// Keeps the sorted frames at which it has keys; the values themselves are
/// stored in the animation's keyframes.
#[derive(Debug)]
pub struct Parameter {
    id: ParameterId,
    name: String,
    default_value: f64,
    enabled: bool,
    frames: Vec<i64>,
    listeners: Listeners,
}

impl Parameter {
    pub(crate) fn new(id: ParameterId, name: String, default_value: f64) -> Self {
        Self {
            id,
            name,
            default_value,
            enabled: true,
            frames: Vec::new(),
            listeners: Listeners::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> ParameterId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Value captured by `insert_keyframe` before the parameter has any key.
    #[inline]
    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Frames holding a key, ascending.
    #[inline]
    pub fn frames(&self) -> &[i64] {
        &self.frames
    }

    #[inline]
    pub fn key_count(&self) -> usize {
        self.frames.len()
    }

    pub fn has_key_at(&self, frame: i64) -> bool {
        self.frames.binary_search(&frame).is_ok()
    }

    /// Locate `frame` among the keys (binary search).
    pub fn bracket(&self, frame: i64) -> Bracket {
        match self.frames.binary_search(&frame) {
            Ok(_) => Bracket::Exact(frame),
            Err(idx) => Bracket::Between {
                before: idx.checked_sub(1).map(|i| self.frames[i]),
                after: self.frames.get(idx).copied(),
            },
        }
    }

    /// Index of the first key at or after `frame`.
    #[inline]
    pub(crate) fn lower_bound(&self, frame: i64) -> usize {
        self.frames.partition_point(|f| *f < frame)
    }

    pub(crate) fn insert_frame(&mut self, frame: i64) {
        if let Err(idx) = self.frames.binary_search(&frame) {
            self.frames.insert(idx, frame);
        }
    }

    pub(crate) fn remove_frame(&mut self, frame: i64) {
        if let Ok(idx) = self.frames.binary_search(&frame) {
            self.frames.remove(idx);
        }
    }
}

impl Changeable for Parameter {
    #[inline]
    fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    #[inline]
    fn change_scope(&self) -> Scope {
        Scope::Parameter { parameter: self.id }
    }
}

impl PropagatingListener for Parameter {}

/// Borrowed view of a parameter together with its animation, giving access
/// to the parameter's values across all keyframes.
#[derive(Debug, Clone, Copy)]
pub struct ParameterRef<'a> {
    animation: &'a Animation,
    parameter: &'a Parameter,
}

impl<'a> ParameterRef<'a> {
    pub(crate) fn new(animation: &'a Animation, parameter: &'a Parameter) -> Self {
        Self {
            animation,
            parameter,
        }
    }

    #[inline]
    pub fn parameter(&self) -> &'a Parameter {
        self.parameter
    }

    /// `(frame, value)` for every key of this parameter, in frame order.
    pub fn keys(&self) -> impl Iterator<Item = (i64, &'a ParameterValue)> + 'a {
        let animation = self.animation;
        let id = self.parameter.id();
        self.parameter
            .frames()
            .iter()
            .filter_map(move |&frame| animation.stored_value(id, frame).ok().map(|v| (frame, v)))
    }

    /// The value stored at `frame`, if this parameter has a key there.
    pub fn value_at_key(&self, frame: i64) -> Option<&'a ParameterValue> {
        self.animation.stored_value(self.parameter.id(), frame).ok()
    }

    /// Evaluate the parameter at `frame`.
    pub fn value_at_frame(&self, frame: i64) -> Result<f64, AnimationError> {
        self.animation.value_at_frame(self.parameter.id(), frame)
    }

    /// Sample `value_at_frame` over `start..=end` every `step` frames.
    pub fn bake(&self, start: i64, end: i64, step: i64) -> Result<BakedParameter, AnimationError> {
        bake_parameter(self.animation, self.parameter.id(), start, end, step)
    }
}

impl Deref for ParameterRef<'_> {
    type Target = Parameter;

    fn deref(&self) -> &Parameter {
        self.parameter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameter_with(frames: &[i64]) -> Parameter {
        let mut parameter = Parameter::new(ParameterId(0), "fog.distance".to_string(), 0.0);
        for &frame in frames {
            parameter.insert_frame(frame);
        }
        parameter
    }

    #[test]
    fn frames_stay_sorted_without_duplicates() {
        let mut parameter = parameter_with(&[30, 10, 20, 10]);
        assert_eq!(parameter.frames(), &[10, 20, 30]);
        parameter.remove_frame(20);
        parameter.remove_frame(25);
        assert_eq!(parameter.frames(), &[10, 30]);
        assert!(parameter.has_key_at(30));
        assert_eq!(parameter.lower_bound(11), 1);
    }

    #[test]
    fn bracket_finds_neighbours() {
        let parameter = parameter_with(&[10, 30]);
        assert_eq!(parameter.bracket(10), Bracket::Exact(10));
        assert_eq!(
            parameter.bracket(20),
            Bracket::Between {
                before: Some(10),
                after: Some(30)
            }
        );
        assert_eq!(
            parameter.bracket(5),
            Bracket::Between {
                before: None,
                after: Some(10)
            }
        );
        assert_eq!(
            parameter.bracket(31),
            Bracket::Between {
                before: Some(30),
                after: None
            }
        );
        assert_eq!(
            parameter_with(&[]).bracket(0),
            Bracket::Between {
                before: None,
                after: None
            }
        );
    }
}
