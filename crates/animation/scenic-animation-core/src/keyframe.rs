//! Keyframes: frame-anchored sets of parameter values.

use crate::event::{Changeable, Listeners, PropagatingListener, Scope};
use crate::ids::{KeyFrameId, ParameterId};
use crate::value::ParameterValue;

/// One authored frame holding at most one value per parameter.
///
/// Keyframes live in their `Animation`, sorted by frame; edits go through
/// the animation so parameter indices and inferred tangents stay in sync.
/// Listeners registered here see value events re-scoped to this keyframe.
#[derive(Debug)]
pub struct KeyFrame {
    id: KeyFrameId,
    frame: i64,
    // sorted by parameter id
    values: Vec<ParameterValue>,
    listeners: Listeners,
}

impl KeyFrame {
    pub(crate) fn new(id: KeyFrameId, frame: i64) -> Self {
        Self {
            id,
            frame,
            values: Vec::new(),
            listeners: Listeners::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> KeyFrameId {
        self.id
    }

    #[inline]
    pub fn frame(&self) -> i64 {
        self.frame
    }

    #[inline]
    pub(crate) fn set_frame(&mut self, frame: i64) {
        self.frame = frame;
    }

    /// Values in parameter order.
    #[inline]
    pub fn values(&self) -> &[ParameterValue] {
        &self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn position(&self, parameter: ParameterId) -> Result<usize, usize> {
        self.values
            .binary_search_by_key(&parameter, ParameterValue::parameter)
    }

    #[inline]
    pub fn contains(&self, parameter: ParameterId) -> bool {
        self.position(parameter).is_ok()
    }

    pub fn value(&self, parameter: ParameterId) -> Option<&ParameterValue> {
        self.position(parameter).ok().map(|i| &self.values[i])
    }

    pub(crate) fn value_mut(&mut self, parameter: ParameterId) -> Option<&mut ParameterValue> {
        match self.position(parameter) {
            Ok(i) => Some(&mut self.values[i]),
            Err(_) => None,
        }
    }

    /// Insert or replace; returns the replaced value.
    pub(crate) fn put_value(&mut self, value: ParameterValue) -> Option<ParameterValue> {
        match self.position(value.parameter()) {
            Ok(i) => Some(std::mem::replace(&mut self.values[i], value)),
            Err(i) => {
                self.values.insert(i, value);
                None
            }
        }
    }

    pub(crate) fn take_value(&mut self, parameter: ParameterId) -> Option<ParameterValue> {
        self.position(parameter).ok().map(|i| self.values.remove(i))
    }

    pub(crate) fn parameters(&self) -> Vec<ParameterId> {
        self.values.iter().map(ParameterValue::parameter).collect()
    }
}

impl Changeable for KeyFrame {
    #[inline]
    fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    #[inline]
    fn change_scope(&self) -> Scope {
        Scope::KeyFrame {
            keyframe: self.id,
            frame: self.frame,
        }
    }
}

impl PropagatingListener for KeyFrame {}
