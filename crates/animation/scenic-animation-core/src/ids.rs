//! Handles for arena-stored parameters, keyframes and listeners.

use serde::{Deserialize, Serialize};

/// Index of a parameter in its owning animation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParameterId(pub u32);

/// Stable handle of a keyframe; survives re-sorting when frames move.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyFrameId(pub u32);

/// Token returned by `add_listener`, used to remove the listener again.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

impl ParameterId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Monotonic allocator for ParameterId and KeyFrameId.
/// Parameter ids are dense so they double as arena indices.
#[derive(Default, Debug, Clone)]
pub struct IdAllocator {
    next_parameter: u32,
    next_keyframe: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_parameter(&mut self) -> ParameterId {
        let id = ParameterId(self.next_parameter);
        self.next_parameter = self.next_parameter.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_keyframe(&mut self) -> KeyFrameId {
        let id = KeyFrameId(self.next_keyframe);
        self.next_keyframe = self.next_keyframe.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_parameter(), ParameterId(0));
        assert_eq!(alloc.alloc_parameter(), ParameterId(1));
        assert_eq!(alloc.alloc_keyframe(), KeyFrameId(0));
        assert_eq!(alloc.alloc_keyframe(), KeyFrameId(1));
        assert_eq!(ParameterId(1).index(), 1);
    }
}
