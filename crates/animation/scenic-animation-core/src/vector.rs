//! Interpolable values used as Bezier control points.
//!
//! Two implementations ship with the crate:
//! - `f64` for plain scalar curves
//! - `FramePoint` (x = frame, y = value), the 2-D form used when evaluating
//!   keyframe segments so arc length is measured in (frame, value) space.

use std::fmt::Debug;
use std::hash::Hasher;

/// A 2-D point in (frame, value) space.
pub type FramePoint = nalgebra::Vector2<f64>;

/// Build a `FramePoint` from a frame and a value.
#[inline]
pub fn frame_point(frame: f64, value: f64) -> FramePoint {
    FramePoint::new(frame, value)
}

/// Minimal vector-space operations needed by curves and interpolators.
///
/// Every operation returns a new value; implementations must not mutate
/// `self` in a way callers can observe.
pub trait Vector: Clone + Debug + PartialEq + Send + Sync + 'static {
    fn add(&self, other: &Self) -> Self;

    fn sub(&self, other: &Self) -> Self;

    fn scale(&self, factor: f64) -> Self;

    /// Euclidean distance between two values.
    fn distance(&self, other: &Self) -> f64;

    /// Linear blend: `self` at 0, `other` at 1.
    #[inline]
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        self.add(&other.sub(self).scale(t))
    }

    /// Feed the bit pattern of every component into `state`.
    fn hash_bits<H: Hasher>(&self, state: &mut H);

    /// Component-wise bit equality, the key equality of the curve cache.
    fn bits_eq(&self, other: &Self) -> bool;
}

impl Vector for f64 {
    #[inline]
    fn add(&self, other: &Self) -> Self {
        self + other
    }

    #[inline]
    fn sub(&self, other: &Self) -> Self {
        self - other
    }

    #[inline]
    fn scale(&self, factor: f64) -> Self {
        self * factor
    }

    #[inline]
    fn distance(&self, other: &Self) -> f64 {
        (self - other).abs()
    }

    #[inline]
    fn hash_bits<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.to_bits());
    }

    #[inline]
    fn bits_eq(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl Vector for FramePoint {
    #[inline]
    fn add(&self, other: &Self) -> Self {
        *self + *other
    }

    #[inline]
    fn sub(&self, other: &Self) -> Self {
        *self - *other
    }

    #[inline]
    fn scale(&self, factor: f64) -> Self {
        *self * factor
    }

    #[inline]
    fn distance(&self, other: &Self) -> f64 {
        (*self - *other).norm()
    }

    #[inline]
    fn hash_bits<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.x.to_bits());
        state.write_u64(self.y.to_bits());
    }

    #[inline]
    fn bits_eq(&self, other: &Self) -> bool {
        self.x.to_bits() == other.x.to_bits() && self.y.to_bits() == other.y.to_bits()
    }
}
