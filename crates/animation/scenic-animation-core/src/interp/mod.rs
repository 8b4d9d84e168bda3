//! Segment interpolation:
//! - `bezier`: arc-length sampled cubic curves
//! - `cache`: shared byte-budgeted curve cache
//! - `interpolator`: Linear / Bezier interpolators and their factory

pub mod bezier;
pub mod cache;
pub mod interpolator;

pub use bezier::{Bezier, BezierBuilder, DEFAULT_SUBDIVISIONS};
pub use cache::{CacheStats, CurveCache, CurveKey};
pub use interpolator::{BezierInterpolator, Interpolator, InterpolatorFactory};
