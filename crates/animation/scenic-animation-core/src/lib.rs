//! Scenic Animation Core
//!
//! Keyframe animation of scalar scene parameters (camera position, fog,
//! terrain exaggeration, ...). An `Animation` owns parameters and
//! frame-sorted keyframes; each keyframe holds at most one linear or Bezier
//! value per parameter. Evaluating a parameter between keys runs a linear
//! or arc-length-parameterised Bezier interpolator over (frame, value)
//! points, with Bezier tables shared through a byte-budgeted LRU cache.
//! Edits fire change events that propagate from values to keyframes and
//! parameters and up to the animation.

pub mod animation;
pub mod baking;
pub mod config;
pub mod error;
pub mod event;
pub mod ids;
pub mod interp;
pub mod keyframe;
pub mod parameter;
pub mod tangent;
pub mod value;
pub mod vector;

// Re-exports for consumers
pub use animation::Animation;
pub use baking::{bake_animation, bake_parameter, BakedAnimation, BakedParameter, BakingConfig};
pub use config::Config;
pub use error::AnimationError;
pub use event::{
    ChangeEvent, ChangeKind, ChangeListener, Changeable, Listeners, PropagatingListener, Scope,
};
pub use ids::{IdAllocator, KeyFrameId, ListenerId, ParameterId};
pub use interp::{
    Bezier, BezierBuilder, BezierInterpolator, CacheStats, CurveCache, CurveKey, Interpolator,
    InterpolatorFactory, DEFAULT_SUBDIVISIONS,
};
pub use keyframe::KeyFrame;
pub use parameter::{Bracket, Parameter, ParameterRef};
pub use tangent::{classify, infer_tangents, KeyPoint, KeyShape};
pub use value::{ParameterValue, Tangent, ValueKind, DEFAULT_TANGENT_PERCENT};
pub use vector::{frame_point, FramePoint, Vector};

pub type Result<T> = core::result::Result<T, AnimationError>;
