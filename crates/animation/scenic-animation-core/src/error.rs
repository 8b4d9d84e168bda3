//! Error types for the keyframe animation core

use serde::{Deserialize, Serialize};

use crate::ids::{KeyFrameId, ParameterId};

/// Errors raised by curve evaluation, keyframe editing and parameter lookup.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AnimationError {
    /// Curve or interpolator evaluated outside [0, 1]
    #[error("Percent {percent} is out of range [0, 1]")]
    InvalidRange { percent: f64 },

    /// Bezier curve built without one of its four control values
    #[error("Bezier curve is missing its '{control}' control point")]
    MissingControlPoint { control: String },

    /// Evaluation requested for a parameter that has no keys
    #[error("Parameter {parameter:?} has no keyframes")]
    NoKeyframes { parameter: ParameterId },

    /// Insert at a frame that already holds a value for the parameter
    #[error("Parameter {parameter:?} already has a value at frame {frame}")]
    DuplicateKeyframe { parameter: ParameterId, frame: i64 },

    /// Unknown parameter handle or name
    #[error("Parameter not found: {parameter}")]
    ParameterNotFound { parameter: String },

    /// Unknown keyframe handle
    #[error("Keyframe not found: {keyframe:?}")]
    KeyFrameNotFound { keyframe: KeyFrameId },

    /// No value stored for the parameter at the frame
    #[error("No value for parameter {parameter:?} at frame {frame}")]
    ValueNotFound { parameter: ParameterId, frame: i64 },

    /// Invalid configuration or sampling arguments
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl AnimationError {
    /// Errors that indicate a bug in the caller rather than bad user input.
    ///
    /// Embedding applications surface the remaining kinds as validation
    /// messages; these two should be treated as assertions.
    #[inline]
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange { .. } | Self::MissingControlPoint { .. }
        )
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidRange { .. } | Self::MissingControlPoint { .. } => "curve",
            Self::NoKeyframes { .. } | Self::DuplicateKeyframe { .. } => "validation",
            Self::ParameterNotFound { .. }
            | Self::KeyFrameNotFound { .. }
            | Self::ValueNotFound { .. } => "data",
            Self::InvalidConfig { .. } => "config",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for AnimationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_programming_errors() {
        assert!(AnimationError::InvalidRange { percent: 1.5 }.is_programming_error());
        assert!(AnimationError::MissingControlPoint {
            control: "in".to_string()
        }
        .is_programming_error());
        assert!(!AnimationError::NoKeyframes {
            parameter: ParameterId(0)
        }
        .is_programming_error());
    }

    #[test]
    fn test_error_categories() {
        let duplicate = AnimationError::DuplicateKeyframe {
            parameter: ParameterId(2),
            frame: 10,
        };
        assert_eq!(duplicate.category(), "validation");

        let missing = AnimationError::KeyFrameNotFound {
            keyframe: KeyFrameId(4),
        };
        assert_eq!(missing.category(), "data");
    }

    #[test]
    fn test_serialization() {
        let error = AnimationError::InvalidRange { percent: -0.25 };
        let serialized = serde_json::to_string(&error).unwrap();
        let deserialized: AnimationError = serde_json::from_str(&serialized).unwrap();
        assert_eq!(error, deserialized);
    }

    #[test]
    fn test_display() {
        let error = AnimationError::DuplicateKeyframe {
            parameter: ParameterId(1),
            frame: 30,
        };
        assert_eq!(
            error.to_string(),
            "Parameter ParameterId(1) already has a value at frame 30"
        );
    }
}
