//! Configuration for curve sampling, caching and tangent inference.

use serde::{Deserialize, Serialize};

use crate::value::ValueKind;
use crate::AnimationError;

const MB: usize = 1024 * 1024;

/// Engine configuration shared by an animation and its curve cache.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of chords used to build a Bezier arc-length table.
    pub curve_subdivisions: usize,
    /// Memory budget of the shared curve cache.
    pub curve_cache_bytes: usize,
    /// Fraction of the distance to a neighbouring key where inferred tangents sit.
    pub default_tangent_percent: f64,
    /// Cross-product magnitude below which three keys count as collinear.
    pub collinear_tolerance: f64,
    /// Kind of value created by `Animation::insert_keyframe`.
    pub default_value_kind: ValueKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            curve_subdivisions: 1000,
            curve_cache_bytes: 8 * MB,
            default_tangent_percent: 0.4,
            collinear_tolerance: 1e-9,
            default_value_kind: ValueKind::Bezier,
        }
    }
}

impl Config {
    /// Smaller tables and cache for constrained hosts.
    pub fn low_memory() -> Self {
        Self {
            curve_subdivisions: 200,
            curve_cache_bytes: MB,
            ..Self::default()
        }
    }

    /// Denser tables for offline rendering.
    pub fn high_quality() -> Self {
        Self {
            curve_subdivisions: 4000,
            curve_cache_bytes: 64 * MB,
            ..Self::default()
        }
    }

    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, AnimationError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AnimationError> {
        if self.curve_subdivisions == 0 {
            return Err(AnimationError::InvalidConfig {
                reason: "curve_subdivisions must be greater than 0".to_string(),
            });
        }

        if !(self.default_tangent_percent.is_finite()
            && (0.0..=1.0).contains(&self.default_tangent_percent))
        {
            return Err(AnimationError::InvalidConfig {
                reason: format!(
                    "default_tangent_percent must be within [0, 1], got {}",
                    self.default_tangent_percent
                ),
            });
        }

        if !self.collinear_tolerance.is_finite() || self.collinear_tolerance < 0.0 {
            return Err(AnimationError::InvalidConfig {
                reason: "collinear_tolerance must be finite and non-negative".to_string(),
            });
        }

        Ok(())
    }
}
