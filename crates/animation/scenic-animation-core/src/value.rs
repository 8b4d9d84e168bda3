//! Per-keyframe parameter values.
//!
//! A `ParameterValue` belongs to one parameter and sits in one keyframe
//! (which supplies its frame). The Bezier variant also carries in/out
//! tangents, either authored or inferred from the neighbouring keys.

use serde::{Deserialize, Serialize};

use crate::ids::ParameterId;
use crate::tangent::{infer_tangents, KeyPoint};

/// Fraction of the distance to a neighbouring key used when none is given.
pub const DEFAULT_TANGENT_PERCENT: f64 = 0.4;

/// Interpolation variant tag, as written by persistence layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Linear,
    Bezier,
}

impl ValueKind {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Bezier => "bezier",
        }
    }
}

/// Bezier tangent control: the control point's value, and how far toward
/// the neighbouring key (as a fraction of the frame gap) it sits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tangent {
    pub value: f64,
    pub percent: f64,
}

impl Tangent {
    #[inline]
    pub fn new(value: f64, percent: f64) -> Self {
        Self { value, percent }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ParameterValue {
    Linear {
        parameter: ParameterId,
        value: f64,
    },
    Bezier {
        parameter: ParameterId,
        value: f64,
        #[serde(rename = "in")]
        r#in: Tangent,
        out: Tangent,
        /// Tangents are re-inferred whenever neighbouring keys change.
        automatic: bool,
    },
}

impl ParameterValue {
    #[inline]
    pub fn linear(parameter: ParameterId, value: f64) -> Self {
        Self::Linear { parameter, value }
    }

    /// Bezier value whose tangents will be inferred from its neighbours.
    /// Until then both tangents sit flat on `value`.
    #[inline]
    pub fn bezier(parameter: ParameterId, value: f64) -> Self {
        Self::bezier_with_percent(parameter, value, DEFAULT_TANGENT_PERCENT)
    }

    pub(crate) fn bezier_with_percent(parameter: ParameterId, value: f64, percent: f64) -> Self {
        Self::Bezier {
            parameter,
            value,
            r#in: Tangent::new(value, percent),
            out: Tangent::new(value, percent),
            automatic: true,
        }
    }

    /// Bezier value with authored tangents; never re-inferred.
    #[inline]
    pub fn bezier_with_tangents(
        parameter: ParameterId,
        value: f64,
        r#in: Tangent,
        out: Tangent,
    ) -> Self {
        Self::Bezier {
            parameter,
            value,
            r#in,
            out,
            automatic: false,
        }
    }

    /// Build a value of the given kind with default tangents.
    pub fn of_kind(kind: ValueKind, parameter: ParameterId, value: f64, percent: f64) -> Self {
        match kind {
            ValueKind::Linear => Self::linear(parameter, value),
            ValueKind::Bezier => Self::bezier_with_percent(parameter, value, percent),
        }
    }

    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Linear { .. } => ValueKind::Linear,
            Self::Bezier { .. } => ValueKind::Bezier,
        }
    }

    #[inline]
    pub fn is_bezier(&self) -> bool {
        matches!(self, Self::Bezier { .. })
    }

    #[inline]
    pub fn parameter(&self) -> ParameterId {
        match self {
            Self::Linear { parameter, .. } | Self::Bezier { parameter, .. } => *parameter,
        }
    }

    #[inline]
    pub fn value(&self) -> f64 {
        match self {
            Self::Linear { value, .. } | Self::Bezier { value, .. } => *value,
        }
    }

    pub fn set_value(&mut self, new_value: f64) {
        match self {
            Self::Linear { value, .. } | Self::Bezier { value, .. } => *value = new_value,
        }
    }

    #[inline]
    pub fn in_tangent(&self) -> Option<Tangent> {
        match self {
            Self::Linear { .. } => None,
            Self::Bezier { r#in, .. } => Some(*r#in),
        }
    }

    #[inline]
    pub fn out_tangent(&self) -> Option<Tangent> {
        match self {
            Self::Linear { .. } => None,
            Self::Bezier { out, .. } => Some(*out),
        }
    }

    /// Author the in tangent. Turns automatic inference off.
    /// Returns false for linear values.
    pub fn set_in_tangent(&mut self, tangent: Tangent) -> bool {
        match self {
            Self::Linear { .. } => false,
            Self::Bezier {
                r#in, automatic, ..
            } => {
                *r#in = tangent;
                *automatic = false;
                true
            }
        }
    }

    /// Author the out tangent. Turns automatic inference off.
    /// Returns false for linear values.
    pub fn set_out_tangent(&mut self, tangent: Tangent) -> bool {
        match self {
            Self::Linear { .. } => false,
            Self::Bezier { out, automatic, .. } => {
                *out = tangent;
                *automatic = false;
                true
            }
        }
    }

    #[inline]
    pub fn is_automatic(&self) -> bool {
        matches!(self, Self::Bezier { automatic: true, .. })
    }

    pub fn set_automatic(&mut self, enabled: bool) {
        if let Self::Bezier { automatic, .. } = self {
            *automatic = enabled;
        }
    }

    /// Convert to the Bezier variant with automatic tangents (no-op if already Bezier).
    pub fn to_bezier(&self, percent: f64) -> Self {
        match self {
            Self::Linear { parameter, value } => Self::bezier_with_percent(*parameter, *value, percent),
            bezier => bezier.clone(),
        }
    }

    pub fn to_linear(&self) -> Self {
        Self::linear(self.parameter(), self.value())
    }

    /// Re-infer tangents from the neighbouring keys, keeping the stored
    /// tangent percents. Only automatic Bezier values change; returns
    /// whether anything did.
    pub fn smooth(
        &mut self,
        prev: Option<KeyPoint>,
        frame: i64,
        next: Option<KeyPoint>,
        tolerance: f64,
    ) -> bool {
        let Self::Bezier {
            value,
            r#in,
            out,
            automatic: true,
            ..
        } = self
        else {
            return false;
        };

        let curr = KeyPoint::new(frame as f64, *value);
        let (new_in, new_out) = infer_tangents(prev, curr, next, r#in.percent, out.percent, tolerance);
        let changed = new_in != *r#in || new_out != *out;
        *r#in = new_in;
        *out = new_out;
        changed
    }
}
