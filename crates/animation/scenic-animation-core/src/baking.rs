//! Baking API: sample parameters at a fixed frame step over a frame window.

use serde::{Deserialize, Serialize};

use crate::animation::Animation;
use crate::ids::ParameterId;
use crate::AnimationError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BakingConfig {
    /// First sampled frame; if None, uses the first keyframe.
    pub start_frame: Option<i64>,
    /// Last frame of the window (inclusive); if None, uses the last keyframe.
    pub end_frame: Option<i64>,
    /// Frames between samples.
    pub step: i64,
}

impl Default for BakingConfig {
    fn default() -> Self {
        Self {
            start_frame: None,
            end_frame: None,
            step: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BakedParameter {
    pub parameter: ParameterId,
    pub start_frame: i64,
    pub step: i64,
    /// Sampled values, `values[i]` at `start_frame + i * step`.
    pub values: Vec<f64>,
}

impl BakedParameter {
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Last sampled frame.
    pub fn end_frame(&self) -> Option<i64> {
        let last = self.values.len().checked_sub(1)?;
        i64::try_from(sample_frame_wide(self.start_frame, self.step, last)).ok()
    }

    /// The sample taken at `frame`, if `frame` lies on the sampling grid.
    pub fn value_at(&self, frame: i64) -> Option<f64> {
        let offset = frame.checked_sub(self.start_frame)?;
        if self.step <= 0 || offset < 0 || offset % self.step != 0 {
            return None;
        }
        self.values.get((offset / self.step) as usize).copied()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BakedAnimation {
    pub name: String,
    pub start_frame: i64,
    pub end_frame: i64,
    pub step: i64,
    pub parameters: Vec<BakedParameter>,
}

impl BakedAnimation {
    pub fn parameter(&self, id: ParameterId) -> Option<&BakedParameter> {
        self.parameters.iter().find(|p| p.parameter == id)
    }
}

/// Number of samples in `start..=end` every `step` frames.
fn sample_count(start: i64, end: i64, step: i64) -> Result<usize, AnimationError> {
    if step <= 0 {
        return Err(AnimationError::InvalidConfig {
            reason: format!("bake step must be positive, got {step}"),
        });
    }
    if end < start {
        return Err(AnimationError::InvalidConfig {
            reason: format!("bake window ends ({end}) before it starts ({start})"),
        });
    }
    let count = (i128::from(end) - i128::from(start)) / i128::from(step) + 1;
    u32::try_from(count)
        .map(|count| count as usize)
        .map_err(|_| AnimationError::InvalidConfig {
            reason: format!("bake window {start}..={end} every {step} frames has {count} samples"),
        })
}

#[inline]
fn sample_frame_wide(start: i64, step: i64, index: usize) -> i128 {
    i128::from(start) + index as i128 * i128::from(step)
}

/// Frame of sample `index`; stays within the window checked by `sample_count`.
#[inline]
fn sample_frame(start: i64, step: i64, index: usize) -> i64 {
    sample_frame_wide(start, step, index) as i64
}

/// Sample one parameter over `start..=end` every `step` frames.
pub fn bake_parameter(
    animation: &Animation,
    parameter: ParameterId,
    start: i64,
    end: i64,
    step: i64,
) -> Result<BakedParameter, AnimationError> {
    let count = sample_count(start, end, step)?;
    let mut values = Vec::with_capacity(count);
    for i in 0..count {
        values.push(animation.value_at_frame(parameter, sample_frame(start, step, i))?);
    }
    Ok(BakedParameter {
        parameter,
        start_frame: start,
        step,
        values,
    })
}

/// Bake every parameter of `animation`. Parameters without keys hold their
/// default value.
pub fn bake_animation(
    animation: &Animation,
    cfg: &BakingConfig,
) -> Result<BakedAnimation, AnimationError> {
    let (first, last) = animation.frame_range().unwrap_or((0, 0));
    let start = cfg.start_frame.unwrap_or(first);
    let end = cfg.end_frame.unwrap_or(last);
    let count = sample_count(start, end, cfg.step)?;

    let mut parameters = Vec::with_capacity(animation.parameter_count());
    for parameter in animation.parameters() {
        let baked = if parameter.key_count() == 0 {
            BakedParameter {
                parameter: parameter.id(),
                start_frame: start,
                step: cfg.step,
                values: vec![parameter.default_value(); count],
            }
        } else {
            parameter.bake(start, end, cfg.step)?
        };
        parameters.push(baked);
    }

    Ok(BakedAnimation {
        name: animation.name().to_string(),
        start_frame: start,
        end_frame: end,
        step: cfg.step,
        parameters,
    })
}
