use crate::config::Config;
use crate::interp::bezier::{check_percent, Bezier, DEFAULT_SUBDIVISIONS};
use crate::interp::cache::CurveCache;
use crate::vector::Vector;
use crate::AnimationError;
use std::sync::Arc;

/// Segment interpolator: maps a percent in [0, 1] to a value.
#[derive(Debug, Clone)]
pub enum Interpolator<V: Vector> {
    Linear { start: V, end: V },
    Bezier(BezierInterpolator<V>),
}

impl<V: Vector> Interpolator<V> {
    #[inline]
    pub fn linear(start: V, end: V) -> Self {
        Self::Linear { start, end }
    }

    /// Uncached Bezier interpolator with the default table size.
    #[inline]
    pub fn bezier(begin: V, out: V, r#in: V, end: V) -> Self {
        Self::Bezier(BezierInterpolator::new(begin, out, r#in, end))
    }

    pub fn compute_value(&mut self, percent: f64) -> Result<V, AnimationError> {
        match self {
            Self::Linear { start, end } => {
                check_percent(percent)?;
                Ok(start.interpolate(end, percent))
            }
            Self::Bezier(bezier) => bezier.compute_value(percent),
        }
    }
}

/// Bezier interpolator that builds its curve lazily.
///
/// The first `compute_value` consults the shared cache (if any) and keeps the
/// curve in a local slot. Control setters clear the local slot only; stale
/// shared entries age out of the cache on their own.
#[derive(Debug, Clone)]
pub struct BezierInterpolator<V: Vector> {
    begin: Option<V>,
    out: Option<V>,
    r#in: Option<V>,
    end: Option<V>,
    subdivisions: usize,
    cache: Option<Arc<CurveCache<V>>>,
    curve: Option<Arc<Bezier<V>>>,
}

impl<V: Vector> Default for BezierInterpolator<V> {
    fn default() -> Self {
        Self {
            begin: None,
            out: None,
            r#in: None,
            end: None,
            subdivisions: DEFAULT_SUBDIVISIONS,
            cache: None,
            curve: None,
        }
    }
}

impl<V: Vector> BezierInterpolator<V> {
    pub fn new(begin: V, out: V, r#in: V, end: V) -> Self {
        Self {
            begin: Some(begin),
            out: Some(out),
            r#in: Some(r#in),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn with_subdivisions(mut self, subdivisions: usize) -> Self {
        self.subdivisions = subdivisions;
        self.curve = None;
        self
    }

    pub fn with_cache(mut self, cache: Arc<CurveCache<V>>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn set_begin(&mut self, value: V) {
        self.begin = Some(value);
        self.curve = None;
    }

    pub fn set_out(&mut self, value: V) {
        self.out = Some(value);
        self.curve = None;
    }

    pub fn set_in(&mut self, value: V) {
        self.r#in = Some(value);
        self.curve = None;
    }

    pub fn set_end(&mut self, value: V) {
        self.end = Some(value);
        self.curve = None;
    }

    /// Whether the curve has been built since the last control change.
    #[inline]
    pub fn is_built(&self) -> bool {
        self.curve.is_some()
    }

    /// The underlying curve, built (or fetched from the cache) on first use.
    pub fn curve(&mut self) -> Result<Arc<Bezier<V>>, AnimationError> {
        if let Some(curve) = &self.curve {
            return Ok(curve.clone());
        }

        let missing = |control: &str| AnimationError::MissingControlPoint {
            control: control.to_string(),
        };
        let begin = self.begin.as_ref().ok_or_else(|| missing("begin"))?;
        let out = self.out.as_ref().ok_or_else(|| missing("out"))?;
        let r#in = self.r#in.as_ref().ok_or_else(|| missing("in"))?;
        let end = self.end.as_ref().ok_or_else(|| missing("end"))?;

        let curve = match &self.cache {
            Some(cache) => cache.get_or_build(begin, out, r#in, end, self.subdivisions)?,
            None => Arc::new(Bezier::new(
                begin.clone(),
                out.clone(),
                r#in.clone(),
                end.clone(),
                self.subdivisions,
            )?),
        };
        self.curve = Some(curve.clone());
        Ok(curve)
    }

    pub fn compute_value(&mut self, percent: f64) -> Result<V, AnimationError> {
        check_percent(percent)?;
        self.curve()?.point_at(percent)
    }
}

/// Creates interpolators that share one curve cache and table size.
#[derive(Debug, Clone)]
pub struct InterpolatorFactory<V: Vector> {
    cache: Arc<CurveCache<V>>,
    subdivisions: usize,
}

impl<V: Vector> InterpolatorFactory<V> {
    pub fn new(cache: Arc<CurveCache<V>>, subdivisions: usize) -> Self {
        Self {
            cache,
            subdivisions,
        }
    }

    pub fn from_config(config: &Config, cache: Arc<CurveCache<V>>) -> Self {
        Self::new(cache, config.curve_subdivisions)
    }

    #[inline]
    pub fn cache(&self) -> &Arc<CurveCache<V>> {
        &self.cache
    }

    #[inline]
    pub fn linear(&self, start: V, end: V) -> Interpolator<V> {
        Interpolator::linear(start, end)
    }

    pub fn bezier(&self, begin: V, out: V, r#in: V, end: V) -> Interpolator<V> {
        Interpolator::Bezier(
            BezierInterpolator::new(begin, out, r#in, end)
                .with_subdivisions(self.subdivisions)
                .with_cache(self.cache.clone()),
        )
    }
}
