//! Immutable cubic Bezier curve with an arc-length lookup table.
//!
//! `point_at` takes a percent of the curve's *length*, not the raw
//! parameter `t`. The table maps one to the other so that evenly spaced
//! percents move at even speed along the curve, whatever the spacing of the
//! control points.

use crate::vector::Vector;
use crate::AnimationError;

/// Default number of chords sampled when building the length table.
pub const DEFAULT_SUBDIVISIONS: usize = 1000;

#[derive(Debug, Clone)]
pub struct Bezier<V: Vector> {
    begin: V,
    out: V,
    r#in: V,
    end: V,
    // Polynomial coefficients: a t^3 + b t^2 + c t + begin
    a: V,
    b: V,
    c: V,
    subdivisions: usize,
    percents: Vec<f64>,
    length: f64,
}

impl<V: Vector> Bezier<V> {
    /// Build a curve and its arc-length table.
    pub fn new(begin: V, out: V, r#in: V, end: V, subdivisions: usize) -> Result<Self, AnimationError> {
        if subdivisions == 0 {
            return Err(AnimationError::InvalidConfig {
                reason: "Bezier subdivisions must be greater than 0".to_string(),
            });
        }

        let c = out.sub(&begin).scale(3.0);
        let b = r#in.sub(&out).scale(3.0).sub(&c);
        let a = end.sub(&begin).sub(&c).sub(&b);

        let mut curve = Self {
            begin,
            out,
            r#in,
            end,
            a,
            b,
            c,
            subdivisions,
            percents: Vec::with_capacity(subdivisions + 1),
            length: 0.0,
        };
        curve.build_table();
        Ok(curve)
    }

    /// Start a builder; missing control points are reported by `build`.
    pub fn builder() -> BezierBuilder<V> {
        BezierBuilder::default()
    }

    fn build_table(&mut self) {
        let n = self.subdivisions;
        let mut previous = self.begin.clone();
        let mut accumulated = 0.0;
        self.percents.push(0.0);
        for i in 1..=n {
            let point = self.evaluate(i as f64 / n as f64);
            accumulated += point.distance(&previous);
            self.percents.push(accumulated);
            previous = point;
        }
        self.length = accumulated;

        if accumulated > 0.0 {
            for p in self.percents.iter_mut() {
                *p /= accumulated;
            }
        } else {
            // Degenerate curve: every point coincides, fall back to uniform t.
            for (i, p) in self.percents.iter_mut().enumerate() {
                *p = i as f64 / n as f64;
            }
        }

        if let Some(last) = self.percents.last_mut() {
            *last = 1.0;
        }
    }

    /// Raw polynomial evaluation at parameter `t`.
    #[inline]
    fn evaluate(&self, t: f64) -> V {
        let t2 = t * t;
        let t3 = t2 * t;
        self.a
            .scale(t3)
            .add(&self.b.scale(t2))
            .add(&self.c.scale(t))
            .add(&self.begin)
    }

    /// Point at `percent` of the curve's arc length.
    pub fn point_at(&self, percent: f64) -> Result<V, AnimationError> {
        check_percent(percent)?;

        let n = self.subdivisions;
        let i = self
            .percents
            .partition_point(|&p| p < percent)
            .clamp(1, n);
        let lo = self.percents[i - 1];
        let hi = self.percents[i];
        let local = if hi > lo { (percent - lo) / (hi - lo) } else { 0.0 };
        let t = ((i - 1) as f64 + local) / n as f64;
        Ok(self.evaluate(t))
    }

    /// Point at raw parameter `t`, without arc-length correction.
    pub fn point_at_t(&self, t: f64) -> Result<V, AnimationError> {
        check_percent(t)?;
        Ok(self.evaluate(t))
    }

    /// Total (chord-approximated) length of the curve.
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Normalised cumulative lengths, one per sample, `[0] == 0`, `[last] == 1`.
    #[inline]
    pub fn percents(&self) -> &[f64] {
        &self.percents
    }

    #[inline]
    pub fn subdivisions(&self) -> usize {
        self.subdivisions
    }

    #[inline]
    pub fn begin(&self) -> &V {
        &self.begin
    }

    #[inline]
    pub fn out(&self) -> &V {
        &self.out
    }

    #[inline]
    pub fn r#in(&self) -> &V {
        &self.r#in
    }

    #[inline]
    pub fn end(&self) -> &V {
        &self.end
    }

    /// Approximate heap + inline footprint, used by the curve cache budget.
    pub fn approx_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.percents.capacity() * std::mem::size_of::<f64>()
    }
}

#[inline]
pub(crate) fn check_percent(percent: f64) -> Result<(), AnimationError> {
    if (0.0..=1.0).contains(&percent) {
        Ok(())
    } else {
        Err(AnimationError::InvalidRange { percent })
    }
}

/// Collects control points that may not all be known yet.
#[derive(Debug, Clone)]
pub struct BezierBuilder<V: Vector> {
    begin: Option<V>,
    out: Option<V>,
    r#in: Option<V>,
    end: Option<V>,
    subdivisions: usize,
}

impl<V: Vector> Default for BezierBuilder<V> {
    fn default() -> Self {
        Self {
            begin: None,
            out: None,
            r#in: None,
            end: None,
            subdivisions: DEFAULT_SUBDIVISIONS,
        }
    }
}

impl<V: Vector> BezierBuilder<V> {
    pub fn begin(mut self, value: V) -> Self {
        self.begin = Some(value);
        self
    }

    pub fn out(mut self, value: V) -> Self {
        self.out = Some(value);
        self
    }

    pub fn r#in(mut self, value: V) -> Self {
        self.r#in = Some(value);
        self
    }

    pub fn end(mut self, value: V) -> Self {
        self.end = Some(value);
        self
    }

    pub fn subdivisions(mut self, subdivisions: usize) -> Self {
        self.subdivisions = subdivisions;
        self
    }

    pub fn build(self) -> Result<Bezier<V>, AnimationError> {
        let missing = |control: &str| AnimationError::MissingControlPoint {
            control: control.to_string(),
        };
        let begin = self.begin.ok_or_else(|| missing("begin"))?;
        let out = self.out.ok_or_else(|| missing("out"))?;
        let r#in = self.r#in.ok_or_else(|| missing("in"))?;
        let end = self.end.ok_or_else(|| missing("end"))?;
        Bezier::new(begin, out, r#in, end, self.subdivisions)
    }
}
