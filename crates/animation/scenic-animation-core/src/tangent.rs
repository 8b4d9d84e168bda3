//! Automatic Bezier tangent inference.
//!
//! Keys are treated as 2-D points (frame, value). Given a key and its
//! neighbours, the in/out tangent values are placed on a line through the
//! key so that the curve passes through smoothly without overshooting:
//! - missing neighbour: flat tangents
//! - collinear neighbours: tangents along that line
//! - strictly monotonic: tangents parallel to the prev→next chord
//! - anything else (extremum or plateau): flat tangents

use log::trace;
use serde::{Deserialize, Serialize};

use crate::value::Tangent;

/// A key projected into (frame, value) space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyPoint {
    pub frame: f64,
    pub value: f64,
}

impl KeyPoint {
    #[inline]
    pub fn new(frame: f64, value: f64) -> Self {
        Self { frame, value }
    }
}

/// Geometry of a key relative to its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyShape {
    /// A neighbour is missing.
    Boundary,
    Collinear,
    Monotonic,
    /// Local extremum, or a flat run on one side.
    Turning,
}

/// Classify `curr` against its neighbours.
pub fn classify(
    prev: Option<KeyPoint>,
    curr: KeyPoint,
    next: Option<KeyPoint>,
    tolerance: f64,
) -> KeyShape {
    let (Some(prev), Some(next)) = (prev, next) else {
        return KeyShape::Boundary;
    };

    let (ax, ay) = (curr.frame - prev.frame, curr.value - prev.value);
    let (bx, by) = (next.frame - curr.frame, next.value - curr.value);
    let cross = ax * by - ay * bx;
    if cross.abs() <= tolerance {
        return KeyShape::Collinear;
    }

    let rising = ay > 0.0 && by > 0.0;
    let falling = ay < 0.0 && by < 0.0;
    if rising || falling {
        KeyShape::Monotonic
    } else {
        KeyShape::Turning
    }
}

/// Infer `(in, out)` tangents for `curr`.
///
/// `in_percent`/`out_percent` are the fractions of the frame distance to
/// the previous/next key at which the tangent control points sit.
pub fn infer_tangents(
    prev: Option<KeyPoint>,
    curr: KeyPoint,
    next: Option<KeyPoint>,
    in_percent: f64,
    out_percent: f64,
    tolerance: f64,
) -> (Tangent, Tangent) {
    let shape = classify(prev, curr, next, tolerance);
    let flat = (
        Tangent::new(curr.value, in_percent),
        Tangent::new(curr.value, out_percent),
    );

    let tangents = match (shape, prev, next) {
        (KeyShape::Collinear | KeyShape::Monotonic, Some(prev), Some(next)) => {
            let span = next.frame - prev.frame;
            if span == 0.0 {
                flat
            } else {
                let slope = (next.value - prev.value) / span;
                let in_value = curr.value - slope * in_percent * (curr.frame - prev.frame);
                let out_value = curr.value + slope * out_percent * (next.frame - curr.frame);
                (
                    Tangent::new(in_value, in_percent),
                    Tangent::new(out_value, out_percent),
                )
            }
        }
        _ => flat,
    };

    trace!(
        "inferred {:?} tangents at frame {}: in={} out={}",
        shape,
        curr.frame,
        tangents.0.value,
        tangents.1.value
    );
    tangents
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn kp(frame: f64, value: f64) -> KeyPoint {
        KeyPoint::new(frame, value)
    }

    #[test]
    fn classifies_shapes() {
        let tol = 1e-9;
        assert_eq!(
            classify(None, kp(0.0, 1.0), Some(kp(1.0, 2.0)), tol),
            KeyShape::Boundary
        );
        assert_eq!(
            classify(Some(kp(0.0, 0.0)), kp(5.0, 5.0), Some(kp(10.0, 10.0)), tol),
            KeyShape::Collinear
        );
        assert_eq!(
            classify(Some(kp(0.0, 0.0)), kp(1.0, 5.0), Some(kp(10.0, 10.0)), tol),
            KeyShape::Monotonic
        );
        assert_eq!(
            classify(Some(kp(0.0, 10.0)), kp(5.0, 15.0), Some(kp(10.0, 10.0)), tol),
            KeyShape::Turning
        );
        assert_eq!(
            classify(Some(kp(0.0, 5.0)), kp(5.0, 5.0), Some(kp(10.0, 12.0)), tol),
            KeyShape::Turning
        );
    }

    #[test]
    fn boundary_keys_are_flat() {
        let (r#in, out) = infer_tangents(None, kp(4.0, 7.0), Some(kp(9.0, 1.0)), 0.4, 0.4, 1e-9);
        assert_eq!(r#in, Tangent::new(7.0, 0.4));
        assert_eq!(out, Tangent::new(7.0, 0.4));

        let (r#in, out) = infer_tangents(Some(kp(0.0, 3.0)), kp(4.0, 7.0), None, 0.25, 0.5, 1e-9);
        assert_eq!(r#in, Tangent::new(7.0, 0.25));
        assert_eq!(out, Tangent::new(7.0, 0.5));
    }

    #[test]
    fn custom_percents_scale_offsets() {
        let (r#in, out) = infer_tangents(
            Some(kp(0.0, 0.0)),
            kp(5.0, 5.0),
            Some(kp(10.0, 10.0)),
            0.2,
            0.6,
            1e-9,
        );
        assert_abs_diff_eq!(r#in.value, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.value, 8.0, epsilon = 1e-12);
        assert_eq!(r#in.percent, 0.2);
        assert_eq!(out.percent, 0.6);
    }
}
