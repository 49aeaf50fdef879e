//!
//! One-dimensional piecewise-linear interpolation, used as a building
//! block wherever a coordinate operation needs to look a value up in an
//! irregular table instead of computing it closed-form (vertical grid
//! shifts keyed by an index, time-varying parameters sampled at uneven
//! epochs, ...).
//!
//! The default domain is the integer ladder `x = 0, 1, .., n`, matching
//! spec component J's "array of >= 2 values representing y = f(x) at
//! integer x" contract; an explicit `preimage` array replaces that ladder
//! with an arbitrary monotonic one, so the transform becomes
//! `preimage^-1 . values` -- look up the fractional index in `preimage`,
//! then interpolate `values` at that index. Both directions share the one
//! `locate`/lerp routine by construction: the inverse of a strictly
//! increasing interpolator is just the same struct with `domain` and
//! `values` swapped.
//!

use crate::errors::{Error, Result};
use crate::math_transform::{AffineTransform, Concatenated, MathTransform, MathTransformRef};
use crate::matrix::Matrix;
use std::sync::Arc;

/// Relative tolerance for detecting a constant increment between
/// consecutive values, below which the whole table degenerates to a plain
/// affine transform.
const CONSTANT_INCREMENT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
struct LinearInterpolator1D {
    /// Strictly increasing knot positions (the domain).
    domain: Vec<f64>,
    /// Value at each knot.
    values: Vec<f64>,
}

impl LinearInterpolator1D {
    /// Index of the segment `[domain[i], domain[i+1]]` that `x` falls
    /// into, clamped to the first/last segment for extrapolation.
    fn locate(&self, x: f64) -> usize {
        let n = self.domain.len();
        if x <= self.domain[0] {
            return 0;
        }
        if x >= self.domain[n - 1] {
            return n - 2;
        }
        match self.domain.binary_search_by(|probe| probe.partial_cmp(&x).expect("no NaN in domain")) {
            Ok(i) => i.min(n - 2),
            Err(i) => i - 1,
        }
    }

    fn eval(&self, x: f64) -> f64 {
        let i = self.locate(x);
        let (x0, x1) = (self.domain[i], self.domain[i + 1]);
        let (y0, y1) = (self.values[i], self.values[i + 1]);
        let t = (x - x0) / (x1 - x0);
        y0 + t * (y1 - y0)
    }

    fn is_strictly_increasing(values: &[f64]) -> bool {
        values.windows(2).all(|w| w[1] > w[0])
    }
}

impl MathTransform for LinearInterpolator1D {
    fn dim_in(&self) -> usize {
        1
    }
    fn dim_out(&self) -> usize {
        1
    }
    fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != 1 {
            return Err(Error::MismatchedDimensions { expected: 1, actual: input.len() });
        }
        Ok(vec![self.eval(input[0])])
    }

    /// Only the original table's `values`, not the possibly-reflected
    /// ones a caller sees (reflection is applied by the wrapping affine in
    /// [`build`]), so this checks `values` directly: invertible exactly
    /// when every knot is strictly greater than the last.
    fn try_inverse(&self) -> Result<MathTransformRef> {
        if !Self::is_strictly_increasing(&self.values) {
            return Err(Error::NonInvertibleOperation {
                what: "linear interpolator with non-monotonic values".to_string(),
            });
        }
        Ok(Arc::new(Self {
            domain: self.values.clone(),
            values: self.domain.clone(),
        }))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Slope shared by every consecutive pair in `values`, if all pairs agree
/// to within [`CONSTANT_INCREMENT_TOLERANCE`] (relative to the first
/// step); `None` otherwise.
fn constant_increment(values: &[f64]) -> Option<f64> {
    let first_step = values[1] - values[0];
    if first_step == 0.0 {
        return None;
    }
    for w in values.windows(2).skip(1) {
        let step = w[1] - w[0];
        if ((step - first_step) / first_step).abs() > CONSTANT_INCREMENT_TOLERANCE {
            return None;
        }
    }
    Some(first_step)
}

fn validate(values: &[f64], preimage: Option<&[f64]>) -> Result<()> {
    if values.len() < 2 {
        return Err(Error::IllegalProperty {
            key: "values",
            value: format!("a linear interpolator needs at least 2 values, got {}", values.len()),
        });
    }
    if let Some(p) = preimage {
        if p.len() != values.len() {
            return Err(Error::MismatchedDimensions {
                expected: values.len(),
                actual: p.len(),
            });
        }
        if !LinearInterpolator1D::is_strictly_increasing(p) {
            return Err(Error::IllegalProperty {
                key: "preimage",
                value: "preimage array must be strictly increasing".to_string(),
            });
        }
    }
    Ok(())
}

/// Build the 1D linear interpolation transform for `values` sampled at
/// the integer ladder `0, 1, .., values.len()-1`.
///
/// When `values` has a constant increment (within tolerance) this returns
/// a plain [`AffineTransform`] instead, since that is a cheaper and
/// numerically exact equivalent. When `values` is strictly decreasing,
/// the table is stored negated and wrapped in a `x -1` affine on the
/// output so [`LinearInterpolator1D::locate`]'s binary search -- which
/// assumes an increasing array -- still applies.
pub fn build(values: Vec<f64>) -> Result<MathTransformRef> {
    build_with_preimage(values, None)
}

/// As [`build`], but the domain is `preimage` rather than the integer
/// ladder: the transform is `preimage^-1 . values`, i.e. locate the
/// fractional index in `preimage`, then interpolate `values` there.
pub fn build_with_preimage(values: Vec<f64>, preimage: Option<Vec<f64>>) -> Result<MathTransformRef> {
    validate(&values, preimage.as_deref())?;

    if preimage.is_none() {
        if let Some(slope) = constant_increment(&values) {
            return Ok(AffineTransform::new(Matrix::affine(1, &[slope], &[values[0]])));
        }
    }

    let domain = preimage.unwrap_or_else(|| (0..values.len()).map(|i| i as f64).collect());

    if values.windows(2).all(|w| w[1] < w[0]) {
        let negated: Vec<f64> = values.iter().map(|v| -v).collect();
        let inner: MathTransformRef = Arc::new(LinearInterpolator1D { domain, values: negated });
        let flip = AffineTransform::new(Matrix::scale(1, &[-1.0]));
        return Ok(Concatenated::new(vec![inner, flip]));
    }

    Ok(Arc::new(LinearInterpolator1D { domain, values }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn interpolates_between_knots() {
        let t = build(vec![0.0, 10.0, 30.0]).unwrap();
        let out = t.forward(&[0.5]).unwrap();
        assert_abs_diff_eq!(out[0], 5.0);
        let out = t.forward(&[1.5]).unwrap();
        assert_abs_diff_eq!(out[0], 20.0);
    }

    #[test]
    fn extrapolates_using_end_segment_slope() {
        let t = build(vec![0.0, 10.0, 30.0]).unwrap();
        let out = t.forward(&[-1.0]).unwrap();
        assert_abs_diff_eq!(out[0], -10.0);
        let out = t.forward(&[3.0]).unwrap();
        assert_abs_diff_eq!(out[0], 50.0);
    }

    #[test]
    fn constant_increment_collapses_to_affine() {
        let t = build(vec![1.0, 3.0, 5.0, 7.0]).unwrap();
        let out = t.forward(&[2.5]).unwrap();
        assert_abs_diff_eq!(out[0], 6.0);
    }

    #[test]
    fn increasing_table_is_invertible() {
        let t = build(vec![0.0, 5.0, 9.0, 20.0]).unwrap();
        let inv = t.try_inverse().unwrap();
        let out = inv.forward(&[9.0]).unwrap();
        assert_abs_diff_eq!(out[0], 2.0);
        let back = t.forward(&out).unwrap();
        assert_abs_diff_eq!(back[0], 9.0, epsilon = 1e-9);
    }

    #[test]
    fn non_monotonic_table_has_no_inverse() {
        let t = build(vec![0.0, 5.0, 2.0, 9.0]).unwrap();
        assert!(t.try_inverse().is_err());
    }

    #[test]
    fn strictly_decreasing_table_is_invertible_via_reflection() {
        let t = build(vec![10.0, 8.0, 4.0]).unwrap();
        let out = t.forward(&[0.5]).unwrap();
        assert_abs_diff_eq!(out[0], 9.0);
        let inv = t.try_inverse().unwrap();
        let back = inv.forward(&out).unwrap();
        assert_abs_diff_eq!(back[0], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn preimage_remaps_the_domain() {
        // values sampled at x = 0, 10, 100 instead of 0, 1, 2.
        let t = build_with_preimage(vec![0.0, 1.0, 2.0], Some(vec![0.0, 10.0, 100.0])).unwrap();
        let out = t.forward(&[5.0]).unwrap();
        assert_abs_diff_eq!(out[0], 0.5);
    }

    #[test]
    fn rejects_too_few_values() {
        assert!(build(vec![1.0]).is_err());
    }

    #[test]
    fn rejects_non_monotonic_preimage() {
        assert!(build_with_preimage(vec![0.0, 1.0, 2.0], Some(vec![0.0, 5.0, 3.0])).is_err());
    }
}
