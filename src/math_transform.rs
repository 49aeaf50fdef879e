//!
//! `MathTransform`: the evaluable core of a coordinate operation, a pure
//! function `R^n -> R^m` with an optional closed-form inverse and an
//! optional Jacobian. Composition (`Concatenated`) is associative, identity
//! is the unit, and `PassThrough` lets an inner transform act on a
//! contiguous slice of a larger dimension while leaving the rest alone --
//! the three building blocks `operation_finder.rs` uses to assemble any
//! pipeline.
//!
//! Transforms are immutable once built and are meant to be shared freely
//! across threads, so every constructor here returns an `Arc`.
//!

use crate::errors::{Error, Result};
use crate::matrix::Matrix;
use std::fmt;
use std::sync::Arc;

/// A 2x2 Jacobian, `d(x,y)/d(lambda,phi)` for a map projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jacobian {
    pub dx_dlam: f64,
    pub dx_dphi: f64,
    pub dy_dlam: f64,
    pub dy_dphi: f64,
}

impl Jacobian {
    pub fn determinant(&self) -> f64 {
        self.dx_dlam * self.dy_dphi - self.dx_dphi * self.dy_dlam
    }

    pub fn invert(&self) -> Result<Jacobian> {
        let det = self.determinant();
        if det.abs() < 1e-30 {
            return Err(Error::NonInvertibleMatrix);
        }
        Ok(Jacobian {
            dx_dlam: self.dy_dphi / det,
            dx_dphi: -self.dx_dphi / det,
            dy_dlam: -self.dy_dlam / det,
            dy_dphi: self.dx_dlam / det,
        })
    }
}

/// Shared handle to an immutable math transform.
pub type MathTransformRef = Arc<dyn MathTransform>;

pub trait MathTransform: fmt::Debug + Send + Sync {
    fn dim_in(&self) -> usize;
    fn dim_out(&self) -> usize;

    /// Evaluate on a single point; `input.len() == dim_in()`, the returned
    /// vector has length `dim_out()`.
    fn forward(&self, input: &[f64]) -> Result<Vec<f64>>;

    /// The inverse transform, if this one declares one. Default: none.
    fn try_inverse(&self) -> Result<MathTransformRef> {
        Err(Error::NonInvertibleOperation {
            what: format!("{self:?}"),
        })
    }

    /// Analytical Jacobian at `input`, for 2D-in/2D-out transforms that
    /// provide one (map projections). Default: unavailable.
    fn jacobian(&self, _input: &[f64]) -> Option<Jacobian> {
        None
    }

    fn is_identity(&self) -> bool {
        false
    }

    /// Support for downcasting concrete transform kinds (used by the
    /// concatenation-folding logic to recognise adjacent affines without
    /// every caller needing to match on a closed enum of transform kinds).
    fn as_any(&self) -> &dyn std::any::Any;

    /// Transform a flat buffer laid out `[x0,y0,(z0,)x1,y1,(z1,)...]` from
    /// one (disjoint) buffer into another, per the point-array contract of
    /// spec section 6. `src` holds `dim_in()*count` values starting at
    /// `src_offset`; `dst` receives `dim_out()*count` values starting at
    /// `dst_offset`.
    fn transform_into(
        &self,
        src: &[f64],
        src_offset: usize,
        dst: &mut [f64],
        dst_offset: usize,
        count: usize,
    ) -> Result<()> {
        let n = self.dim_in();
        let m = self.dim_out();
        if src.len() < src_offset + n * count {
            return Err(Error::MismatchedDimensions {
                expected: src_offset + n * count,
                actual: src.len(),
            });
        }
        if dst.len() < dst_offset + m * count {
            return Err(Error::MismatchedDimensions {
                expected: dst_offset + m * count,
                actual: dst.len(),
            });
        }
        for i in 0..count {
            let in_start = src_offset + i * n;
            let out = self.forward(&src[in_start..in_start + n])?;
            let out_start = dst_offset + i * m;
            dst[out_start..out_start + m].copy_from_slice(&out);
        }
        Ok(())
    }

    /// Transform a buffer in place. When `dim_out() <= dim_in()` each
    /// point's result fits inside the span it was read from and the walk
    /// proceeds left to right with no extra allocation; when the output is
    /// wider than the input (e.g. a 2D-to-3D coordinate-system conversion)
    /// the whole batch is staged through a scratch buffer first so that no
    /// point overwrites data a later point still needs to read.
    fn transform_in_place(&self, buf: &mut [f64], offset: usize, count: usize) -> Result<()> {
        let n = self.dim_in();
        let m = self.dim_out();
        if buf.len() < offset + n.max(m) * count {
            return Err(Error::MismatchedDimensions {
                expected: offset + n.max(m) * count,
                actual: buf.len(),
            });
        }

        if m <= n {
            for i in 0..count {
                let start = offset + i * n;
                let out = self.forward(&buf[start..start + n])?;
                buf[offset + i * m..offset + i * m + m].copy_from_slice(&out);
            }
        } else {
            let mut scratch = Vec::with_capacity(m * count);
            for i in 0..count {
                let start = offset + i * n;
                scratch.extend(self.forward(&buf[start..start + n])?);
            }
            buf[offset..offset + m * count].copy_from_slice(&scratch);
        }
        Ok(())
    }
}

/// The identity transform on `n` dimensions.
#[derive(Debug, Clone)]
pub struct Identity {
    dim: usize,
}

impl Identity {
    pub fn new(dim: usize) -> MathTransformRef {
        Arc::new(Self { dim })
    }
}

impl MathTransform for Identity {
    fn dim_in(&self) -> usize {
        self.dim
    }
    fn dim_out(&self) -> usize {
        self.dim
    }
    fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        Ok(input.to_vec())
    }
    fn try_inverse(&self) -> Result<MathTransformRef> {
        Ok(Arc::new(self.clone()))
    }
    fn is_identity(&self) -> bool {
        true
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// A transform defined by an `(n+1)x(n+1)` augmented affine matrix.
#[derive(Debug, Clone)]
pub struct AffineTransform {
    pub matrix: Matrix,
}

impl AffineTransform {
    pub fn new(matrix: Matrix) -> MathTransformRef {
        Arc::new(Self { matrix })
    }
}

impl MathTransform for AffineTransform {
    fn dim_in(&self) -> usize {
        self.matrix.size() - 1
    }
    fn dim_out(&self) -> usize {
        self.matrix.size() - 1
    }
    fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        Ok(self.matrix.apply(input))
    }
    fn try_inverse(&self) -> Result<MathTransformRef> {
        Ok(AffineTransform::new(self.matrix.invert()?))
    }
    fn is_identity(&self) -> bool {
        self.matrix.is_identity()
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// An ordered list of transforms applied in sequence. Construction merges
/// adjacent identity/affine steps (see `simplify`) so the visible pipeline
/// only ever contains semantically meaningful steps.
#[derive(Debug, Clone)]
pub struct Concatenated {
    pub steps: Vec<MathTransformRef>,
}

impl Concatenated {
    /// Build a concatenation, folding adjacent affine steps together so the
    /// result contains the minimum number of distinguishable steps.
    pub fn new(steps: Vec<MathTransformRef>) -> MathTransformRef {
        let folded = fold_affines(steps);
        if folded.len() == 1 {
            return folded.into_iter().next().unwrap();
        }
        Arc::new(Self { steps: folded })
    }
}

/// Merge consecutive steps that are both pure affines into a single affine,
/// and drop identity steps entirely (an identity step contributes nothing
/// to the composition and only clutters the visible operation tree).
fn fold_affines(steps: Vec<MathTransformRef>) -> Vec<MathTransformRef> {
    let fallback_dim = steps.first().map(|s| s.dim_in()).unwrap_or(0);
    let mut out: Vec<MathTransformRef> = Vec::with_capacity(steps.len());
    for step in steps {
        if step.is_identity() {
            continue;
        }
        if let Some(last) = out.last() {
            if let (Some(prev), Some(cur)) = (as_affine(last), as_affine(&step)) {
                if prev.dim_out() == cur.dim_in() {
                    let merged = cur.matrix.multiply(&prev.matrix);
                    let new_step = AffineTransform::new(merged);
                    out.pop();
                    out.push(new_step);
                    continue;
                }
            }
        }
        out.push(step);
    }
    if out.is_empty() {
        out.push(Identity::new(fallback_dim));
    }
    out
}

fn as_affine(t: &MathTransformRef) -> Option<&AffineTransform> {
    t.as_any().downcast_ref::<AffineTransform>()
}

impl MathTransform for Concatenated {
    fn dim_in(&self) -> usize {
        self.steps.first().map(|s| s.dim_in()).unwrap_or(0)
    }
    fn dim_out(&self) -> usize {
        self.steps.last().map(|s| s.dim_out()).unwrap_or(0)
    }
    fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        let mut cur = input.to_vec();
        for step in &self.steps {
            cur = step.forward(&cur)?;
        }
        Ok(cur)
    }
    fn try_inverse(&self) -> Result<MathTransformRef> {
        let mut inverted = Vec::with_capacity(self.steps.len());
        for step in self.steps.iter().rev() {
            inverted.push(step.try_inverse()?);
        }
        Ok(Concatenated::new(inverted))
    }
    fn is_identity(&self) -> bool {
        self.steps.iter().all(|s| s.is_identity())
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Apply `inner` to the `inner.dim_in()` dimensions starting at
/// `first_affected`, copying every other dimension through unchanged.
#[derive(Debug, Clone)]
pub struct PassThrough {
    pub inner: MathTransformRef,
    pub first_affected: usize,
    pub total_dim_in: usize,
    pub total_dim_out: usize,
}

impl PassThrough {
    pub fn new(inner: MathTransformRef, first_affected: usize, total_dim: usize) -> MathTransformRef {
        let extra_out = inner.dim_out() as isize - inner.dim_in() as isize;
        let total_dim_out = (total_dim as isize + extra_out) as usize;
        Arc::new(Self {
            inner,
            first_affected,
            total_dim_in: total_dim,
            total_dim_out,
        })
    }
}

impl MathTransform for PassThrough {
    fn dim_in(&self) -> usize {
        self.total_dim_in
    }
    fn dim_out(&self) -> usize {
        self.total_dim_out
    }
    fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.total_dim_in {
            return Err(Error::MismatchedDimensions {
                expected: self.total_dim_in,
                actual: input.len(),
            });
        }
        let before = &input[..self.first_affected];
        let slice_len = self.inner.dim_in();
        let affected = &input[self.first_affected..self.first_affected + slice_len];
        let after = &input[self.first_affected + slice_len..];

        let transformed = self.inner.forward(affected)?;

        let mut out = Vec::with_capacity(self.total_dim_out);
        out.extend_from_slice(before);
        out.extend(transformed);
        out.extend_from_slice(after);
        Ok(out)
    }
    fn try_inverse(&self) -> Result<MathTransformRef> {
        let inv = self.inner.try_inverse()?;
        Ok(PassThrough::new(inv, self.first_affected, self.total_dim_out))
    }
    fn is_identity(&self) -> bool {
        self.inner.is_identity()
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Picks out a subset of input dimensions, in the given order, dropping the
/// rest. Used to extract a compound CRS's single-CRS component (e.g. the
/// horizontal part of a 3D compound) before handing it to a sub-operation,
/// and to re-inject it via [`PassThrough`] afterwards -- the one structural
/// primitive `operation_finder.rs` needs that neither an [`AffineTransform`]
/// (square only) nor a [`PassThrough`] (contiguous span only) can express.
#[derive(Debug, Clone)]
pub struct SelectDimensions {
    pub indices: Vec<usize>,
    pub dim_in: usize,
}

impl SelectDimensions {
    pub fn new(indices: Vec<usize>, dim_in: usize) -> MathTransformRef {
        Arc::new(Self { indices, dim_in })
    }
}

impl MathTransform for SelectDimensions {
    fn dim_in(&self) -> usize {
        self.dim_in
    }
    fn dim_out(&self) -> usize {
        self.indices.len()
    }
    fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.dim_in {
            return Err(Error::MismatchedDimensions {
                expected: self.dim_in,
                actual: input.len(),
            });
        }
        Ok(self.indices.iter().map(|&i| input[i]).collect())
    }
    fn is_identity(&self) -> bool {
        self.dim_in == self.indices.len() && self.indices.iter().enumerate().all(|(i, &idx)| i == idx)
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn select_dimensions_picks_and_reorders() {
        let sel = SelectDimensions::new(vec![2, 0], 3);
        let out = sel.forward(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(out, vec![3.0, 1.0]);
    }

    #[test]
    fn identity_round_trips() {
        let id = Identity::new(3);
        let out = id.forward(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(out, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn concatenation_folds_adjacent_affines() {
        let a = AffineTransform::new(Matrix::scale(2, &[2.0, 2.0]));
        let b = AffineTransform::new(Matrix::scale(2, &[0.5, 0.5]));
        let combined = Concatenated::new(vec![a, b]);
        assert!(combined.is_identity());
    }

    #[test]
    fn pass_through_leaves_other_dims_untouched() {
        let scale = AffineTransform::new(Matrix::scale(1, &[10.0]));
        let pt = PassThrough::new(scale, 1, 3);
        let out = pt.forward(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(out, vec![1.0, 20.0, 3.0]);
    }

    #[test]
    fn transform_in_place_round_trips_identity() {
        let id = Identity::new(2);
        let mut buf = [1.0, 2.0, 3.0, 4.0];
        id.transform_in_place(&mut buf, 0, 2).unwrap();
        assert_eq!(buf, [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn transform_into_disjoint_buffers() {
        let scale = AffineTransform::new(Matrix::scale(2, &[2.0, 2.0]));
        let src = [1.0, 2.0, 3.0, 4.0];
        let mut dst = [0.0; 4];
        scale.transform_into(&src, 0, &mut dst, 0, 2).unwrap();
        assert_eq!(dst, [2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn jacobian_inverts() {
        let j = Jacobian {
            dx_dlam: 2.0,
            dx_dphi: 0.0,
            dy_dlam: 0.0,
            dy_dphi: 4.0,
        };
        let inv = j.invert().unwrap();
        assert_abs_diff_eq!(inv.dx_dlam, 0.5);
        assert_abs_diff_eq!(inv.dy_dphi, 0.25);
    }
}
