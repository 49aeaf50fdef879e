//!
//! Applying a [`CoordinateOperation`] to actual points (spec section 6):
//! a flat-buffer API matching the point-array contract directly, and a
//! small [`Transform`] trait so callers can plug their own point types
//! in without reaching for the buffer form themselves -- `adaptors.rs`
//! implements it for tuples, `adaptors::geo_types` for `geo_types::Point`.
//!

use crate::crs::Crs;
use crate::errors::{Error, Result};
use crate::operation::CoordinateOperation;
use crate::operation_finder::find_operation;

/// A point type whose coordinates can be handed to a [`CoordinateOperation`]
/// and read back. `dim()` fixes how many components `write_into`/
/// `read_from` exchange; transforming through an operation whose
/// `dim_in()`/`dim_out()` don't both equal `dim()` is an error; use the
/// buffer-level [`transform_in_place`]/[`transform_into`] for anything
/// that changes a point's dimension (e.g. adding a height axis).
pub trait Transform {
    fn dim(&self) -> usize;
    fn write_into(&self, buf: &mut [f64]);
    fn read_from(&mut self, buf: &[f64]);
}

/// Apply `op` to a single point in place.
pub fn apply<P: Transform + ?Sized>(op: &CoordinateOperation, point: &mut P) -> Result<()> {
    let n = point.dim();
    let mt = &op.math_transform;
    if mt.dim_in() != n || mt.dim_out() != n {
        return Err(Error::MismatchedDimensions {
            expected: mt.dim_in(),
            actual: n,
        });
    }
    let mut buf = vec![0.0; n];
    point.write_into(&mut buf);
    let out = mt.forward(&buf)?;
    point.read_from(&out);
    Ok(())
}

/// Find the operation from `source` to `target` and apply it to a single
/// point, in one call -- the common case, at the cost of discarding the
/// operation's name/accuracy/kind that [`crate::operation_finder::find_operation`]
/// plus [`apply`] would let a caller inspect.
pub fn transform<P: Transform + ?Sized>(source: &Crs, target: &Crs, point: &mut P) -> Result<()> {
    let op = find_operation(source, target)?;
    apply(&op, point)
}

/// Apply `op` to every point in a flat buffer laid out
/// `[x0,y0,(z0,)x1,y1,(z1,)...]`, overwriting it in place. `buf.len()` must
/// be an exact multiple of `op.math_transform.dim_in()`.
pub fn transform_in_place(op: &CoordinateOperation, buf: &mut [f64]) -> Result<()> {
    let n = op.math_transform.dim_in();
    if n == 0 || buf.len() % n != 0 {
        return Err(Error::MisalignedPointArray { len: buf.len(), dim: n });
    }
    op.math_transform.transform_in_place(buf, 0, buf.len() / n)
}

/// Apply `op` reading from `src` and writing into the (disjoint) buffer
/// `dst`. `src.len()` must be an exact multiple of `dim_in()`; `dst` is
/// sized to `count * dim_out()`.
pub fn transform_into(op: &CoordinateOperation, src: &[f64], dst: &mut [f64]) -> Result<()> {
    let n = op.math_transform.dim_in();
    if n == 0 || src.len() % n != 0 {
        return Err(Error::MisalignedPointArray { len: src.len(), dim: n });
    }
    let count = src.len() / n;
    let m = op.math_transform.dim_out();
    if dst.len() != count * m {
        return Err(Error::MisalignedPointArray { len: dst.len(), dim: m });
    }
    op.math_transform.transform_into(src, 0, dst, 0, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority;
    use approx::assert_abs_diff_eq;

    #[test]
    fn transform_round_trips_through_a_projection() {
        let geo = authority::resolve_crs("CRS:84").unwrap();
        let utm = authority::universal(2.3522, 48.8566).unwrap();

        let mut pt = (2.3522, 48.8566);
        transform(&geo, &utm, &mut pt).unwrap();
        assert!(pt.0 > 400_000.0 && pt.0 < 500_000.0);

        transform(&utm, &geo, &mut pt).unwrap();
        assert_abs_diff_eq!(pt.0, 2.3522, epsilon = 1e-6);
        assert_abs_diff_eq!(pt.1, 48.8566, epsilon = 1e-6);
    }

    #[test]
    fn transform_in_place_handles_a_whole_buffer() {
        let geo = authority::resolve_crs("CRS:84").unwrap();
        let utm = authority::universal(2.3522, 48.8566).unwrap();
        let op = find_operation(&geo, &utm).unwrap();

        let mut buf = vec![2.3522, 48.8566, 2.4, 48.9];
        transform_in_place(&op, &mut buf).unwrap();
        assert!(buf[0] > 400_000.0);
        assert!(buf[2] > 400_000.0);
    }

    #[test]
    fn rejects_a_buffer_not_a_multiple_of_dim_in() {
        let geo = authority::resolve_crs("CRS:84").unwrap();
        let utm = authority::universal(2.3522, 48.8566).unwrap();
        let op = find_operation(&geo, &utm).unwrap();
        let mut buf = vec![2.3522, 48.8566, 2.4];
        assert!(transform_in_place(&op, &mut buf).is_err());
    }
}
