//!
//! Dense, small (at most 5x5) row-major matrices, used as augmented affine
//! transforms (`n+1` square, last row `[0 ... 0 1]`) throughout the
//! operation finder: `AXIS_CHANGES`, unit conversion, the projection
//! normalization/denormalization pair, and the selection matrices used to
//! reorder compound-CRS dimensions are all just matrices.
//!

use crate::errors::{Error, Result};
use std::fmt;

pub const MAX_SIZE: usize = 5;

#[derive(Clone, PartialEq)]
pub struct Matrix {
    size: usize,
    data: [[f64; MAX_SIZE]; MAX_SIZE],
}

impl Matrix {
    pub fn zero(size: usize) -> Self {
        assert!(size <= MAX_SIZE, "matrix size {size} exceeds MAX_SIZE");
        Self {
            size,
            data: [[0.0; MAX_SIZE]; MAX_SIZE],
        }
    }

    pub fn identity(size: usize) -> Self {
        let mut m = Self::zero(size);
        for i in 0..size {
            m.set(i, i, 1.0);
        }
        m
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row][col] = value;
    }

    /// Build an augmented affine (dimension `n`, so `(n+1)x(n+1)`) from a
    /// linear part and a translation applied *after* the linear map:
    /// `y = A x + t`.
    pub fn affine(n: usize, linear: &[f64], translation: &[f64]) -> Self {
        assert_eq!(linear.len(), n * n);
        assert_eq!(translation.len(), n);
        let mut m = Self::identity(n + 1);
        for r in 0..n {
            for c in 0..n {
                m.set(r, c, linear[r * n + c]);
            }
            m.set(r, n, translation[r]);
        }
        m
    }

    /// A diagonal scale-only affine (used for pure unit conversions).
    pub fn scale(n: usize, factors: &[f64]) -> Self {
        assert_eq!(factors.len(), n);
        let mut m = Self::identity(n + 1);
        for i in 0..n {
            m.set(i, i, factors[i]);
        }
        m
    }

    /// Pre-multiply by a translation: returns the affine equivalent to
    /// "translate by `t`, then apply `self`".
    pub fn translate_before(&self, t: &[f64]) -> Self {
        let n = self.size - 1;
        assert_eq!(t.len(), n);
        let mut out = self.clone();
        for r in 0..n {
            let mut extra = 0.0;
            for (c, &tc) in t.iter().enumerate() {
                extra += self.get(r, c) * tc;
            }
            out.set(r, n, self.get(r, n) + extra);
        }
        out
    }

    /// Post-multiply by a translation: returns the affine equivalent to
    /// "apply `self`, then translate by `t`".
    pub fn translate_after(&self, t: &[f64]) -> Self {
        let n = self.size - 1;
        assert_eq!(t.len(), n);
        let mut out = self.clone();
        for r in 0..n {
            out.set(r, n, self.get(r, n) + t[r]);
        }
        out
    }

    pub fn is_identity(&self) -> bool {
        for r in 0..self.size {
            for c in 0..self.size {
                let expected = if r == c { 1.0 } else { 0.0 };
                if (self.get(r, c) - expected).abs() > 1e-12 {
                    return false;
                }
            }
        }
        true
    }

    /// Matrix product `self * rhs`. Both must be square and of equal size.
    pub fn multiply(&self, rhs: &Matrix) -> Self {
        assert_eq!(self.size, rhs.size, "matrix size mismatch in multiply");
        let n = self.size;
        let mut out = Self::zero(n);
        for r in 0..n {
            for c in 0..n {
                let mut sum = 0.0;
                for k in 0..n {
                    sum += self.get(r, k) * rhs.get(k, c);
                }
                out.set(r, c, sum);
            }
        }
        out
    }

    /// Apply this (n+1)x(n+1) augmented affine to an n-dimensional point.
    pub fn apply(&self, point: &[f64]) -> Vec<f64> {
        let n = self.size - 1;
        assert_eq!(point.len(), n);
        let mut out = vec![0.0; n];
        for r in 0..n {
            let mut sum = self.get(r, n);
            for c in 0..n {
                sum += self.get(r, c) * point[c];
            }
            out[r] = sum;
        }
        out
    }

    /// Invert by Gauss-Jordan elimination with partial pivoting.
    pub fn invert(&self) -> Result<Self> {
        let n = self.size;
        let mut a = self.data;
        let mut inv = Self::identity(n).data;

        for col in 0..n {
            // Partial pivot.
            let mut pivot_row = col;
            let mut pivot_val = a[col][col].abs();
            for r in (col + 1)..n {
                if a[r][col].abs() > pivot_val {
                    pivot_val = a[r][col].abs();
                    pivot_row = r;
                }
            }
            if pivot_val < 1e-14 {
                return Err(Error::NonInvertibleMatrix);
            }
            if pivot_row != col {
                a.swap(col, pivot_row);
                inv.swap(col, pivot_row);
            }

            let pivot = a[col][col];
            for c in 0..n {
                a[col][c] /= pivot;
                inv[col][c] /= pivot;
            }

            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = a[r][col];
                if factor == 0.0 {
                    continue;
                }
                for c in 0..n {
                    a[r][c] -= factor * a[col][c];
                    inv[r][c] -= factor * inv[col][c];
                }
            }
        }

        Ok(Self { size: n, data: inv })
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix({}x{}) [", self.size, self.size)?;
        for r in 0..self.size {
            write!(f, "  ")?;
            for c in 0..self.size {
                write!(f, "{:>12.6} ", self.get(r, c))?;
            }
            writeln!(f)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn axis_swap_matrix() {
        // [[0,1,0],[1,0,0],[0,0,1]] swaps x and y and leaves z untouched.
        let m = Matrix::affine(3, &[0., 1., 0., 1., 0., 0., 0., 0., 1.], &[0., 0., 0.]);
        let out = m.apply(&[1.0, 2.0, 3.0]);
        assert_eq!(out, vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn identity_times_self_is_identity() {
        let id = Matrix::identity(4);
        let prod = id.multiply(&id);
        assert!(prod.is_identity());
    }

    #[test]
    fn invert_and_multiply_gives_identity() {
        let m = Matrix::affine(2, &[2., 0., 0., 4.], &[1., -1.]);
        let inv = m.invert().unwrap();
        let prod = m.multiply(&inv);
        for r in 0..3 {
            for c in 0..3 {
                let expected = if r == c { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(prod.get(r, c), expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn singular_matrix_fails_to_invert() {
        let m = Matrix::affine(2, &[1., 1., 1., 1.], &[0., 0.]);
        assert!(matches!(m.invert(), Err(Error::NonInvertibleMatrix)));
    }

    #[test]
    fn translate_before_and_after_compose_correctly() {
        let m = Matrix::scale(2, &[2.0, 3.0]);
        let shifted = m.translate_before(&[1.0, 1.0]);
        // (x+1)*2, (y+1)*3
        let out = shifted.apply(&[0.0, 0.0]);
        assert_eq!(out, vec![2.0, 3.0]);

        let shifted_after = m.translate_after(&[5.0, 5.0]);
        let out2 = shifted_after.apply(&[1.0, 1.0]);
        assert_eq!(out2, vec![2.0 + 5.0, 3.0 + 5.0]);
    }
}
