//!
//! Equirectangular / Plate Carree (Snyder 1987, pp. 90-91): a spherical
//! projection that scales longitude by the cosine of a fixed standard
//! parallel and leaves latitude untouched. Closed form both ways, and
//! since it's already linear in `(lambda, phi)` the only reason this isn't
//! folded directly into `ConversionParams`' affine is that the standard
//! parallel, not the central meridian/scale, is what parameterises it --
//! `AUTO:42004` passes it as `lat0`.
//!

use super::Projection;
use crate::errors::Result;

#[derive(Debug, Clone, Copy)]
pub struct Equirectangular {
    cos_standard_parallel: f64,
}

impl Equirectangular {
    pub fn new(standard_parallel: f64) -> Self {
        Self {
            cos_standard_parallel: standard_parallel.cos(),
        }
    }
}

impl Projection for Equirectangular {
    fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        Ok((lam * self.cos_standard_parallel, phi))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        Ok((x / self.cos_standard_parallel, y))
    }

    fn name(&self) -> &'static str {
        "Equirectangular"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn standard_parallel_zero_is_identity() {
        let eqc = Equirectangular::new(0.0);
        let (x, y) = eqc.forward(0.5, 0.3).unwrap();
        assert_abs_diff_eq!(x, 0.5);
        assert_abs_diff_eq!(y, 0.3);
    }

    #[test]
    fn round_trip_with_nonzero_standard_parallel() {
        let eqc = Equirectangular::new(0.6);
        let (x, y) = eqc.forward(0.2, -0.4).unwrap();
        let (lam, phi) = eqc.inverse(x, y).unwrap();
        assert_abs_diff_eq!(lam, 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(phi, -0.4, epsilon = 1e-12);
    }
}
