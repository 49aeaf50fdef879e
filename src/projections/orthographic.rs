//!
//! Orthographic (Snyder 1987, pp. 145-148, eqs. 20-1 through 20-4):
//! the view of a sphere from an infinite distance, centred on
//! `(lambda0, phi0)`. Like the teacher's treatment of azimuthal projections
//! in `stere.rs`/`sterea.rs`, the central latitude is folded into the
//! projection's own state rather than the surrounding conversion, since
//! the rotation it induces isn't a plain affine.
//!
//! Used only through `AUTO:42003`; spherical only; points on the far
//! hemisphere (more than 90 degrees from the centre) have no image and are
//! rejected as out of range, matching the projection's physical model.
//!

use super::Projection;
use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy)]
pub struct Orthographic {
    phi0: f64,
    sin_phi0: f64,
    cos_phi0: f64,
}

impl Orthographic {
    pub fn new(phi0: f64) -> Self {
        let (sin_phi0, cos_phi0) = phi0.sin_cos();
        Self { phi0, sin_phi0, cos_phi0 }
    }
}

impl Projection for Orthographic {
    fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        let (sphi, cphi) = phi.sin_cos();
        let (slam, clam) = lam.sin_cos();
        let cos_c = self.sin_phi0 * sphi + self.cos_phi0 * cphi * clam;
        if cos_c < 0.0 {
            return Err(Error::CoordinateOutOfRange);
        }
        let x = cphi * slam;
        let y = self.cos_phi0 * sphi - self.sin_phi0 * cphi * clam;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let rho = x.hypot(y);
        if rho < 1e-12 {
            return Ok((0.0, self.phi0));
        }
        if rho > 1.0 + 1e-9 {
            return Err(Error::CoordinateOutOfRange);
        }
        let c = rho.min(1.0).asin();
        let (sc, cc) = c.sin_cos();
        let phi = (cc * self.sin_phi0 + y * sc * self.cos_phi0 / rho).clamp(-1.0, 1.0).asin();
        let lam = if self.phi0.abs() >= std::f64::consts::FRAC_PI_2 - 1e-12 {
            if self.phi0 > 0.0 {
                x.atan2(-y)
            } else {
                x.atan2(y)
            }
        } else {
            (x * sc).atan2(rho * self.cos_phi0 * cc - y * self.sin_phi0 * sc)
        };
        Ok((lam, phi))
    }

    fn name(&self) -> &'static str {
        "Orthographic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn centre_maps_to_origin() {
        let o = Orthographic::new(0.5);
        let (x, y) = o.forward(0.0, 0.5).unwrap();
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn far_side_is_out_of_range() {
        let o = Orthographic::new(0.0);
        assert!(o.forward(std::f64::consts::PI, 0.0).is_err());
    }

    #[test]
    fn round_trip_near_centre() {
        let o = Orthographic::new(0.3);
        let (x, y) = o.forward(0.1, 0.35).unwrap();
        let (lam, phi) = o.inverse(x, y).unwrap();
        assert_abs_diff_eq!(lam, 0.1, epsilon = 1e-9);
        assert_abs_diff_eq!(phi, 0.35, epsilon = 1e-9);
    }

    #[test]
    fn polar_round_trip() {
        let o = Orthographic::new(std::f64::consts::FRAC_PI_2);
        let (x, y) = o.forward(0.7, 1.2).unwrap();
        let (lam, phi) = o.inverse(x, y).unwrap();
        assert_abs_diff_eq!(lam, 0.7, epsilon = 1e-9);
        assert_abs_diff_eq!(phi, 1.2, epsilon = 1e-9);
    }
}
