//!
//! Mercator (EPSG 9804 / "Mercator (1SP)") and its spherical degenerate,
//! Pseudo-Mercator (EPSG 3857) falls out of constructing a `Mercator` with
//! `e == 0` and feeding it the Web Mercator false origin/scale through
//! `ConversionParams`.
//!

use super::Projection;
use crate::errors::{Error, Result};
use crate::math::{consts::FRAC_PI_2, phi2, tsfn};

#[derive(Debug, Clone, Copy)]
pub struct Mercator {
    e: f64,
}

impl Mercator {
    pub fn new(e: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&e) {
            return Err(Error::invalid_param("eccentricity", "must be in [0, 1)"));
        }
        Ok(Self { e })
    }

    pub fn spherical() -> Self {
        Self { e: 0.0 }
    }
}

impl Projection for Mercator {
    fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        if phi.abs() >= FRAC_PI_2 {
            return Err(Error::CoordinateOutOfRange);
        }
        let y = if self.e == 0.0 {
            (FRAC_PI_2 / 2.0 + phi / 2.0).tan().ln()
        } else {
            -tsfn(-phi, -phi.sin(), self.e).ln()
        };
        Ok((lam, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let phi = if self.e == 0.0 {
            FRAC_PI_2 - 2.0 * (-y).exp().atan()
        } else {
            phi2((-y).exp(), self.e)?
        };
        Ok((x, phi))
    }

    fn name(&self) -> &'static str {
        "Mercator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn spherical_round_trip() {
        let m = Mercator::spherical();
        let (x, y) = m.forward(0.3, 0.5).unwrap();
        let (lam, phi) = m.inverse(x, y).unwrap();
        assert_abs_diff_eq!(lam, 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(phi, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn ellipsoidal_round_trip() {
        let m = Mercator::new(0.0818191908426).unwrap();
        let (x, y) = m.forward(0.2, 0.4).unwrap();
        let (lam, phi) = m.inverse(x, y).unwrap();
        assert_abs_diff_eq!(lam, 0.2, epsilon = 1e-10);
        assert_abs_diff_eq!(phi, 0.4, epsilon = 1e-9);
    }

    #[test]
    fn equator_maps_to_origin() {
        let m = Mercator::new(0.0818191908426).unwrap();
        let (_, y) = m.forward(0.0, 0.0).unwrap();
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn pole_is_out_of_range() {
        let m = Mercator::new(0.0818191908426).unwrap();
        assert!(m.forward(0.0, FRAC_PI_2).is_err());
    }
}
