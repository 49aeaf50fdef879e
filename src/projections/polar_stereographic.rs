//!
//! Polar Stereographic (Snyder 1987, pp. 160-161, eqs. 21-33 through
//! 21-40), variant A: scale factor at the pole is supplied directly
//! (through the surrounding conversion's `scale_factor`) rather than
//! derived from a standard parallel.
//!
//! [`universal_polar_stereographic`] below is the UPS conversion of spec
//! component H: a fixed-parameter polar stereographic with `k0 = 0.994`
//! and a 2,000,000 m false origin, used for the two polar caps UTM leaves
//! uncovered.
//!

use super::{build_conversion, ConversionParams, Projection};
use crate::errors::{Error, Result};
use crate::math::{phi2, tsfn};
use crate::math_transform::MathTransformRef;
use std::f64::consts::FRAC_PI_2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsHemisphere {
    North,
    South,
}

#[derive(Debug, Clone, Copy)]
pub struct PolarStereographic {
    e: f64,
    hemisphere: UpsHemisphere,
    akm1: f64,
}

impl PolarStereographic {
    pub fn new(e: f64, hemisphere: UpsHemisphere) -> Result<Self> {
        if !(0.0..1.0).contains(&e) {
            return Err(Error::invalid_param("eccentricity", "must be in [0, 1)"));
        }
        let akm1 = 2.0 / ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt();
        Ok(Self { e, hemisphere, akm1 })
    }
}

impl Projection for PolarStereographic {
    fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        let (signed_phi, sign) = match self.hemisphere {
            UpsHemisphere::North => (phi, 1.0),
            UpsHemisphere::South => (-phi, -1.0),
        };
        if signed_phi >= FRAC_PI_2 - 1e-12 {
            return Ok((0.0, 0.0));
        }
        let t = tsfn(signed_phi, signed_phi.sin(), self.e);
        let rho = self.akm1 * t;
        let x = rho * lam.sin();
        let y = -sign * rho * lam.cos();
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let rho = x.hypot(y);
        if rho < 1e-12 {
            let phi = match self.hemisphere {
                UpsHemisphere::North => FRAC_PI_2,
                UpsHemisphere::South => -FRAC_PI_2,
            };
            return Ok((0.0, phi));
        }
        let t = rho / self.akm1;
        let signed_phi = phi2(t, self.e)?;
        let phi = match self.hemisphere {
            UpsHemisphere::North => signed_phi,
            UpsHemisphere::South => -signed_phi,
        };
        let lam = match self.hemisphere {
            UpsHemisphere::North => x.atan2(-y),
            UpsHemisphere::South => x.atan2(y),
        };
        Ok((lam, phi))
    }

    fn name(&self) -> &'static str {
        "Polar_Stereographic"
    }
}

/// The fixed-parameter Universal Polar Stereographic conversion for the
/// given ellipsoid and hemisphere.
pub fn universal_polar_stereographic(a: f64, e: f64, hemisphere: UpsHemisphere) -> Result<MathTransformRef> {
    let ps = std::sync::Arc::new(PolarStereographic::new(e, hemisphere)?);
    let params = ConversionParams {
        central_meridian: 0.0,
        false_easting: 2_000_000.0,
        false_northing: 2_000_000.0,
        scale_factor: 0.994,
    };
    Ok(build_conversion(a, ps, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn north_pole_maps_to_origin() {
        let ps = PolarStereographic::new(0.0818191908426, UpsHemisphere::North).unwrap();
        let (x, y) = ps.forward(0.0, FRAC_PI_2).unwrap();
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn round_trip_near_pole() {
        let ps = PolarStereographic::new(0.0818191908426, UpsHemisphere::North).unwrap();
        let (x, y) = ps.forward(1.0, 1.4).unwrap();
        let (lam, phi) = ps.inverse(x, y).unwrap();
        assert_abs_diff_eq!(lam, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(phi, 1.4, epsilon = 1e-9);
    }

    #[test]
    fn south_hemisphere_round_trip() {
        let ps = PolarStereographic::new(0.0818191908426, UpsHemisphere::South).unwrap();
        let (x, y) = ps.forward(0.5, -1.3).unwrap();
        let (lam, phi) = ps.inverse(x, y).unwrap();
        assert_abs_diff_eq!(lam, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(phi, -1.3, epsilon = 1e-9);
    }

    #[test]
    fn ups_forward_applies_false_origin() {
        let conv = universal_polar_stereographic(6_378_137.0, 0.0818191908426, UpsHemisphere::North).unwrap();
        let out = conv.forward(&[0.0, FRAC_PI_2]).unwrap();
        assert_abs_diff_eq!(out[0], 2_000_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out[1], 2_000_000.0, epsilon = 1e-6);
    }
}
