//!
//! Lambert Conformal Conic, two standard parallels (Snyder 1987, pp.
//! 104-107, eqs. 14-1 through 15-8). Not named by the distilled
//! specification but carried along the same normalized-core shape as
//! every other projection here, since it is one of the handful of
//! conversions EPSG actually tags as in routine use for mid-latitude
//! countries.
//!

use super::Projection;
use crate::errors::{Error, Result};
use crate::math::{consts::FRAC_PI_2, msfn, phi2, tsfn};

#[derive(Debug, Clone, Copy)]
pub struct LambertConformalConic {
    e: f64,
    n: f64,
    f: f64,
    rho0: f64,
}

impl LambertConformalConic {
    pub fn new(e: f64, phi0: f64, phi1: f64, phi2_std: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&e) {
            return Err(Error::invalid_param("eccentricity", "must be in [0, 1)"));
        }
        if (phi1 - phi2_std).abs() < 1e-10 {
            return Self::new_tangent(e, phi0, phi1);
        }

        let m1 = msfn(phi1.sin(), phi1.cos(), e * e);
        let m2 = msfn(phi2_std.sin(), phi2_std.cos(), e * e);
        let t0 = tsfn(phi0, phi0.sin(), e);
        let t1 = tsfn(phi1, phi1.sin(), e);
        let t2 = tsfn(phi2_std, phi2_std.sin(), e);

        let n = (m1 / m2).ln() / (t1 / t2).ln();
        let f = m1 / (n * t1.powf(n));
        let rho0 = f * t0.powf(n);
        Ok(Self { e, n, f, rho0 })
    }

    fn new_tangent(e: f64, phi0: f64, phi1: f64) -> Result<Self> {
        let n = phi1.sin();
        let m1 = msfn(phi1.sin(), phi1.cos(), e * e);
        let t1 = tsfn(phi1, phi1.sin(), e);
        let f = m1 / (n * t1.powf(n));
        let t0 = tsfn(phi0, phi0.sin(), e);
        let rho0 = f * t0.powf(n);
        Ok(Self { e, n, f, rho0 })
    }
}

impl Projection for LambertConformalConic {
    fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        if (FRAC_PI_2 - phi.abs()) < 1e-10 && self.n * phi < 0.0 {
            return Err(Error::CoordinateOutOfRange);
        }
        let t = tsfn(phi, phi.sin(), self.e);
        let rho = self.f * t.powf(self.n);
        let theta = self.n * lam;
        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let dy = self.rho0 - y;
        let rho = self.n.signum() * (x * x + dy * dy).sqrt();
        let theta = self.n.signum() * x.atan2(self.n.signum() * dy);
        let lam = theta / self.n;
        let t = (rho / self.f).powf(1.0 / self.n);
        let phi = phi2(t, self.e)?;
        Ok((lam, phi))
    }

    fn name(&self) -> &'static str {
        "Lambert_Conformal_Conic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn round_trip_two_standard_parallels() {
        let lcc = LambertConformalConic::new(
            0.081_991_89,
            33.0f64.to_radians(),
            33.0f64.to_radians(),
            45.0f64.to_radians(),
        )
        .unwrap();
        let (x, y) = lcc.forward(-10.0f64.to_radians(), 40.0f64.to_radians()).unwrap();
        let (lam, phi) = lcc.inverse(x, y).unwrap();
        assert_abs_diff_eq!(lam, -10.0f64.to_radians(), epsilon = 1e-9);
        assert_abs_diff_eq!(phi, 40.0f64.to_radians(), epsilon = 1e-9);
    }

    #[test]
    fn origin_maps_to_zero() {
        let lcc = LambertConformalConic::new(
            0.081_991_89,
            33.0f64.to_radians(),
            33.0f64.to_radians(),
            45.0f64.to_radians(),
        )
        .unwrap();
        let (x, y) = lcc.forward(0.0, 33.0f64.to_radians()).unwrap();
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-9);
    }
}
