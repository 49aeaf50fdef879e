//!
//! Albers Equal-Area Conic, two standard parallels (Snyder 1987, pp.
//! 100-103, eqs. 14-3 through 14-10). Like [`super::LambertConformalConic`]
//! this is an addition beyond the distilled specification's named
//! projection list, included because it is the equal-area counterpart EPSG
//! pairs with Lambert Conformal Conic for the same kind of mid-latitude,
//! east-west-elongated extent.
//!

use super::Projection;
use crate::errors::{Error, Result};
use crate::math::{authlat, authset, msfn, qsfn};

#[derive(Debug, Clone, Copy)]
pub struct AlbersEqualArea {
    es: f64,
    e: f64,
    n: f64,
    c: f64,
    rho0: f64,
    apa: (f64, f64, f64),
    qp: f64,
}

impl AlbersEqualArea {
    pub fn new(es: f64, phi0: f64, phi1: f64, phi2: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&es) {
            return Err(Error::invalid_param("es", "eccentricity squared must be in [0, 1)"));
        }
        let e = es.sqrt();
        let one_es = 1.0 - es;

        let m1 = msfn(phi1.sin(), phi1.cos(), es);
        let m2 = msfn(phi2.sin(), phi2.cos(), es);
        let q0 = qsfn(phi0.sin(), e, one_es);
        let q1 = qsfn(phi1.sin(), e, one_es);
        let q2 = qsfn(phi2.sin(), e, one_es);

        let n = if (phi1 - phi2).abs() > 1e-10 {
            (m1 * m1 - m2 * m2) / (q2 - q1)
        } else {
            phi1.sin()
        };
        let c = m1 * m1 + n * q1;
        let rho0 = (c - n * q0).max(0.0).sqrt() / n;

        Ok(Self {
            es,
            e,
            n,
            c,
            rho0,
            apa: authset(es),
            qp: qsfn(1.0, e, one_es),
        })
    }
}

impl Projection for AlbersEqualArea {
    fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        let q = qsfn(phi.sin(), self.e, 1.0 - self.es);
        let arg = self.c - self.n * q;
        if arg < 0.0 {
            return Err(Error::CoordinateOutOfRange);
        }
        let rho = arg.sqrt() / self.n;
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
        let q = (self.c - (rho * self.n).powi(2)) / self.n;
        let beta = (q / self.qp).clamp(-1.0, 1.0).asin();
        let phi = authlat(beta, self.apa);
        Ok((lam, phi))
    }

    fn name(&self) -> &'static str {
        "Albers_Equal_Area"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn round_trip_two_standard_parallels() {
        let aea = AlbersEqualArea::new(
            0.006_694_379_990_13,
            23.0f64.to_radians(),
            29.5f64.to_radians(),
            45.5f64.to_radians(),
        )
        .unwrap();
        let (x, y) = aea.forward(-96.0f64.to_radians(), 40.0f64.to_radians()).unwrap();
        let (lam, phi) = aea.inverse(x, y).unwrap();
        assert_abs_diff_eq!(lam, -96.0f64.to_radians(), epsilon = 1e-8);
        assert_abs_diff_eq!(phi, 40.0f64.to_radians(), epsilon = 1e-8);
    }

    #[test]
    fn origin_latitude_maps_near_zero() {
        let aea = AlbersEqualArea::new(
            0.006_694_379_990_13,
            23.0f64.to_radians(),
            29.5f64.to_radians(),
            45.5f64.to_radians(),
        )
        .unwrap();
        let (x, y) = aea.forward(0.0, 23.0f64.to_radians()).unwrap();
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-6);
    }
}
