//!
//! Transverse Mercator, Snyder's ellipsoidal series form (Snyder 1987, pp.
//! 61-64, eqs. 8-9 through 8-11 forward and 8-12 through 8-19 inverse).
//! [`crate::projections::utm::universal`] wraps this with the standard UTM
//! zoning rules.
//!
//! Scale factor is applied by the surrounding conversion affine
//! (`build_conversion`), not here: everything below operates at unit scale
//! (`a == 1`, `k0 == 1`) so that it composes cleanly with `UTM`'s own
//! `0.9996` scale factor without double-applying it.
//!

use super::Projection;
use crate::errors::{Error, Result};
use crate::math::{enfn, inv_mlfn, mlfn, Enfn};

#[derive(Debug, Clone, Copy)]
pub struct TransverseMercator {
    es: f64,
    ep2: f64,
    en: Enfn,
}

impl TransverseMercator {
    pub fn new(es: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&es) {
            return Err(Error::invalid_param("es", "eccentricity squared must be in [0, 1)"));
        }
        Ok(Self {
            es,
            ep2: es / (1.0 - es),
            en: enfn(es),
        })
    }
}

impl Projection for TransverseMercator {
    fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        let (sphi, cphi) = phi.sin_cos();
        let t = if cphi.abs() > 1e-12 { (sphi / cphi).powi(2) } else { 0.0 };
        let c = self.ep2 * cphi * cphi;
        let a = lam * cphi;
        let n = 1.0 / (1.0 - self.es * sphi * sphi).sqrt();
        let m = mlfn(phi, sphi, cphi, self.en);

        let a2 = a * a;
        let a3 = a2 * a;
        let a4 = a2 * a2;
        let a5 = a4 * a;
        let a6 = a4 * a2;

        let x = n * (a + (1.0 - t + c) * a3 / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * self.ep2) * a5 / 120.0);
        let y = m
            + n * (sphi / cphi)
                * (a2 / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * self.ep2) * a6 / 720.0);
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let phi1 = inv_mlfn(y, self.es, self.en)?;
        if (phi1.abs() - std::f64::consts::FRAC_PI_2).abs() < 1e-12 {
            return Ok((0.0, phi1.signum() * std::f64::consts::FRAC_PI_2));
        }
        let (sphi1, cphi1) = phi1.sin_cos();
        let t1 = (sphi1 / cphi1).powi(2);
        let c1 = self.ep2 * cphi1 * cphi1;
        let n1 = 1.0 / (1.0 - self.es * sphi1 * sphi1).sqrt();
        let r1 = (1.0 - self.es) / (1.0 - self.es * sphi1 * sphi1).powf(1.5);
        let d = x / n1;

        let d2 = d * d;
        let d3 = d2 * d;
        let d4 = d2 * d2;
        let d5 = d4 * d;
        let d6 = d4 * d2;

        let phi = phi1
            - (n1 * sphi1 / (cphi1 * r1))
                * (d2 / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * self.ep2) * d4 / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * self.ep2 - 3.0 * c1 * c1) * d6
                        / 720.0);
        let lam = (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * self.ep2 + 24.0 * t1 * t1) * d5 / 120.0)
            / cphi1;
        Ok((lam, phi))
    }

    fn name(&self) -> &'static str {
        "Transverse_Mercator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn round_trip_near_central_meridian() {
        let tm = TransverseMercator::new(0.006_694_379_990_13).unwrap();
        let (x, y) = tm.forward(0.02, 0.7).unwrap();
        let (lam, phi) = tm.inverse(x, y).unwrap();
        assert_abs_diff_eq!(lam, 0.02, epsilon = 1e-9);
        assert_abs_diff_eq!(phi, 0.7, epsilon = 1e-9);
    }

    #[test]
    fn equator_on_central_meridian_is_origin() {
        let tm = TransverseMercator::new(0.006_694_379_990_13).unwrap();
        let (x, y) = tm.forward(0.0, 0.0).unwrap();
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-12);
    }
}
