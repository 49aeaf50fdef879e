//!
//! American (Ordinary) Polyconic (Snyder 1987, pp. 124-127, eqs. 18-6
//! through 18-8). Every parallel is projected as a true-scale circular arc
//! tangent to the central meridian, so the forward formula degenerates to
//! a straight vertical line at `phi == 0` and is handled as its own branch
//! rather than dividing by `sin(phi)`.
//!
//! The closed-form inverse (Snyder 18-11) needs a case split at the poles
//! and loses accuracy close to the equator; a plain 2-D Newton iteration
//! on the forward map, seeded from `(x, y)` itself, is simpler to get
//! right and stays accurate over the whole domain at the cost of a few
//! extra forward evaluations.
//!

use super::Projection;
use crate::errors::{Error, Result};
use crate::math::{enfn, mlfn, Enfn};

#[derive(Debug, Clone, Copy)]
pub struct Polyconic {
    es: f64,
    en: Enfn,
}

impl Polyconic {
    pub fn new(es: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&es) {
            return Err(Error::invalid_param("es", "eccentricity squared must be in [0, 1)"));
        }
        Ok(Self { es, en: enfn(es) })
    }

    fn forward_raw(&self, lam: f64, phi: f64) -> (f64, f64) {
        let (sphi, cphi) = phi.sin_cos();
        let ml = mlfn(phi, sphi, cphi, self.en);
        if phi.abs() < 1e-10 {
            return (lam, ml);
        }
        let n = sphi / (1.0 - self.es * sphi * sphi).sqrt();
        let x = (lam * n).sin() / n;
        let y = ml + (1.0 - (lam * n).cos()) / n;
        (x, y)
    }
}

impl Projection for Polyconic {
    fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        Ok(self.forward_raw(lam, phi))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        if y.abs() < 1e-10 {
            return Ok((x, 0.0));
        }

        const MAX_ITER: usize = 30;
        const EPS: f64 = 1e-13;
        const H: f64 = 1e-6;

        let mut lam = x;
        let mut phi = y;
        for _ in 0..MAX_ITER {
            let (fx, fy) = self.forward_raw(lam, phi);
            let rx = fx - x;
            let ry = fy - y;
            if rx.abs() < EPS && ry.abs() < EPS {
                return Ok((lam, phi));
            }

            let (fx_dl, fy_dl) = self.forward_raw(lam + H, phi);
            let (fx_dp, fy_dp) = self.forward_raw(lam, phi + H);
            let j11 = (fx_dl - fx) / H;
            let j21 = (fy_dl - fy) / H;
            let j12 = (fx_dp - fx) / H;
            let j22 = (fy_dp - fy) / H;

            let det = j11 * j22 - j12 * j21;
            if det.abs() < 1e-18 {
                return Err(Error::NoConvergence {
                    method: "polyconic_inverse",
                    iterations: MAX_ITER,
                });
            }
            let dlam = (j22 * rx - j12 * ry) / det;
            let dphi = (-j21 * rx + j11 * ry) / det;
            lam -= dlam;
            phi -= dphi;
        }
        Err(Error::NoConvergence {
            method: "polyconic_inverse",
            iterations: MAX_ITER,
        })
    }

    fn name(&self) -> &'static str {
        "Polyconic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn equator_is_a_straight_line() {
        let p = Polyconic::new(0.006_694_379_990_13).unwrap();
        let (x, y) = p.forward(0.3, 0.0).unwrap();
        assert_abs_diff_eq!(x, 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn round_trip_off_equator() {
        let p = Polyconic::new(0.006_694_379_990_13).unwrap();
        let (x, y) = p.forward(0.1, 0.6).unwrap();
        let (lam, phi) = p.inverse(x, y).unwrap();
        assert_abs_diff_eq!(lam, 0.1, epsilon = 1e-7);
        assert_abs_diff_eq!(phi, 0.6, epsilon = 1e-7);
    }

    #[test]
    fn round_trip_southern_latitude() {
        let p = Polyconic::new(0.006_694_379_990_13).unwrap();
        let (x, y) = p.forward(-0.4, -0.3).unwrap();
        let (lam, phi) = p.inverse(x, y).unwrap();
        assert_abs_diff_eq!(lam, -0.4, epsilon = 1e-7);
        assert_abs_diff_eq!(phi, -0.3, epsilon = 1e-7);
    }
}
