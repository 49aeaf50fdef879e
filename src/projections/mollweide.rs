//!
//! Mollweide, a spherical pseudocylindrical equal-area projection (Snyder
//! 1987, pp. 249-252, eqs. 31-1 through 31-3). Grounded on the teacher's
//! `projections/moll.rs`, which derives the same `(c_x, c_y, c_p)`
//! constants from an auxiliary-angle half-turn `pp`; this is the `pp =
//! pi/2` case (plain Mollweide, as opposed to the teacher's Wagner IV/V
//! variants).
//!
//! Mollweide has no meaningful ellipsoidal form -- like the teacher, it
//! always maps from the sphere, so `AUTO:42005`'s central meridian is the
//! only parameter this takes.
//!

use super::Projection;
use crate::errors::{Error, Result};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

const MAX_ITER: usize = 10;
const TOL: f64 = 1e-7;

#[derive(Debug, Clone, Copy)]
pub struct Mollweide {
    c_x: f64,
    c_y: f64,
    c_p: f64,
}

impl Mollweide {
    pub fn new() -> Self {
        let pp = FRAC_PI_2;
        let sp = pp.sin();
        let c_p = 2.0 * pp + (2.0 * pp).sin();
        let r = (TAU * sp / c_p).sqrt();
        Self {
            c_x: 2.0 * r / PI,
            c_y: r / sp,
            c_p,
        }
    }
}

impl Default for Mollweide {
    fn default() -> Self {
        Self::new()
    }
}

impl Projection for Mollweide {
    fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        let k = self.c_p * phi.sin();
        let mut theta = phi;
        let mut converged = false;
        for _ in 0..MAX_ITER {
            let v = (theta + theta.sin() - k) / (1.0 + theta.cos());
            theta -= v;
            if v.abs() < TOL {
                converged = true;
                break;
            }
        }
        let half_theta = if converged { theta * 0.5 } else { FRAC_PI_2 * theta.signum() };
        Ok((self.c_x * lam * half_theta.cos(), self.c_y * half_theta.sin()))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let s = (y / self.c_y).clamp(-1.0, 1.0);
        let mut half_theta = s.asin();
        let lam = x / (self.c_x * half_theta.cos());
        if lam.abs() >= PI {
            return Err(Error::CoordinateOutOfRange);
        }
        half_theta += half_theta;
        let phi_sin = ((half_theta + half_theta.sin()) / self.c_p).clamp(-1.0, 1.0);
        Ok((lam, phi_sin.asin()))
    }

    fn name(&self) -> &'static str {
        "Mollweide"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn central_meridian_equator_is_origin() {
        let m = Mollweide::new();
        let (x, y) = m.forward(0.0, 0.0).unwrap();
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn round_trip() {
        let m = Mollweide::new();
        let (x, y) = m.forward(0.4, 0.3).unwrap();
        let (lam, phi) = m.inverse(x, y).unwrap();
        assert_abs_diff_eq!(lam, 0.4, epsilon = 1e-6);
        assert_abs_diff_eq!(phi, 0.3, epsilon = 1e-6);
    }
}
