//! Invert the isometric-latitude relation `ts = tan(pi/4 - phi/2) *
//! ((1 + e sin phi)/(1 - e sin phi))^(e/2)` for the geographic latitude,
//! by the iterative scheme of Snyder (1987), Eqs. (7-9)-(7-11).

use super::consts::{EPS_10, FRAC_PI_2};
use crate::errors::{Error, Result};

const PHI2_NITER: usize = 15;

pub(crate) fn phi2(ts: f64, e: f64) -> Result<f64> {
    let eccnth = 0.5 * e;
    let mut phi = FRAC_PI_2 - 2. * ts.atan();
    for _ in 0..PHI2_NITER {
        let con = e * phi.sin();
        let dphi = FRAC_PI_2 - 2. * (ts * ((1. - con) / (1. + con)).powf(eccnth)).atan() - phi;
        phi += dphi;
        if dphi.abs() <= EPS_10 {
            return Ok(phi);
        }
    }
    Err(Error::NoConvergence {
        method: "phi2",
        iterations: PHI2_NITER,
    })
}
