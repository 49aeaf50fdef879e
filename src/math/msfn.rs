/// Ratio of parallel circle radius to equatorial radius at the given
/// latitude (`sinphi`/`cosphi`), used to scale the transverse Mercator
/// and conformal projections.
#[inline]
pub(crate) fn msfn(sinphi: f64, cosphi: f64, es: f64) -> f64 {
    cosphi / (1. - es * sinphi * sinphi).sqrt()
}
