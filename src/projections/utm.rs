//!
//! Universal Transverse Mercator: the standard 6-degree-wide zoning of
//! [`TransverseMercator`] with `k0 = 0.9996`, `false_easting = 500000`, and
//! `false_northing = 0` (north) or `10000000` (south). Zone selection
//! follows the classic proj4 longitude-to-zone formula, with the Norway and
//! Svalbard carve-outs applied on top.
//!

use super::{build_conversion, ConversionParams, TransverseMercator};
use crate::math::adjlon;
use crate::math_transform::MathTransformRef;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
    pub zone: u8,
    pub north: bool,
}

/// Standard UTM zone for a longitude (radians), before the Norway/Svalbard
/// carve-outs. Mirrors the teacher's own `((adjlon(lam) + pi) * 30/pi)`
/// zone arithmetic.
pub fn utm_zone_number(lam: f64) -> u8 {
    let z = ((adjlon(lam) + PI) * 30.0 / PI).floor() as i64 + 1;
    z.clamp(1, 60) as u8
}

/// Full zone selection including the Norway (zone 32 widened to cover
/// 3-12 deg E between 56-64 deg N) and Svalbard (zones 31-37 collapsed to
/// even-numbered 9-degree-wide zones between 72-84 deg N) exceptions.
pub fn universal_zone(lam: f64, phi: f64) -> UtmZone {
    let lam_deg = lam.to_degrees();
    let phi_deg = phi.to_degrees();
    let mut zone = utm_zone_number(lam);

    if (56.0..64.0).contains(&phi_deg) && (3.0..12.0).contains(&lam_deg) {
        zone = 32;
    } else if (72.0..84.0).contains(&phi_deg) {
        zone = match lam_deg {
            d if (0.0..9.0).contains(&d) => 31,
            d if (9.0..21.0).contains(&d) => 33,
            d if (21.0..33.0).contains(&d) => 35,
            d if (33.0..42.0).contains(&d) => 37,
            _ => zone,
        };
    }

    UtmZone {
        zone,
        north: phi_deg >= 0.0,
    }
}

fn central_meridian(zone: u8) -> f64 {
    (-183.0 + 6.0 * zone as f64).to_radians()
}

/// Build the forward conversion for a given ellipsoid and UTM zone.
pub fn universal(a: f64, es: f64, zone: UtmZone) -> crate::errors::Result<MathTransformRef> {
    let tm = std::sync::Arc::new(TransverseMercator::new(es)?);
    let params = ConversionParams {
        central_meridian: central_meridian(zone.zone),
        false_easting: 500_000.0,
        false_northing: if zone.north { 0.0 } else { 10_000_000.0 },
        scale_factor: 0.9996,
    };
    Ok(build_conversion(a, tm, params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_31_covers_prime_meridian() {
        assert_eq!(utm_zone_number(0.001), 31);
    }

    #[test]
    fn norway_carve_out_widens_zone_32() {
        let z = universal_zone(5.0f64.to_radians(), 60.0f64.to_radians());
        assert_eq!(z.zone, 32);
        assert!(z.north);
    }

    #[test]
    fn southern_hemisphere_is_flagged() {
        let z = universal_zone(0.0, (-10.0f64).to_radians());
        assert!(!z.north);
    }

    #[test]
    fn forward_near_zone_boundary_is_finite() {
        let conv = universal(6_378_137.0, 0.006_694_379_990_13, UtmZone { zone: 31, north: true }).unwrap();
        let out = conv.forward(&[0.001, 0.6]).unwrap();
        assert!(out.iter().all(|v| v.is_finite()));
        assert!(out[0] > 0.0);
    }
}
