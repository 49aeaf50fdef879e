//!
//! Datums: the physical realisations that anchor a coordinate system to the
//! real world (or, for [`TemporalDatum`] and [`EngineeringDatum`], to a time
//! origin or a local frame of reference).
//!
//! [`GeodeticDatum`] owns an [`Ellipsoid`] and a [`PrimeMeridian`]; together
//! with a coordinate system it is what turns raw numbers into a geodetic or
//! geocentric CRS. The geocentric <-> geographic conversion and the
//! Bursa-Wolf similarity transform used for approximate datum shifts both
//! live here since both operate purely in terms of datum parameters.
//!

use crate::ellipsoid::Ellipsoid;
use crate::prime_meridian::{self, PrimeMeridian, GREENWICH};

#[derive(Debug, Clone, PartialEq)]
pub struct GeodeticDatum {
    pub name: String,
    pub ellipsoid: Ellipsoid,
    pub prime_meridian: PrimeMeridian,
}

impl GeodeticDatum {
    pub fn new(name: impl Into<String>, ellipsoid: Ellipsoid, prime_meridian: PrimeMeridian) -> Self {
        Self {
            name: name.into(),
            ellipsoid,
            prime_meridian,
        }
    }

    pub fn wgs84() -> Self {
        Self::new("WGS 84", crate::ellipsoid::wgs84(), GREENWICH)
    }

    pub fn grs80() -> Self {
        Self::new("GRS 1980", crate::ellipsoid::grs80(), GREENWICH)
    }

    /// Two datums are equivalent when their ellipsoid parameters and
    /// prime-meridian offsets agree within `tolerance` (radians for the
    /// meridian offset, same units as `a`/`es` for the ellipsoid).
    pub fn is_equivalent_to(&self, other: &GeodeticDatum, tolerance: f64) -> bool {
        self.ellipsoid.is_equivalent_to(&other.ellipsoid, tolerance)
            && self
                .prime_meridian
                .is_equivalent_to(&other.prime_meridian, tolerance)
    }
}

/// A vertical reference surface (mean sea level, a geoid model, an
/// ellipsoidal-height datum, ...). The library does not model geoid grids;
/// two vertical datums are considered the same exactly when their `name`s
/// match, which is enough to drive the "axis+unit change only" rule of
/// `Vertical -> Vertical` operation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerticalDatum {
    pub name: String,
}

impl VerticalDatum {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn is_equivalent_to(&self, other: &VerticalDatum) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

/// A temporal datum: an origin instant, expressed as a Julian date, plus the
/// calendar it is interpreted in. `findOperation` between two temporal CRSs
/// reduces to an epoch shift plus a unit change; see `operation_finder.rs`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalDatum {
    pub name: String,
    /// Origin, as a Julian date (days).
    pub origin_julian_date: f64,
}

impl TemporalDatum {
    pub fn new(name: impl Into<String>, origin_julian_date: f64) -> Self {
        Self {
            name: name.into(),
            origin_julian_date,
        }
    }
}

/// An engineering datum anchors a local, non-geodetic frame (a construction
/// site, a vehicle body frame, ...). It carries no numeric parameters: two
/// engineering CRSs are only ever related by an explicit user-supplied
/// operation, never by the finder's early/late binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineeringDatum {
    pub name: String,
}

impl EngineeringDatum {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Convert geodetic `(lon, lat, height)` (radians, radians, metres) to
/// geocentric `(X, Y, Z)` (metres) on the given ellipsoid.
pub fn geodetic_to_geocentric(lon: f64, lat: f64, height: f64, ellipsoid: &Ellipsoid) -> (f64, f64, f64) {
    let (sinphi, cosphi) = lat.sin_cos();
    let (sinlam, coslam) = lon.sin_cos();
    let n = ellipsoid.a / (1. - ellipsoid.es * sinphi * sinphi).sqrt();
    let x = (n + height) * cosphi * coslam;
    let y = (n + height) * cosphi * sinlam;
    let z = (n * (1. - ellipsoid.es) + height) * sinphi;
    (x, y, z)
}

/// Convert geocentric `(X, Y, Z)` (metres) back to geodetic
/// `(lon, lat, height)` using Bowring's closed-form followed by one
/// Newton refinement, converging to better than a millimetre for any point
/// away from the Earth's core.
pub fn geocentric_to_geodetic(x: f64, y: f64, z: f64, ellipsoid: &Ellipsoid) -> (f64, f64, f64) {
    let a = ellipsoid.a;
    let b = ellipsoid.b;
    let es = ellipsoid.es;
    let p = x.hypot(y);
    let lon = y.atan2(x);

    if p < 1e-12 {
        // On the polar axis: longitude is undefined, latitude is +/-90.
        let lat = if z >= 0. { std::f64::consts::FRAC_PI_2 } else { -std::f64::consts::FRAC_PI_2 };
        return (lon, lat, z.abs() - b);
    }

    let eps = ellipsoid.second_eccentricity_squared();
    let theta = (z * a).atan2(p * b);
    let (sintheta, costheta) = theta.sin_cos();
    let mut lat = (z + eps * b * sintheta.powi(3)).atan2(p - es * a * costheta.powi(3));

    const MAX_ITER: usize = 10;
    for _ in 0..MAX_ITER {
        let sinphi = lat.sin();
        let n = a / (1. - es * sinphi * sinphi).sqrt();
        let new_lat = (z + es * n * sinphi).atan2(p);
        if (new_lat - lat).abs() < 1e-14 {
            lat = new_lat;
            break;
        }
        lat = new_lat;
    }

    let sinphi = lat.sin();
    let n = a / (1. - es * sinphi * sinphi).sqrt();
    let height = if lat.cos().abs() > 1e-10 {
        p / lat.cos() - n
    } else {
        z / sinphi - n * (1. - es)
    };

    (lon, lat, height)
}

/// A 7-parameter Bursa-Wolf (position-vector convention) similarity
/// transform between two geocentric frames, plus its degenerate forms: a
/// pure translation (3-parameter) and identity (0-parameter).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BursaWolf {
    /// Translations, metres.
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    /// Rotations, radians (position-vector convention).
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
    /// Scale difference, dimensionless (ppm already folded in as `1 + s*1e-6`
    /// is expected to have been applied by the caller -- here `scale` is the
    /// multiplicative factor itself, i.e. `1.0` means no scale change).
    pub scale: f64,
}

impl BursaWolf {
    pub const IDENTITY: BursaWolf = BursaWolf {
        dx: 0.,
        dy: 0.,
        dz: 0.,
        rx: 0.,
        ry: 0.,
        rz: 0.,
        scale: 1.,
    };

    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            dx,
            dy,
            dz,
            ..Self::IDENTITY
        }
    }

    pub fn full(dx: f64, dy: f64, dz: f64, rx: f64, ry: f64, rz: f64, scale_ppm: f64) -> Self {
        Self {
            dx,
            dy,
            dz,
            rx,
            ry,
            rz,
            scale: 1. + scale_ppm * 1e-6,
        }
    }

    /// Apply the forward position-vector transform to a geocentric point.
    pub fn forward(&self, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
        let s = self.scale;
        (
            self.dx + s * (x - self.rz * y + self.ry * z),
            self.dy + s * (self.rz * x + y - self.rx * z),
            self.dz + s * (-self.ry * x + self.rx * y + z),
        )
    }

    /// Apply the inverse transform. For the small rotation angles that are
    /// realistic for Bursa-Wolf parameters, negating every parameter and
    /// re-applying the forward formula is accurate to well under a
    /// millimetre, which is the documented accuracy of this method anyway.
    pub fn inverse(&self, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
        let inv = BursaWolf {
            dx: -self.dx,
            dy: -self.dy,
            dz: -self.dz,
            rx: -self.rx,
            ry: -self.ry,
            rz: -self.rz,
            scale: 1. / self.scale,
        };
        inv.forward(x, y, z)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Abridged Molodensky: an approximation to a full geocentric datum shift
/// that works directly on geodetic coordinates, avoiding the geocentric
/// round trip. Accurate to a few metres for nearby datums and continental
/// extents; the finder picks it when `desired_accuracy` tolerates that.
pub fn abridged_molodensky(
    lon: f64,
    lat: f64,
    height: f64,
    source: &Ellipsoid,
    target: &Ellipsoid,
    dx: f64,
    dy: f64,
    dz: f64,
) -> (f64, f64, f64) {
    let (sinphi, cosphi) = lat.sin_cos();
    let (sinlam, coslam) = lon.sin_cos();
    let da = target.a - source.a;
    let df = target.f - source.f;
    let a = source.a;
    let f = source.f;
    let es = source.es;

    let m = a * (1. - es) / (1. - es * sinphi * sinphi).powf(1.5);
    let n = a / (1. - es * sinphi * sinphi).sqrt();

    let dlat = (-dx * sinphi * coslam - dy * sinphi * sinlam + dz * cosphi
        + da * (n * es * sinphi * cosphi) / a
        + df * (m / (1. - f) + n * (1. - f)) * sinphi * cosphi)
        / (m + height);

    let dlon = (-dx * sinlam + dy * coslam) / ((n + height) * cosphi);

    let dheight = dx * cosphi * coslam
        + dy * cosphi * sinlam
        + dz * sinphi
        - da * a / n
        + df * (1. - f) * n * sinphi * sinphi;

    (lon + dlon, lat + dlat, height + dheight)
}

pub use prime_meridian::find as find_prime_meridian;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn geocentric_round_trip() {
        let e = crate::ellipsoid::wgs84();
        let (lon, lat, h) = (10f64.to_radians(), 45f64.to_radians(), 123.0);
        let (x, y, z) = geodetic_to_geocentric(lon, lat, h, &e);
        let (lon2, lat2, h2) = geocentric_to_geodetic(x, y, z, &e);
        assert_abs_diff_eq!(lon, lon2, epsilon = 1e-12);
        assert_abs_diff_eq!(lat, lat2, epsilon = 1e-12);
        assert_abs_diff_eq!(h, h2, epsilon = 1e-6);
    }

    #[test]
    fn equator_prime_meridian_sea_level() {
        let e = crate::ellipsoid::wgs84();
        let (x, y, z) = geodetic_to_geocentric(0., 0., 0., &e);
        assert_abs_diff_eq!(x, e.a, epsilon = 1e-6);
        assert_abs_diff_eq!(y, 0., epsilon = 1e-6);
        assert_abs_diff_eq!(z, 0., epsilon = 1e-6);
    }

    #[test]
    fn bursa_wolf_round_trip() {
        let bw = BursaWolf::full(84.87, 96.49, 116.95, 0.0, 0.0, 0.554, -0.134);
        let (x, y, z) = (4_000_000.0, 500_000.0, 4_800_000.0);
        let (x2, y2, z2) = bw.forward(x, y, z);
        let (x3, y3, z3) = bw.inverse(x2, y2, z2);
        assert_abs_diff_eq!(x, x3, epsilon = 1e-6);
        assert_abs_diff_eq!(y, y3, epsilon = 1e-6);
        assert_abs_diff_eq!(z, z3, epsilon = 1e-6);
    }

    #[test]
    fn datums_with_same_ellipsoid_are_equivalent() {
        let wgs84 = GeodeticDatum::wgs84();
        let grs80 = GeodeticDatum::grs80();
        assert!(wgs84.is_equivalent_to(&grs80, 1e-6));
    }
}
