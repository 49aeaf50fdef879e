//!
//! The reference ellipsoid.
//!
//! A complete ellipsoid definition comprises a size parameter (the semi-major
//! axis `a`) and a shape parameter. Shape may be supplied as an inverse
//! flattening, a flattening, an eccentricity squared, or a semi-minor axis;
//! whichever is given, the others are derived so that every [`Ellipsoid`]
//! exposes the full set once constructed.
//!

use crate::errors::{Error, Result};

/// Threshold below which `a` and `b` are considered numerically equal, i.e.
/// the ellipsoid degenerates to a sphere.
const EPSLN: f64 = 1.0e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub a: f64,
    pub b: f64,
    /// First eccentricity.
    pub e: f64,
    /// First eccentricity squared.
    pub es: f64,
    /// Flattening `(a-b)/a`.
    pub f: f64,
    /// Inverse flattening, `f64::INFINITY` for a sphere.
    pub rf: f64,
}

impl Ellipsoid {
    fn from_a_b(a: f64, b: f64) -> Result<Self> {
        if !(a > 0.) {
            return Err(Error::invalid_param("a", "semi-major axis must be positive"));
        }
        if !(b > 0. && b <= a) {
            return Err(Error::invalid_param(
                "b",
                "semi-minor axis must be positive and not exceed the semi-major axis",
            ));
        }

        if (a - b).abs() < EPSLN {
            return Ok(Self {
                a,
                b: a,
                e: 0.,
                es: 0.,
                f: 0.,
                rf: f64::INFINITY,
            });
        }

        let es = (a * a - b * b) / (a * a);
        let f = (a - b) / a;
        Ok(Self {
            a,
            b,
            e: es.sqrt(),
            es,
            f,
            rf: 1. / f,
        })
    }

    /// Build from the semi-major axis and the semi-minor axis.
    pub fn from_ab(a: f64, b: f64) -> Result<Self> {
        Self::from_a_b(a, b)
    }

    /// Build from the semi-major axis and the inverse flattening
    /// (`rf = f64::INFINITY` denotes a sphere).
    pub fn from_a_rf(a: f64, rf: f64) -> Result<Self> {
        if rf.is_infinite() {
            return Self::sphere(a);
        }
        if !(rf > 1.) {
            return Err(Error::invalid_param("rf", "inverse flattening must exceed 1"));
        }
        let f = 1. / rf;
        Self::from_a_b(a, a * (1. - f))
    }

    /// Build from the semi-major axis and the flattening.
    pub fn from_a_f(a: f64, f: f64) -> Result<Self> {
        if !(f >= 0. && f < 1.) {
            return Err(Error::invalid_param("f", "flattening must lie in [0, 1)"));
        }
        Self::from_a_b(a, a * (1. - f))
    }

    /// Build from the semi-major axis and the (first) eccentricity squared.
    pub fn from_a_es(a: f64, es: f64) -> Result<Self> {
        if !(es >= 0. && es < 1.) {
            return Err(Error::invalid_param(
                "es",
                "eccentricity squared must lie in [0, 1)",
            ));
        }
        let b = a * (1. - es).sqrt();
        Self::from_a_b(a, b)
    }

    /// A perfect sphere of the given radius.
    pub fn sphere(radius: f64) -> Result<Self> {
        if !(radius > 0.) {
            return Err(Error::invalid_param("radius", "radius must be positive"));
        }
        Ok(Self {
            a: radius,
            b: radius,
            e: 0.,
            es: 0.,
            f: 0.,
            rf: f64::INFINITY,
        })
    }

    /// Second eccentricity squared, `(a²−b²)/b²`.
    pub fn second_eccentricity_squared(&self) -> f64 {
        (self.a * self.a - self.b * self.b) / (self.b * self.b)
    }

    /// Third flattening, `n = (a−b)/(a+b)`.
    pub fn third_flattening(&self) -> f64 {
        (self.a - self.b) / (self.a + self.b)
    }

    /// Radius of the sphere with the same surface area as this ellipsoid.
    pub fn authalic_radius(&self) -> f64 {
        if self.es == 0. {
            return self.a;
        }
        let e = self.e;
        // Snyder (3-18): R = a * sqrt((1 - (1-e^2)/(2e) * ln((1-e)/(1+e))) / 2)
        let term = (1. - self.es) / (2. * e) * ((1. - e) / (1. + e)).ln();
        self.a * (0.5 * (1. - term)).sqrt()
    }

    /// Arithmetic mean radius, `(2a + b) / 3`.
    pub fn mean_radius(&self) -> f64 {
        (2. * self.a + self.b) / 3.
    }

    /// Is this ellipsoid a sphere (zero flattening)?
    pub fn is_sphere(&self) -> bool {
        self.es == 0.
    }

    /// Returns `true` when `self` and `other` agree on `a` and `es` within
    /// `tolerance` (an absolute difference threshold, applied to each).
    pub fn is_equivalent_to(&self, other: &Ellipsoid, tolerance: f64) -> bool {
        (self.a - other.a).abs() <= tolerance && (self.es - other.es).abs() <= tolerance
    }
}

/// WGS84, the ellipsoid backing most modern geodetic datums.
pub fn wgs84() -> Ellipsoid {
    Ellipsoid::from_a_rf(6_378_137.0, 298.257_223_563).expect("WGS84 parameters are valid")
}

/// GRS80, numerically near-identical to WGS84 but defined independently.
pub fn grs80() -> Ellipsoid {
    Ellipsoid::from_a_rf(6_378_137.0, 298.257_222_101).expect("GRS80 parameters are valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn a_rf_and_a_b_agree() {
        let from_rf = Ellipsoid::from_a_rf(6_378_137.0, 298.257_223_563).unwrap();
        let from_ab = Ellipsoid::from_ab(6_378_137.0, from_rf.b).unwrap();
        assert_abs_diff_eq!(from_rf.es, from_ab.es, epsilon = 1e-15);
    }

    #[test]
    fn near_equal_axes_collapse_to_sphere() {
        let e = Ellipsoid::from_ab(6_371_000.0, 6_371_000.0 - 1e-12).unwrap();
        assert!(e.is_sphere());
        assert_eq!(e.rf, f64::INFINITY);
    }

    #[test]
    fn rejects_minor_axis_larger_than_major() {
        assert!(Ellipsoid::from_ab(100.0, 200.0).is_err());
    }

    #[test]
    fn authalic_radius_is_between_a_and_b() {
        let wgs = wgs84();
        let r = wgs.authalic_radius();
        assert!(r < wgs.a && r > wgs.b);
    }

    #[test]
    fn wgs84_and_grs80_are_equivalent_within_tolerance() {
        assert!(wgs84().is_equivalent_to(&grs80(), 1e-6));
    }
}
