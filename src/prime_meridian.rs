//!
//! Prime meridians.
//!
//! A prime meridian is just a Greenwich offset, in radians. Most CRSs use
//! Greenwich itself (offset zero) but a handful of historical datums are
//! anchored to a different reference meridian.
//!

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimeMeridian {
    pub name: &'static str,
    /// Longitude of the meridian, measured from Greenwich, in radians.
    pub greenwich_longitude: f64,
}

impl PrimeMeridian {
    pub const fn new(name: &'static str, greenwich_longitude: f64) -> Self {
        Self {
            name,
            greenwich_longitude,
        }
    }

    pub fn is_equivalent_to(&self, other: &PrimeMeridian, tolerance: f64) -> bool {
        (self.greenwich_longitude - other.greenwich_longitude).abs() <= tolerance
    }
}

pub const GREENWICH: PrimeMeridian = PrimeMeridian::new("Greenwich", 0.0);

#[rustfmt::skip]
const PRIME_MERIDIANS: &[PrimeMeridian] = &[
    GREENWICH,
    PrimeMeridian::new("Lisbon",     -9.131_906_111_111 * DEG),
    PrimeMeridian::new("Paris",       2.337_229_166_667 * DEG),
    PrimeMeridian::new("Bogota",    -74.080_916_666_667 * DEG),
    PrimeMeridian::new("Madrid",     -3.687_938_888_889 * DEG),
    PrimeMeridian::new("Rome",       12.452_333_333_333 * DEG),
    PrimeMeridian::new("Bern",        7.439_583_333_333 * DEG),
    PrimeMeridian::new("Jakarta",   106.807_719_444_444 * DEG),
    PrimeMeridian::new("Ferro",     -17.666_666_666_667 * DEG),
    PrimeMeridian::new("Brussels",    4.367_975 * DEG),
    PrimeMeridian::new("Stockholm",  18.058_277_777_778 * DEG),
    PrimeMeridian::new("Athens",     23.716_337_5 * DEG),
    PrimeMeridian::new("Oslo",       10.722_916_666_667 * DEG),
    PrimeMeridian::new("Copenhagen", 12.577_88 * DEG),
];

const DEG: f64 = std::f64::consts::PI / 180.0;

/// Look up a named prime meridian, case-insensitively.
pub fn find(name: &str) -> Option<PrimeMeridian> {
    PRIME_MERIDIANS
        .iter()
        .find(|pm| pm.name.eq_ignore_ascii_case(name))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greenwich_is_zero() {
        assert_eq!(GREENWICH.greenwich_longitude, 0.0);
    }

    #[test]
    fn finds_known_names_case_insensitively() {
        assert!(find("paris").is_some());
        assert!(find("PARIS").is_some());
        assert!(find("nowhere").is_none());
    }
}
