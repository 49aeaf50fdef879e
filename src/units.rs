//!
//! Predefined linear and angular units, and conversion between them.
//!
//! Mirrors the teacher's flat `UnitDefn` lookup table, extended with an
//! angular table (the teacher only ever needed linear units because proj
//! strings carry angles in degrees/radians implicitly).
//!

use crate::errors::{Error, Result};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Quantity {
    Length,
    Angle,
    Scale,
    Time,
}

#[derive(Debug, Copy, Clone)]
pub struct UnitDefn {
    pub name: &'static str,
    pub quantity: Quantity,
    /// Multiplier to the SI base unit for this quantity (metre, radian,
    /// unity, second).
    pub to_base: f64,
}

macro_rules! unit {
    ($name:expr, $quantity:expr, $to_base:expr) => {
        UnitDefn {
            name: $name,
            quantity: $quantity,
            to_base: $to_base,
        }
    };
}

pub const METRE: UnitDefn = unit!("metre", Quantity::Length, 1.0);
pub const RADIAN: UnitDefn = unit!("radian", Quantity::Angle, 1.0);
pub const DEGREE: UnitDefn = unit!("degree", Quantity::Angle, std::f64::consts::PI / 180.0);
pub const UNITY: UnitDefn = unit!("unity", Quantity::Scale, 1.0);
pub const SECOND: UnitDefn = unit!("second", Quantity::Time, 1.0);

#[rustfmt::skip]
const UNITS: &[UnitDefn] = &[
    unit!("metre",    Quantity::Length, 1.0),
    unit!("m",        Quantity::Length, 1.0),
    unit!("km",       Quantity::Length, 1000.0),
    unit!("kilometre",Quantity::Length, 1000.0),
    unit!("dm",       Quantity::Length, 0.1),
    unit!("cm",       Quantity::Length, 0.01),
    unit!("mm",       Quantity::Length, 0.001),
    unit!("in",       Quantity::Length, 0.0254),
    unit!("us-ft",    Quantity::Length, 1200. / 3937.0),
    unit!("ft",       Quantity::Length, 0.3048),
    unit!("foot",     Quantity::Length, 0.3048),
    unit!("yd",       Quantity::Length, 0.9144),
    unit!("mi",       Quantity::Length, 1609.344),
    unit!("kmi",      Quantity::Length, 1852.0),
    unit!("fath",     Quantity::Length, 1.8288),
    unit!("link",     Quantity::Length, 0.201168),
    unit!("chain",    Quantity::Length, 20.1168),
    unit!("ind-yd",   Quantity::Length, 0.91439523),
    unit!("ind-ft",   Quantity::Length, 0.30479841),
    unit!("radian",   Quantity::Angle, 1.0),
    unit!("rad",      Quantity::Angle, 1.0),
    unit!("degree",   Quantity::Angle, std::f64::consts::PI / 180.0),
    unit!("deg",      Quantity::Angle, std::f64::consts::PI / 180.0),
    unit!("grad",     Quantity::Angle, std::f64::consts::PI / 200.0),
    unit!("arc-second", Quantity::Angle, std::f64::consts::PI / (180.0 * 3600.0)),
    unit!("unity",    Quantity::Scale, 1.0),
    unit!("second",   Quantity::Time, 1.0),
    unit!("minute",   Quantity::Time, 60.0),
    unit!("hour",     Quantity::Time, 3600.0),
    unit!("day",      Quantity::Time, 86400.0),
    unit!("year",     Quantity::Time, 365.25 * 86400.0),
];

/// Look up a unit definition by (case-insensitive) name.
pub fn find_unit(name: &str) -> Option<UnitDefn> {
    UNITS.iter().find(|u| u.name.eq_ignore_ascii_case(name)).copied()
}

impl UnitDefn {
    /// Ratio to convert a value expressed in `self` into `other`.
    ///
    /// Errors with [`Error::IncommensurableUnits`] if the two units do
    /// not measure the same quantity.
    pub fn ratio_to(&self, other: &UnitDefn) -> Result<f64> {
        if self.quantity != other.quantity {
            return Err(Error::IncommensurableUnits {
                from: self.name.to_string(),
                to: other.name.to_string(),
            });
        }
        Ok(self.to_base / other.to_base)
    }

    pub fn convert(&self, value: f64, other: &UnitDefn) -> Result<f64> {
        Ok(value * self.ratio_to(other)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn finds_known_units() {
        assert!(find_unit("M").is_some());
        assert!(find_unit("degree").is_some());
        assert!(find_unit("bogus").is_none());
    }

    #[test]
    fn converts_compatible_units() {
        let km = find_unit("km").unwrap();
        assert_abs_diff_eq!(km.convert(1.0, &METRE).unwrap(), 1000.0);
    }

    #[test]
    fn rejects_incommensurable_units() {
        let deg = find_unit("degree").unwrap();
        assert!(deg.ratio_to(&METRE).is_err());
    }
}
