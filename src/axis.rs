//!
//! Axis definitions for a [`crate::cs::CoordinateSystem`].
//!

use crate::units::UnitDefn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisDirection {
    East,
    West,
    North,
    South,
    Up,
    Down,
    Future,
    Past,
    DisplayRight,
    DisplayDown,
    Column,
    Row,
}

impl AxisDirection {
    /// `true` when this direction is the opposite of `other` (East/West,
    /// North/South, Up/Down, Future/Past, ...). Used when building
    /// axis-swap matrices to decide whether a component needs negating.
    pub fn is_opposite_of(&self, other: &AxisDirection) -> bool {
        use AxisDirection::*;
        matches!(
            (self, other),
            (East, West)
                | (West, East)
                | (North, South)
                | (South, North)
                | (Up, Down)
                | (Down, Up)
                | (Future, Past)
                | (Past, Future)
                | (DisplayRight, DisplayRight)
                | (DisplayDown, DisplayDown)
        )
    }
}

/// Whether an axis range wraps around (longitude crossing +/-180) or is an
/// ordinary bounded/unbounded range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeMeaning {
    Exact,
    Wraparound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub name: &'static str,
    pub abbreviation: &'static str,
    pub direction: AxisDirection,
    pub unit: UnitDefn,
    pub minimum_value: f64,
    pub maximum_value: f64,
    pub range_meaning: RangeMeaning,
}

impl Axis {
    pub fn new(
        name: &'static str,
        abbreviation: &'static str,
        direction: AxisDirection,
        unit: UnitDefn,
    ) -> Self {
        Self {
            name,
            abbreviation,
            direction,
            unit,
            minimum_value: f64::NEG_INFINITY,
            maximum_value: f64::INFINITY,
            range_meaning: RangeMeaning::Exact,
        }
    }

    pub fn with_range(mut self, minimum_value: f64, maximum_value: f64, range_meaning: RangeMeaning) -> Self {
        self.minimum_value = minimum_value;
        self.maximum_value = maximum_value;
        self.range_meaning = range_meaning;
        self
    }
}

pub mod constants {
    use super::*;
    use crate::units::{DEGREE, METRE, RADIAN, SECOND};

    pub fn geodetic_longitude() -> Axis {
        Axis::new("Geodetic longitude", "Lon", AxisDirection::East, DEGREE)
            .with_range(-180., 180., RangeMeaning::Wraparound)
    }

    pub fn geodetic_latitude() -> Axis {
        Axis::new("Geodetic latitude", "Lat", AxisDirection::North, DEGREE)
            .with_range(-90., 90., RangeMeaning::Exact)
    }

    /// Longitude axis in radians -- the internal layout map projections and
    /// the geocentric conversion expect (spec 4.F: "input ... already in
    /// radians"), as opposed to [`geodetic_longitude`]'s degrees (the unit
    /// essentially every real authority, e.g. EPSG:4326, declares).
    pub fn geodetic_longitude_radians() -> Axis {
        Axis::new("Geodetic longitude", "Lon", AxisDirection::East, RADIAN)
            .with_range(-std::f64::consts::PI, std::f64::consts::PI, RangeMeaning::Wraparound)
    }

    pub fn geodetic_latitude_radians() -> Axis {
        Axis::new("Geodetic latitude", "Lat", AxisDirection::North, RADIAN)
            .with_range(-std::f64::consts::FRAC_PI_2, std::f64::consts::FRAC_PI_2, RangeMeaning::Exact)
    }

    pub fn ellipsoidal_height() -> Axis {
        Axis::new("Ellipsoidal height", "h", AxisDirection::Up, METRE)
    }

    pub fn geocentric_x() -> Axis {
        Axis::new("Geocentric X", "X", AxisDirection::East, METRE)
    }

    pub fn geocentric_y() -> Axis {
        Axis::new("Geocentric Y", "Y", AxisDirection::East, METRE)
    }

    pub fn geocentric_z() -> Axis {
        Axis::new("Geocentric Z", "Z", AxisDirection::North, METRE)
    }

    pub fn easting() -> Axis {
        Axis::new("Easting", "E", AxisDirection::East, METRE)
    }

    pub fn northing() -> Axis {
        Axis::new("Northing", "N", AxisDirection::North, METRE)
    }

    pub fn gravity_related_height() -> Axis {
        Axis::new("Gravity-related height", "H", AxisDirection::Up, METRE)
    }

    pub fn depth() -> Axis {
        Axis::new("Depth", "D", AxisDirection::Down, METRE)
    }

    pub fn time() -> Axis {
        Axis::new("Time", "T", AxisDirection::Future, SECOND)
    }
}
