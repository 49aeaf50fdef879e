//!
//! Coordinate systems: an ordered, classified list of [`Axis`]es.
//!
//! The finder needs two things from a CS: its *kind* (to dispatch the
//! variant-pair case analysis in `operation_finder.rs`) and its *dimension*
//! (to build selection matrices for compound CRSs). Deriving a
//! normalization matrix -- the affine that reorders/rescales a CS into the
//! internal "longitude-east, latitude-north, radians" or "easting,
//! northing, metres" layout a projection expects -- is the other half of
//! the `AXIS_CHANGES` primitive from spec component E.
//!

use crate::axis::{Axis, AxisDirection};
use crate::matrix::Matrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsKind {
    Ellipsoidal2D,
    Ellipsoidal3D,
    Cartesian2D,
    Cartesian3D,
    Spherical,
    Vertical,
    Time,
    Parametric,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSystem {
    pub kind: CsKind,
    pub axes: Vec<Axis>,
}

impl CoordinateSystem {
    pub fn new(kind: CsKind, axes: Vec<Axis>) -> Self {
        Self { kind, axes }
    }

    pub fn dimension(&self) -> usize {
        self.axes.len()
    }

    /// Split a 3D ellipsoidal CS into its horizontal (longitude, latitude)
    /// sub-CS and the index of its vertical (`Up`/`Down`) axis. Used by the
    /// operation finder's `Compound(Geographic, Vertical) -> Geographic3D`
    /// rule (spec 4.I) to address the two halves of the interpolation CRS
    /// separately. `None` if this CS has no exactly-one vertical axis.
    pub fn split_horizontal_vertical(&self) -> Option<(CoordinateSystem, usize)> {
        let vertical_positions: Vec<usize> = self
            .axes
            .iter()
            .enumerate()
            .filter(|(_, a)| matches!(a.direction, AxisDirection::Up | AxisDirection::Down))
            .map(|(i, _)| i)
            .collect();
        if vertical_positions.len() != 1 || self.axes.len() != 3 {
            return None;
        }
        let vertical_index = vertical_positions[0];
        let horizontal_axes: Vec<Axis> = self
            .axes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != vertical_index)
            .map(|(_, a)| a.clone())
            .collect();
        Some((CoordinateSystem::new(CsKind::Ellipsoidal2D, horizontal_axes), vertical_index))
    }

    pub fn ellipsoidal_2d() -> Self {
        use crate::axis::constants::*;
        Self::new(CsKind::Ellipsoidal2D, vec![geodetic_longitude(), geodetic_latitude()])
    }

    /// The EPSG-convention axis order (latitude first, then longitude),
    /// as used by e.g. `EPSG:4326` -- contrast with [`Self::ellipsoidal_2d`]
    /// which gives the `CRS:84`/GIS-convention (longitude, latitude) order.
    pub fn ellipsoidal_2d_lat_lon() -> Self {
        use crate::axis::constants::*;
        Self::new(CsKind::Ellipsoidal2D, vec![geodetic_latitude(), geodetic_longitude()])
    }

    pub fn ellipsoidal_3d() -> Self {
        use crate::axis::constants::*;
        Self::new(
            CsKind::Ellipsoidal3D,
            vec![geodetic_longitude(), geodetic_latitude(), ellipsoidal_height()],
        )
    }

    /// EPSG-convention 3D axis order (latitude, longitude, ellipsoidal
    /// height), as used by `EPSG:4979`.
    pub fn ellipsoidal_3d_lat_lon() -> Self {
        use crate::axis::constants::*;
        Self::new(
            CsKind::Ellipsoidal3D,
            vec![geodetic_latitude(), geodetic_longitude(), ellipsoidal_height()],
        )
    }

    /// The internal radians-based layout map projections and the geodetic
    /// <-> geocentric conversion operate on, regardless of what unit a
    /// real geographic CRS's axes declare (see
    /// `axis::constants::geodetic_longitude_radians`).
    pub fn ellipsoidal_2d_radians() -> Self {
        use crate::axis::constants::*;
        Self::new(CsKind::Ellipsoidal2D, vec![geodetic_longitude_radians(), geodetic_latitude_radians()])
    }

    pub fn ellipsoidal_3d_radians() -> Self {
        use crate::axis::constants::*;
        Self::new(
            CsKind::Ellipsoidal3D,
            vec![geodetic_longitude_radians(), geodetic_latitude_radians(), ellipsoidal_height()],
        )
    }

    pub fn geocentric() -> Self {
        use crate::axis::constants::*;
        Self::new(CsKind::Cartesian3D, vec![geocentric_x(), geocentric_y(), geocentric_z()])
    }

    pub fn cartesian_2d() -> Self {
        use crate::axis::constants::*;
        Self::new(CsKind::Cartesian2D, vec![easting(), northing()])
    }

    pub fn vertical() -> Self {
        use crate::axis::constants::gravity_related_height;
        Self::new(CsKind::Vertical, vec![gravity_related_height()])
    }

    pub fn depth() -> Self {
        use crate::axis::constants::depth;
        Self::new(CsKind::Vertical, vec![depth()])
    }

    pub fn time() -> Self {
        use crate::axis::constants::time;
        Self::new(CsKind::Time, vec![time()])
    }

    /// Build the matrix that maps a point expressed in `self`'s axis order,
    /// units and directions onto the same physical point expressed in
    /// `target`'s. Both CSs must have the same dimension and the same
    /// *set* of axis directions (only order, sign and unit may differ);
    /// anything else is a `MismatchedDimensions` error, since that is a
    /// real CRS mismatch rather than a reorderable axis change.
    pub fn normalization_matrix_to(&self, target: &CoordinateSystem) -> crate::errors::Result<Matrix> {
        use crate::errors::Error;

        if self.dimension() != target.dimension() {
            return Err(Error::MismatchedDimensions {
                expected: target.dimension(),
                actual: self.dimension(),
            });
        }
        let n = self.dimension();
        let mut m = Matrix::identity(n + 1);

        for (dst_index, dst_axis) in target.axes.iter().enumerate() {
            let (src_index, src_axis) = self
                .axes
                .iter()
                .enumerate()
                .find(|(_, a)| same_axis_family(a.direction, dst_axis.direction))
                .ok_or(Error::MismatchedDimensions {
                    expected: target.dimension(),
                    actual: self.dimension(),
                })?;

            let ratio = src_axis.unit.ratio_to(&dst_axis.unit)?;
            let sign = if src_axis.direction == dst_axis.direction {
                1.0
            } else if src_axis.direction.is_opposite_of(&dst_axis.direction) {
                -1.0
            } else {
                1.0
            };
            m.set(dst_index, src_index, sign * ratio);
            m.set(dst_index, n, 0.0);
        }
        Ok(m)
    }
}

/// Two axis directions are "the same family" when they describe the same
/// physical quantity up to sign (East/West both describe the horizontal
/// longitude-like axis, etc). Used to pair up axes by meaning rather than
/// by position when building a reordering matrix.
pub(crate) fn same_axis_family(a: AxisDirection, b: AxisDirection) -> bool {
    use AxisDirection::*;
    matches!(
        (a, b),
        (East, East)
            | (East, West)
            | (West, East)
            | (West, West)
            | (North, North)
            | (North, South)
            | (South, North)
            | (South, South)
            | (Up, Up)
            | (Up, Down)
            | (Down, Up)
            | (Down, Down)
            | (Future, Future)
            | (Future, Past)
            | (Past, Future)
            | (Past, Past)
            | (Column, Column)
            | (Row, Row)
            | (DisplayRight, DisplayRight)
            | (DisplayDown, DisplayDown)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ellipsoidal_to_cartesian_dimension_mismatch_is_rejected() {
        let geo = CoordinateSystem::ellipsoidal_2d();
        let cart = CoordinateSystem::geocentric();
        assert!(geo.normalization_matrix_to(&cart).is_err());
    }

    #[test]
    fn axis_swap_matrix_for_lat_lon_to_lon_lat() {
        let lon_lat = CoordinateSystem::ellipsoidal_2d();
        let mut axes = lon_lat.axes.clone();
        axes.swap(0, 1);
        let lat_lon = CoordinateSystem::new(CsKind::Ellipsoidal2D, axes);

        let m = lat_lon.normalization_matrix_to(&lon_lat).unwrap();
        // Row 0 (target lon) picks source column 1 (source lat position... )
        assert_eq!(m.get(0, 1), 1.0);
        assert_eq!(m.get(1, 0), 1.0);
        assert_eq!(m.get(0, 0), 0.0);
    }
}
