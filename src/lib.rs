//!
//! A coordinate reference system model and coordinate-operation finder.
//!
//! References:
//! * <http://docs.opengeospatial.org/as/18-005r5/18-005r5.html>
//! * <https://proj.org/development/reference/cpp/cpp_general.html>
//!
//! [`crs::Crs`] models the handful of CRS kinds ISO 19111 distinguishes
//! (geodetic, projected, vertical, temporal, engineering, compound,
//! derived) as a tagged union rather than a class hierarchy, so matching
//! on the kind a caller actually has is exhaustive rather than a chain of
//! downcasts. [`operation_finder::find_operation`] is the single entry
//! point for turning a pair of CRSs into an evaluable
//! [`math_transform::MathTransform`]; [`authority`] resolves the textual
//! CRS-code grammars (`EPSG:4326`, `urn:ogc:def:...`, `AUTO:42001,...`)
//! into the `Crs` values the finder consumes, and [`transform`] applies
//! the resulting operation to actual points.
//!
//! There is no support for parsing or emitting WKT or PROJ strings; a CRS
//! is built programmatically or resolved through [`authority`].
//!

mod math;

pub mod adaptors;
pub mod authority;
pub mod axis;
pub mod crs;
pub mod cs;
pub mod datum;
pub mod ellipsoid;
pub mod errors;
pub mod geodesic;
pub mod interpolation;
pub mod math_transform;
pub mod matrix;
pub mod operation;
pub mod operation_finder;
pub mod parameter;
pub mod prime_meridian;
pub mod projections;
pub mod transform;
pub mod units;

// log for logging (optional).
#[cfg(feature = "logging")]
use log;

#[cfg(not(feature = "logging"))]
mod log {
    // Use __XXX__ to prevent 'ambiguous name' error
    // when exporting
    macro_rules! __trace__    ( ($($tt:tt)*) => {{}} );
    macro_rules! __debug__    ( ($($tt:tt)*) => {{}} );
    macro_rules! __error__    ( ($($tt:tt)*) => {{}} );
    macro_rules! __info__     ( ($($tt:tt)*) => {{}} );
    macro_rules! __warn__     ( ($($tt:tt)*) => {{}} );

    #[allow(unused_imports)]
    pub(crate) use {
        __debug__ as debug, __error__ as error, __info__ as info, __trace__ as trace,
        __warn__ as warn,
    };
}
