//!
//! Crate errors
//!

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unknown code '{code}' for authority '{authority}'")]
    AuthorityCodeUnknown { authority: String, code: String },
    #[error("Authority '{authority}' is unavailable")]
    AuthorityUnavailable { authority: String },
    #[error("No coordinate operation found from '{source}' to '{target}'")]
    OperationNotFound { source: String, target: String },
    #[error("Operation '{what}' is not invertible")]
    NonInvertibleOperation { what: String },
    #[error("Matrix is not invertible")]
    NonInvertibleMatrix,
    #[error("'{method}' failed to converge after {iterations} iterations")]
    NoConvergence {
        method: &'static str,
        iterations: usize,
    },
    #[error("Cannot convert from unit '{from}' to unit '{to}'")]
    IncommensurableUnits { from: String, to: String },
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    MismatchedDimensions { expected: usize, actual: usize },
    #[error("Recursive operation creation detected for pair '{pair}'")]
    RecursiveCreate { pair: String },
    #[error("Illegal value '{value}' for property '{key}'")]
    IllegalProperty { key: &'static str, value: String },
    #[error("Coordinate epoch shift between frames at different epochs is not supported")]
    UnsupportedEpochShift,
    #[error("Antipodal points on the equator have no stable geodesic solution")]
    EquatorialAntipodal,
    #[error("Unrecognized authority code format '{0}'")]
    UnrecognizedFormat(String),
    #[error("{reason}")]
    InvalidParameterValue { name: String, reason: String },
    #[error("Missing parameter '{0}'")]
    MissingParameter(&'static str),
    #[error("Coordinate value is NaN")]
    NanCoordinateValue,
    #[error("Coordinate out of range")]
    CoordinateOutOfRange,
    #[error("Point array has length {len} which is not a multiple of dimension {dim}")]
    MisalignedPointArray { len: usize, dim: usize },
}

impl Error {
    pub(crate) fn invalid_param(name: &str, reason: impl Into<String>) -> Self {
        Error::InvalidParameterValue {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
