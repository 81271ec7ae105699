use thiserror::Error;

/// Errors raised while building or using a grid-composed transform.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Projection error: {0}")]
    Projection(#[from] ProjError),

    #[error("Datum error: {0}")]
    Datum(#[from] DatumError),

    #[error("Invalid affine transform: {0}")]
    Affine(String),
}

/// Per-point and construction-time projection failures.
///
/// Per-point variants (`PointAtInfinity`, `OutsideDomain`, `NonConvergence`)
/// are recovered locally by the grid layer as NaN output; the construction
/// variants are fatal to the constructor that raised them.
#[derive(Error, Debug)]
pub enum ProjError {
    #[error("Point projects into infinity")]
    PointAtInfinity,

    #[error("Point cannot be projected: {0}")]
    OutsideDomain(String),

    #[error("Iteration failed to converge: {0}")]
    NonConvergence(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown zone: {0}")]
    UnknownZone(i32),
}

/// Datum table lookup and parse failures.
#[derive(Error, Debug)]
pub enum DatumError {
    #[error("No datum available for spheroid code {0}")]
    NotFound(i32),

    #[error("Malformed datum table entry for key {key}: {reason}")]
    Malformed { key: String, reason: String },
}
