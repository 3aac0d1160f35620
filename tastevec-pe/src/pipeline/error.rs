use std::fmt;
use thiserror::Error;

/// Pipeline stage that ran out of usable rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    MatrixBuild,
    RadiusEstimation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::MatrixBuild => write!(f, "matrix build"),
            Stage::RadiusEstimation => write!(f, "radius estimation"),
        }
    }
}

/// Terminal failures of a preference estimation run.
///
/// Per-track provider failures never appear here; they are absorbed into
/// missing feature data before the pipeline starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Empty track set.
    #[error("no tracks supplied")]
    InvalidInput,

    /// Not enough complete feature rows to continue.
    #[error("insufficient data for {stage}: {usable} usable rows, need at least {required}")]
    InsufficientData {
        stage: Stage,
        usable: usize,
        required: usize,
    },

    /// Every surviving row was classified as noise.
    #[error("no dominant cluster: all {rows} rows classified as noise")]
    NoDominantCluster { rows: usize },

    /// Invalid tunable value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        name: &'static str,
        message: &'static str,
    },

    /// Rows in a matrix have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// NaN or infinite value in a matrix row.
    #[error("non-finite value at row {row}, column {column}")]
    NonFiniteValue { row: usize, column: usize },
}
