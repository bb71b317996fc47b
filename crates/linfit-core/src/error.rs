use thiserror::Error;

/// Core error type shared by every linfit crate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LinfitError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Empty matrix: {rows} rows x {cols} columns")]
    EmptyMatrix { rows: usize, cols: usize },

    #[error("Index out of bounds: ({row}, {col}) for matrix of shape ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Column {column} is out of range for a matrix with {cols} columns")]
    ColumnOutOfRange { column: usize, cols: usize },

    #[error("Column {column} has no fitted normalizer")]
    UnregisteredColumn { column: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Training data has been released")]
    DataReleased,

    #[error("Data source failed to load: {0}")]
    LoadFailed(String),
}

pub type LinfitResult<T> = Result<T, LinfitError>;
