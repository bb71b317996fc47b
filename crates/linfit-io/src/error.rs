use linfit_core::LinfitError;
use thiserror::Error;

/// Failures while reading or writing datasets and model files.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("non-numeric value {value:?} at row {row}, column {col}")]
    Parse { row: usize, col: usize, value: String },

    #[error("no data rows in {0}")]
    NoData(String),

    #[error("need a feature column and a label column, found {0} column(s)")]
    TooFewColumns(usize),

    #[error(transparent)]
    Model(#[from] LinfitError),
}

pub type IoResult<T> = Result<T, IoError>;
