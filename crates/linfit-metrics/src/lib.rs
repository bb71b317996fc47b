pub mod regression;
pub mod classification;

pub use regression::*;
pub use classification::*;

use linfit_core::{Float, Matrix};

/// Returned by loss-like metrics when their inputs cannot be compared.
pub const LOSS_SENTINEL: f64 = -1.0;

/// Check that labels and predictions line up element for element.
/// Logs the reason and returns `false` otherwise.
pub(crate) fn comparable<T: Float>(metric: &str, y_true: &Matrix<T>, y_pred: &Matrix<T>) -> bool {
    if y_true.shape() != y_pred.shape() {
        log::warn!(
            "{}: shape mismatch between labels {:?} and predictions {:?}",
            metric,
            y_true.shape(),
            y_pred.shape()
        );
        return false;
    }
    if y_true.is_empty() {
        log::warn!("{}: no samples to evaluate", metric);
        return false;
    }
    true
}
