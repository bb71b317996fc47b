use linfit_core::{Float, Matrix};

use crate::{comparable, LOSS_SENTINEL};

/// Error summary of a regressor on one labelled set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionReport {
    pub mse: f64,
    pub sse: f64,
    pub r_squared: f64,
}

impl RegressionReport {
    pub fn compute<T: Float>(y_true: &Matrix<T>, y_pred: &Matrix<T>) -> Self {
        RegressionReport {
            mse: mse(y_true, y_pred),
            sse: sse(y_true, y_pred),
            r_squared: r_squared(y_true, y_pred),
        }
    }
}

/// Mean Squared Error.
///
/// Returns [`LOSS_SENTINEL`] when the shapes differ.
pub fn mse<T: Float>(y_true: &Matrix<T>, y_pred: &Matrix<T>) -> f64 {
    if !comparable("mse", y_true, y_pred) {
        return LOSS_SENTINEL;
    }
    sum_squared(y_true, y_pred) / y_true.len() as f64
}

/// Sum of Squared Errors.
pub fn sse<T: Float>(y_true: &Matrix<T>, y_pred: &Matrix<T>) -> f64 {
    if !comparable("sse", y_true, y_pred) {
        return LOSS_SENTINEL;
    }
    sum_squared(y_true, y_pred)
}

/// R² (coefficient of determination): `1 - SSE / TSS`.
///
/// Labels with zero total variance score 1 regardless of the predictions.
/// Returns NaN when the shapes differ.
pub fn r_squared<T: Float>(y_true: &Matrix<T>, y_pred: &Matrix<T>) -> f64 {
    if !comparable("r_squared", y_true, y_pred) {
        return f64::NAN;
    }
    let n = y_true.len() as f64;
    let mean_true: f64 = y_true.data().iter().map(|v| v.to_f64()).sum::<f64>() / n;

    let ss_tot: f64 = y_true
        .data()
        .iter()
        .map(|&t| {
            let d = t.to_f64() - mean_true;
            d * d
        })
        .sum();

    if ss_tot == 0.0 {
        return 1.0;
    }
    1.0 - sum_squared(y_true, y_pred) / ss_tot
}

fn sum_squared<T: Float>(y_true: &Matrix<T>, y_pred: &Matrix<T>) -> f64 {
    y_true
        .data()
        .iter()
        .zip(y_pred.data().iter())
        .map(|(&t, &p)| {
            let d = (t - p).to_f64();
            d * d
        })
        .sum()
}
