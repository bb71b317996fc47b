use linfit_core::{Float, Matrix};

use crate::{comparable, LOSS_SENTINEL};

/// Accuracy and loss of a ±1 classifier on one labelled set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub loss: f64,
}

/// Fraction of rows where the predicted class equals the label (±1 coding).
pub fn accuracy<T: Float>(y_true: &Matrix<T>, y_pred: &Matrix<T>) -> f64 {
    if !comparable("accuracy", y_true, y_pred) {
        return LOSS_SENTINEL;
    }
    let correct = y_true
        .data()
        .iter()
        .zip(y_pred.data().iter())
        .filter(|(&t, &p)| t == p)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Hinge loss: mean of `max(0, 1 - y·ŷ)`.
pub fn hinge<T: Float>(y_true: &Matrix<T>, scores: &Matrix<T>) -> f64 {
    if !comparable("hinge", y_true, scores) {
        return LOSS_SENTINEL;
    }
    mean_margin_loss(y_true, scores, 1.0)
}

/// Perceptron criterion: mean of `max(0, -y·ŷ)`.
pub fn perceptron_loss<T: Float>(y_true: &Matrix<T>, scores: &Matrix<T>) -> f64 {
    if !comparable("perceptron_loss", y_true, scores) {
        return LOSS_SENTINEL;
    }
    mean_margin_loss(y_true, scores, 0.0)
}

fn mean_margin_loss<T: Float>(y_true: &Matrix<T>, scores: &Matrix<T>, margin: f64) -> f64 {
    let total: f64 = y_true
        .data()
        .iter()
        .zip(scores.data().iter())
        .map(|(&y, &s)| (margin - (y * s).to_f64()).max(0.0))
        .sum();
    total / y_true.len() as f64
}
