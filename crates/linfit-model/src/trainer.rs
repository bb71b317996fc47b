use linfit_core::{Float, LinfitError, LinfitResult, Matrix};
use serde::{Deserialize, Serialize};

use crate::config::TrainParams;
use crate::context::TrainingContext;

/// Loss and (sub)gradient of one linear model.
pub trait Objective<T: Float> {
    /// Short name used in log records.
    fn name(&self) -> &'static str;

    /// Loss of `scores = X·w` against `labels`, both `n x 1`.
    fn loss(&self, labels: &Matrix<T>, scores: &Matrix<T>) -> f64;

    /// Gradient with respect to the weights, `(d + 1) x 1`.
    /// `features_t` is the transposed training matrix.
    fn gradient(
        &self,
        features_t: &Matrix<T>,
        labels: &Matrix<T>,
        scores: &Matrix<T>,
    ) -> LinfitResult<Matrix<T>>;
}

/// Upper bound on the records reserved up front; longer runs grow the vector.
const PREALLOCATED_RECORDS: usize = 4096;

/// One diagnostic record per epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    /// 1-based epoch index.
    pub epoch: usize,
    /// Loss measured on the forward pass of this epoch, before the update.
    pub loss: f64,
}

/// Per-epoch losses of one call to [`fit`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    records: Vec<EpochRecord>,
}

impl TrainingHistory {
    fn with_capacity(epochs: usize) -> Self {
        TrainingHistory {
            records: Vec::with_capacity(epochs.min(PREALLOCATED_RECORDS)),
        }
    }

    pub fn records(&self) -> &[EpochRecord] {
        &self.records
    }

    pub fn losses(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.loss).collect()
    }

    pub fn final_loss(&self) -> Option<f64> {
        self.records.last().map(|r| r.loss)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Full-batch (sub)gradient descent over the context's training data.
///
/// Every epoch runs the forward pass, records the loss, then applies
/// `w -= lr * gradient`.
pub fn fit<T, O>(
    ctx: &mut TrainingContext<T>,
    objective: &O,
    params: &TrainParams,
) -> LinfitResult<TrainingHistory>
where
    T: Float,
    O: Objective<T>,
{
    params.validate()?;
    let data = ctx.data.as_ref().ok_or(LinfitError::DataReleased)?;
    let features_t = data.features.t();
    let lr = T::from_f64(params.learning_rate);

    log::info!(
        "training {} with epochs={} lr={}",
        objective.name(),
        params.epochs,
        params.learning_rate
    );

    let mut history = TrainingHistory::with_capacity(params.epochs);
    for i in 0..params.epochs {
        let scores = data.features.matmul(&ctx.weights)?;
        let loss = objective.loss(&data.labels, &scores);
        log::info!("Epoch: {} Loss: {}", i + 1, loss);
        history.records.push(EpochRecord { epoch: i + 1, loss });

        let grad = objective.gradient(&features_t, &data.labels, &scores)?;
        ctx.weights.scaled_sub_assign(lr, &grad)?;
    }

    Ok(history)
}

/// Subgradient shared by the margin-based classifiers:
/// `(-1/n) Xᵀ·mask(y)`, where `mask(y)` keeps `yᵢ` for rows with
/// `margin - yᵢ·ŷᵢ > 0` and zeroes the rest.
///
/// `margin = 0` gives the perceptron criterion, `margin = 1` the hinge loss.
pub fn margin_subgradient<T: Float>(
    features_t: &Matrix<T>,
    labels: &Matrix<T>,
    scores: &Matrix<T>,
    margin: T,
) -> LinfitResult<Matrix<T>> {
    let masked = labels.zip_map(scores, |y, s| {
        if margin - y * s > T::ZERO {
            y
        } else {
            T::ZERO
        }
    })?;
    let n = T::from_usize(labels.rows());
    Ok(features_t.matmul(&masked)?.mul_scalar(T::NEG_ONE / n))
}
