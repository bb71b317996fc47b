use linfit_core::{Float, LinfitResult, Matrix};
use linfit_data::DataSource;
use linfit_metrics::{mse, RegressionReport};
use linfit_model::{
    fit, ModelConfig, ModelState, Objective, TrainParams, TrainingContext, TrainingData,
    TrainingHistory,
};
use linfit_preprocessing::augment_with_bias;

/// Mean squared error with gradient `(2/n) Xᵀ(ŷ - y)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredError;

impl<T: Float> Objective<T> for SquaredError {
    fn name(&self) -> &'static str {
        "linear regression"
    }

    fn loss(&self, labels: &Matrix<T>, scores: &Matrix<T>) -> f64 {
        mse(labels, scores)
    }

    fn gradient(
        &self,
        features_t: &Matrix<T>,
        labels: &Matrix<T>,
        scores: &Matrix<T>,
    ) -> LinfitResult<Matrix<T>> {
        squared_error_gradient(features_t, labels, scores)
    }
}

/// `(2/n) Xᵀ(ŷ - y)`, with `features_t` already transposed.
pub fn squared_error_gradient<T: Float>(
    features_t: &Matrix<T>,
    labels: &Matrix<T>,
    scores: &Matrix<T>,
) -> LinfitResult<Matrix<T>> {
    let residual = scores.sub(labels)?;
    let scale = T::TWO / T::from_usize(labels.rows());
    Ok(features_t.matmul(&residual)?.mul_scalar(scale))
}

/// Least-squares linear regression fitted by full-batch gradient descent.
///
/// Features are bias-augmented and z-scored at construction; the fitted
/// statistics are reused for every later prediction.
#[derive(Debug, Clone)]
pub struct LinearRegression<T: Float> {
    ctx: TrainingContext<T>,
}

impl<T: Float> LinearRegression<T> {
    pub fn new(features: Matrix<T>, labels: Matrix<T>, config: ModelConfig) -> LinfitResult<Self> {
        Ok(LinearRegression {
            ctx: TrainingContext::new(features, labels, config)?,
        })
    }

    pub fn from_source<S: DataSource<T>>(source: &S, config: ModelConfig) -> LinfitResult<Self> {
        Ok(LinearRegression {
            ctx: TrainingContext::from_source(source, config)?,
        })
    }

    /// Inference-only model rebuilt from a saved state.
    pub fn from_state(state: ModelState<T>) -> LinfitResult<Self> {
        Ok(LinearRegression {
            ctx: TrainingContext::from_state(state)?,
        })
    }

    pub fn train(&mut self, epochs: usize, learning_rate: f64) -> LinfitResult<TrainingHistory> {
        self.train_with(&TrainParams::new(epochs, learning_rate))
    }

    pub fn train_with(&mut self, params: &TrainParams) -> LinfitResult<TrainingHistory> {
        fit(&mut self.ctx, &SquaredError, params)
    }

    /// Predictions for a bias-augmented matrix, in the training label space
    /// (normalized when label normalization is on).
    pub fn output(&self, x: &Matrix<T>) -> LinfitResult<Matrix<T>> {
        self.ctx.scores(x)
    }

    /// Predictions for a bias-augmented matrix, in raw label units.
    pub fn output_raw(&self, x: &Matrix<T>) -> LinfitResult<Matrix<T>> {
        Ok(self.ctx.restore_labels(&self.output(x)?))
    }

    /// Predictions in raw label units for features without a bias column.
    pub fn predict(&self, features: &Matrix<T>) -> LinfitResult<Matrix<T>> {
        self.output_raw(&augment_with_bias(features)?)
    }

    /// MSE, SSE and R² of `output_raw(x)` against raw labels.
    pub fn evaluate(&self, x: &Matrix<T>, labels: &Matrix<T>) -> LinfitResult<RegressionReport> {
        let pred = self.output_raw(x)?;
        Ok(RegressionReport::compute(labels, &pred))
    }

    /// Same as [`evaluate`](Self::evaluate), measured in the normalized label space.
    pub fn evaluate_normalized(
        &self,
        x: &Matrix<T>,
        labels: &Matrix<T>,
    ) -> LinfitResult<RegressionReport> {
        let pred = self.output(x)?;
        Ok(RegressionReport::compute(&self.ctx.normalize_labels(labels), &pred))
    }

    pub fn weights(&self) -> &Matrix<T> {
        self.ctx.weights()
    }

    pub fn context(&self) -> &TrainingContext<T> {
        &self.ctx
    }

    pub fn state(&self) -> ModelState<T> {
        self.ctx.state()
    }

    pub fn release(&mut self) -> Option<TrainingData<T>> {
        self.ctx.release()
    }

    pub fn y_mean(&self) -> Option<T> {
        self.ctx.label_mean()
    }

    pub fn y_std(&self) -> Option<T> {
        self.ctx.label_std()
    }
}
