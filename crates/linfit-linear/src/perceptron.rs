use linfit_core::{Float, LinfitResult, Matrix};
use linfit_data::DataSource;
use linfit_metrics::{accuracy, perceptron_loss, ClassificationReport};
use linfit_model::{
    check_signed_labels, fit, margin_subgradient, ModelConfig, ModelState, Objective, TrainParams,
    TrainingContext, TrainingData, TrainingHistory,
};
use linfit_preprocessing::augment_with_bias;

/// Perceptron criterion `max(0, -y·ŷ)` and its subgradient.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerceptronCriterion;

impl<T: Float> Objective<T> for PerceptronCriterion {
    fn name(&self) -> &'static str {
        "perceptron"
    }

    fn loss(&self, labels: &Matrix<T>, scores: &Matrix<T>) -> f64 {
        perceptron_loss(labels, scores)
    }

    fn gradient(
        &self,
        features_t: &Matrix<T>,
        labels: &Matrix<T>,
        scores: &Matrix<T>,
    ) -> LinfitResult<Matrix<T>> {
        margin_subgradient(features_t, labels, scores, T::ZERO)
    }
}

/// Binary perceptron over ±1 labels, trained with full-batch subgradient steps.
///
/// Weights start at one: with all-zero weights every score is zero, no row
/// counts as misclassified and the subgradient never moves.
#[derive(Debug, Clone)]
pub struct Perceptron<T: Float> {
    ctx: TrainingContext<T>,
}

impl<T: Float> Perceptron<T> {
    pub fn new(features: Matrix<T>, labels: Matrix<T>, config: ModelConfig) -> LinfitResult<Self> {
        check_signed_labels(&labels, &config)?;
        Ok(Perceptron {
            ctx: TrainingContext::with_initial_weight(features, labels, config, T::ONE)?,
        })
    }

    pub fn from_source<S: DataSource<T>>(source: &S, config: ModelConfig) -> LinfitResult<Self> {
        if source.is_good() {
            check_signed_labels(source.labels(), &config)?;
        }
        Ok(Perceptron {
            ctx: TrainingContext::from_source_with_initial_weight(source, config, T::ONE)?,
        })
    }

    pub fn from_state(state: ModelState<T>) -> LinfitResult<Self> {
        Ok(Perceptron {
            ctx: TrainingContext::from_state(state)?,
        })
    }

    pub fn train(&mut self, epochs: usize, learning_rate: f64) -> LinfitResult<TrainingHistory> {
        self.train_with(&TrainParams::new(epochs, learning_rate))
    }

    pub fn train_with(&mut self, params: &TrainParams) -> LinfitResult<TrainingHistory> {
        fit(&mut self.ctx, &PerceptronCriterion, params)
    }

    /// Raw scores `X·w` for a bias-augmented matrix.
    pub fn decision_function(&self, x: &Matrix<T>) -> LinfitResult<Matrix<T>> {
        self.ctx.scores(x)
    }

    /// Class labels for a bias-augmented matrix: `+1` for a strictly
    /// positive score, `-1` otherwise.
    pub fn output(&self, x: &Matrix<T>) -> LinfitResult<Matrix<T>> {
        Ok(classify_strict(&self.decision_function(x)?))
    }

    /// Class labels for features without a bias column.
    pub fn predict(&self, features: &Matrix<T>) -> LinfitResult<Matrix<T>> {
        self.output(&augment_with_bias(features)?)
    }

    pub fn evaluate(
        &self,
        x: &Matrix<T>,
        labels: &Matrix<T>,
    ) -> LinfitResult<ClassificationReport> {
        let scores = self.decision_function(x)?;
        Ok(ClassificationReport {
            accuracy: accuracy(labels, &classify_strict(&scores)),
            loss: perceptron_loss(labels, &scores),
        })
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
}

/// `s > 0 → +1`, otherwise `-1`. A zero score is negative.
pub fn classify_strict<T: Float>(scores: &Matrix<T>) -> Matrix<T> {
    scores.apply(|s| if s > T::ZERO { T::ONE } else { T::NEG_ONE })
}

#[cfg(test)]
mod tests {
    use super::*;
    use linfit_core::LinfitError;

    fn points() -> Matrix<f64> {
        Matrix::from_rows(&[
            vec![2.0, 3.0],
            vec![3.0, 3.0],
            vec![3.0, 4.0],
            vec![4.0, 5.0],
            vec![-2.0, -1.0],
            vec![-3.0, -2.0],
            vec![-1.0, -3.0],
            vec![-2.0, -4.0],
        ])
        .unwrap()
    }

    fn labels(upper: f64) -> Matrix<f64> {
        let mut y = vec![upper; 4];
        y.extend(vec![-upper; 4]);
        Matrix::column(&y)
    }

    #[test]
    fn test_weights_start_at_one() {
        let model = Perceptron::new(points(), labels(1.0), ModelConfig::default()).unwrap();
        assert_eq!(model.weights(), &Matrix::ones(3, 1));
    }

    #[test]
    fn test_learns_flipped_blobs() {
        // the all-ones start misclassifies every row
        let y = labels(-1.0);
        let mut model = Perceptron::new(points(), y.clone(), ModelConfig::default()).unwrap();
        let history = model.train(200, 0.1).unwrap();

        assert!(history.records()[0].loss > 0.0);
        assert_eq!(history.final_loss(), Some(0.0));

        let x_aug = augment_with_bias(&points()).unwrap();
        assert_eq!(model.output(&x_aug).unwrap(), y);
        let report = model.evaluate(&x_aug, &y).unwrap();
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.loss, 0.0);
    }

    #[test]
    fn test_separable_start_needs_no_updates() {
        let mut model = Perceptron::new(points(), labels(1.0), ModelConfig::default()).unwrap();
        let history = model.train(5, 0.1).unwrap();
        assert!(history.losses().iter().all(|&l| l == 0.0));
        assert_eq!(model.weights(), &Matrix::ones(3, 1));
    }

    #[test]
    fn test_outputs_are_signed() {
        let mut model = Perceptron::new(points(), labels(-1.0), ModelConfig::default()).unwrap();
        model.train(3, 0.01).unwrap();
        let inputs: Matrix<f64> =
            Matrix::from_rows(&[vec![0.0, 0.0], vec![10.0, -10.0], vec![-0.5, 7.0]]).unwrap();
        let out = model.predict(&inputs).unwrap();
        assert!(out.data().iter().all(|&v| v == 1.0 || v == -1.0));
    }

    #[test]
    fn test_zero_score_is_negative() {
        let model = Perceptron::new(points(), labels(1.0), ModelConfig::default()).unwrap();
        let mut state = model.state();
        state.weights = Matrix::zeros(3, 1);
        let zeroed = Perceptron::from_state(state).unwrap();

        let out = zeroed.predict(&points()).unwrap();
        assert!(out.data().iter().all(|&v| v == -1.0));
        let scores = Matrix::column(&[0.0, 1e-9, -1e-9]);
        assert_eq!(classify_strict(&scores).data(), &[-1.0, 1.0, -1.0]);
    }

    #[test]
    fn test_rejects_non_signed_labels() {
        let y = Matrix::column(&[1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
        assert!(matches!(
            Perceptron::new(points(), y, ModelConfig::default()),
            Err(LinfitError::InvalidParameter(_))
        ));
    }
}
