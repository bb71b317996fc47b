use linfit_core::{Float, LinfitResult, Matrix};
use linfit_data::DataSource;
use linfit_metrics::{accuracy, hinge, ClassificationReport};
use linfit_model::{
    check_signed_labels, fit, margin_subgradient, ModelConfig, ModelState, Objective, TrainParams,
    TrainingContext, TrainingData, TrainingHistory,
};
use linfit_preprocessing::augment_with_bias;

/// Hinge loss `max(0, 1 - y·ŷ)`, unregularized.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hinge;

impl<T: Float> Objective<T> for Hinge {
    fn name(&self) -> &'static str {
        "linear svm"
    }

    fn loss(&self, labels: &Matrix<T>, scores: &Matrix<T>) -> f64 {
        hinge(labels, scores)
    }

    fn gradient(
        &self,
        features_t: &Matrix<T>,
        labels: &Matrix<T>,
        scores: &Matrix<T>,
    ) -> LinfitResult<Matrix<T>> {
        margin_subgradient(features_t, labels, scores, T::ONE)
    }
}

/// Linear Support Vector Classifier over ±1 labels.
///
/// Primal hinge loss minimized by full-batch subgradient descent from
/// zero weights. There is no regularization term.
#[derive(Debug, Clone)]
pub struct LinearSvm<T: Float> {
    ctx: TrainingContext<T>,
}

impl<T: Float> LinearSvm<T> {
    pub fn new(features: Matrix<T>, labels: Matrix<T>, config: ModelConfig) -> LinfitResult<Self> {
        check_signed_labels(&labels, &config)?;
        Ok(LinearSvm {
            ctx: TrainingContext::new(features, labels, config)?,
        })
    }

    pub fn from_source<S: DataSource<T>>(source: &S, config: ModelConfig) -> LinfitResult<Self> {
        if source.is_good() {
            check_signed_labels(source.labels(), &config)?;
        }
        Ok(LinearSvm {
            ctx: TrainingContext::from_source(source, config)?,
        })
    }

    pub fn from_state(state: ModelState<T>) -> LinfitResult<Self> {
        Ok(LinearSvm {
            ctx: TrainingContext::from_state(state)?,
        })
    }

    pub fn train(&mut self, epochs: usize, learning_rate: f64) -> LinfitResult<TrainingHistory> {
        self.train_with(&TrainParams::new(epochs, learning_rate))
    }

    pub fn train_with(&mut self, params: &TrainParams) -> LinfitResult<TrainingHistory> {
        fit(&mut self.ctx, &Hinge, params)
    }

    pub fn decision_function(&self, x: &Matrix<T>) -> LinfitResult<Matrix<T>> {
        self.ctx.scores(x)
    }

    /// `+1` for a non-negative score, `-1` otherwise.
    pub fn output(&self, x: &Matrix<T>) -> LinfitResult<Matrix<T>> {
        Ok(classify_inclusive(&self.decision_function(x)?))
    }

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
            accuracy: accuracy(labels, &classify_inclusive(&scores)),
            loss: hinge(labels, &scores),
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

/// `s >= 0 → +1`, otherwise `-1`. A zero score is positive.
pub fn classify_inclusive<T: Float>(scores: &Matrix<T>) -> Matrix<T> {
    scores.apply(|s| if s >= T::ZERO { T::ONE } else { T::NEG_ONE })
}

#[cfg(test)]
mod tests {
    use super::*;
    use linfit_core::LinfitError;

    fn blobs() -> (Matrix<f64>, Matrix<f64>) {
        let x = Matrix::from_rows(&[
            vec![2.0, 3.0],
            vec![3.0, 3.0],
            vec![3.0, 4.0],
            vec![4.0, 5.0],
            vec![-2.0, -1.0],
            vec![-3.0, -2.0],
            vec![-1.0, -3.0],
            vec![-2.0, -4.0],
        ])
        .unwrap();
        let y = Matrix::column(&[1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, -1.0]);
        (x, y)
    }

    #[test]
    fn test_separable_data() {
        let (x, y) = blobs();
        let mut svm = LinearSvm::new(x.clone(), y.clone(), ModelConfig::default()).unwrap();
        assert_eq!(svm.weights(), &Matrix::zeros(3, 1));

        let history = svm.train(200, 0.1).unwrap();
        // zero weights: every row sits on the margin boundary
        assert_eq!(history.records()[0].loss, 1.0);
        assert_eq!(history.final_loss(), Some(0.0));

        let report = svm.evaluate(&augment_with_bias(&x).unwrap(), &y).unwrap();
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.loss, 0.0);
        assert_eq!(svm.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_zero_score_is_positive() {
        let (x, y) = blobs();
        let svm = LinearSvm::new(x.clone(), y, ModelConfig::default()).unwrap();
        // untrained: all scores are exactly zero
        let out = svm.predict(&x).unwrap();
        assert!(out.data().iter().all(|&v| v == 1.0));
        assert_eq!(classify_inclusive(&Matrix::column(&[0.0, -1e-9])).data(), &[1.0, -1.0]);
    }

    #[test]
    fn test_outputs_are_signed() {
        let (x, y) = blobs();
        let mut svm = LinearSvm::new(x, y, ModelConfig::default()).unwrap();
        svm.train(4, 0.05).unwrap();
        let inputs: Matrix<f64> =
            Matrix::from_rows(&[vec![0.3, -0.2], vec![100.0, 1.0], vec![-7.0, 2.0]]).unwrap();
        let out = svm.predict(&inputs).unwrap();
        assert!(out.data().iter().all(|&v| v == 1.0 || v == -1.0));
    }

    #[test]
    fn test_restored_model_matches() {
        let (x, y) = blobs();
        let mut svm = LinearSvm::new(x.clone(), y, ModelConfig::default()).unwrap();
        svm.train(50, 0.1).unwrap();
        svm.release();

        let restored = LinearSvm::from_state(svm.state()).unwrap();
        let x_aug = augment_with_bias(&x).unwrap();
        assert_eq!(
            restored.decision_function(&x_aug).unwrap(),
            svm.decision_function(&x_aug).unwrap()
        );
    }

    #[test]
    fn test_label_normalization_refused() {
        let (x, y) = blobs();
        let config = ModelConfig::new().with_label_normalization(true);
        assert!(matches!(
            LinearSvm::new(x, y, config),
            Err(LinfitError::InvalidParameter(_))
        ));
    }
}
