use linfit_core::{LinfitResult, Matrix};
use linfit_data::DataSource;
use linfit_io::{ModelKind, SavedModel};
use linfit_linear::{LinearRegression, Perceptron};
use linfit_model::{ModelConfig, ModelState, TrainParams, TrainingHistory};
use linfit_preprocessing::augment_with_bias;
use linfit_svm::LinearSvm;

/// One of the three models, picked at run time.
pub enum TrainedModel {
    Linear(LinearRegression<f64>),
    Perceptron(Perceptron<f64>),
    Svm(LinearSvm<f64>),
}

impl TrainedModel {
    /// Build a model of `kind` from `source` and run gradient descent.
    /// Training data is released afterwards.
    pub fn fit<S: DataSource<f64>>(
        kind: ModelKind,
        source: &S,
        config: ModelConfig,
        params: &TrainParams,
    ) -> LinfitResult<(Self, TrainingHistory)> {
        let (model, history) = match kind {
            ModelKind::LinearRegression => {
                let mut m = LinearRegression::from_source(source, config)?;
                let h = m.train_with(params)?;
                m.release();
                (TrainedModel::Linear(m), h)
            }
            ModelKind::Perceptron => {
                let mut m = Perceptron::from_source(source, config)?;
                let h = m.train_with(params)?;
                m.release();
                (TrainedModel::Perceptron(m), h)
            }
            ModelKind::Svm => {
                let mut m = LinearSvm::from_source(source, config)?;
                let h = m.train_with(params)?;
                m.release();
                (TrainedModel::Svm(m), h)
            }
        };
        Ok((model, history))
    }

    pub fn from_saved(saved: SavedModel) -> LinfitResult<Self> {
        Ok(match saved.kind {
            ModelKind::LinearRegression => {
                TrainedModel::Linear(LinearRegression::from_state(saved.state)?)
            }
            ModelKind::Perceptron => TrainedModel::Perceptron(Perceptron::from_state(saved.state)?),
            ModelKind::Svm => TrainedModel::Svm(LinearSvm::from_state(saved.state)?),
        })
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            TrainedModel::Linear(_) => ModelKind::LinearRegression,
            TrainedModel::Perceptron(_) => ModelKind::Perceptron,
            TrainedModel::Svm(_) => ModelKind::Svm,
        }
    }

    pub fn state(&self) -> ModelState<f64> {
        match self {
            TrainedModel::Linear(m) => m.state(),
            TrainedModel::Perceptron(m) => m.state(),
            TrainedModel::Svm(m) => m.state(),
        }
    }

    pub fn to_saved(&self) -> SavedModel {
        SavedModel {
            kind: self.kind(),
            state: self.state(),
        }
    }

    /// Raw-unit predictions for regression, ±1 classes otherwise.
    pub fn predict(&self, features: &Matrix<f64>) -> LinfitResult<Matrix<f64>> {
        match self {
            TrainedModel::Linear(m) => m.predict(features),
            TrainedModel::Perceptron(m) => m.predict(features),
            TrainedModel::Svm(m) => m.predict(features),
        }
    }

    /// Evaluate on a labelled set and return `(name, value)` lines for display.
    pub fn validate<S: DataSource<f64>>(&self, test: &S) -> LinfitResult<Vec<(String, f64)>> {
        let x = augment_with_bias(test.features())?;
        let y = test.labels();
        let lines = match self {
            TrainedModel::Linear(m) => {
                let normalized = m.evaluate_normalized(&x, y)?;
                let raw = m.evaluate(&x, y)?;
                vec![
                    ("MSE (normalized)".to_string(), normalized.mse),
                    ("R2 (normalized)".to_string(), normalized.r_squared),
                    ("MSE".to_string(), raw.mse),
                    ("R2".to_string(), raw.r_squared),
                ]
            }
            TrainedModel::Perceptron(m) => {
                let report = m.evaluate(&x, y)?;
                vec![
                    ("accuracy".to_string(), report.accuracy),
                    ("perceptron loss".to_string(), report.loss),
                ]
            }
            TrainedModel::Svm(m) => {
                let report = m.evaluate(&x, y)?;
                vec![
                    ("accuracy".to_string(), report.accuracy),
                    ("hinge loss".to_string(), report.loss),
                ]
            }
        };
        Ok(lines)
    }
}
