//! # linfit
//!
//! Linear models trained by full-batch gradient descent, sharing one
//! preparation pipeline: a bias column, per-column z-score normalization
//! fitted once at construction, and inference that reuses those statistics.
//!
//! ## Modules
//!
//! - **core**: `Matrix`, the `Float` trait and `LinfitError`
//! - **preprocessing**: bias augmentation, `Normalizer` and `NormalizerTable`
//! - **metrics**: MSE, SSE, R², accuracy, hinge and perceptron losses
//! - **data**: the `DataSource` trait and an in-memory dataset
//! - **model**: `TrainingContext`, `ModelConfig`, the gradient-descent loop
//! - **linear**: `LinearRegression` and `Perceptron`
//! - **svm**: `LinearSvm`
//! - **io**: CSV datasets and JSON model files
//! - **datasets**: synthetic regression and separable classification data

/// Matrix type, float trait and errors.
pub use linfit_core as core;

/// Bias column and feature normalization.
pub use linfit_preprocessing as preprocessing;

/// Evaluation metrics.
pub use linfit_metrics as metrics;

/// Data sources.
pub use linfit_data as data;

/// Shared training context and trainer.
pub use linfit_model as model;

/// Linear regression and perceptron.
pub use linfit_linear as linear;

/// Linear support vector machine.
pub use linfit_svm as svm;

/// I/O utilities.
pub use linfit_io as io;

/// Synthetic datasets.
pub use linfit_datasets as datasets;

/// The types most programs need.
pub mod prelude {
    pub use linfit_core::{Float, LinfitError, LinfitResult, Matrix};
    pub use linfit_data::{DataSource, MatrixDataset};
    pub use linfit_io::{CsvDataset, CsvOptions, ModelKind, SavedModel};
    pub use linfit_linear::{LinearRegression, Perceptron};
    pub use linfit_model::{ModelConfig, ModelState, TrainParams, TrainingHistory};
    pub use linfit_preprocessing::augment_with_bias;
    pub use linfit_svm::LinearSvm;
}
