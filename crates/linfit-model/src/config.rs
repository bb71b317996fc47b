use linfit_core::{LinfitError, LinfitResult};
use serde::{Deserialize, Serialize};

/// How a model prepares its training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Z-score the label vector before training.
    pub normalize_labels: bool,
    /// Number of leading feature columns left unnormalized
    /// (one-hot or otherwise already-scaled features).
    pub start_norm: usize,
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label_normalization(mut self, normalize_labels: bool) -> Self {
        self.normalize_labels = normalize_labels;
        self
    }

    pub fn with_start_norm(mut self, start_norm: usize) -> Self {
        self.start_norm = start_norm;
        self
    }

    /// Index of the first normalized column of the bias-augmented matrix.
    pub fn first_normalized_column(&self) -> usize {
        self.start_norm + 1
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            normalize_labels: false,
            start_norm: 0,
        }
    }
}

/// Gradient-descent schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainParams {
    pub epochs: usize,
    pub learning_rate: f64,
}

impl TrainParams {
    pub fn new(epochs: usize, learning_rate: f64) -> Self {
        TrainParams {
            epochs,
            learning_rate,
        }
    }

    /// Epochs must be at least one and the learning rate a positive finite number.
    pub fn validate(&self) -> LinfitResult<()> {
        if self.epochs == 0 {
            return Err(LinfitError::InvalidParameter(
                "epochs must be a positive integer".to_string(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(LinfitError::InvalidParameter(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

impl Default for TrainParams {
    fn default() -> Self {
        TrainParams {
            epochs: 20,
            learning_rate: 1e-3,
        }
    }
}
