use linfit_core::{Float, LinfitError, LinfitResult, Matrix};
use linfit_data::DataSource;
use linfit_preprocessing::{
    apply_normalization, augment_with_bias, fit_and_normalize, Normalizer, NormalizerTable,
};
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;

/// Prepared training matrices. Owned by the context until released.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingData<T: Float> {
    /// Normalized, bias-augmented features, `n x (d + 1)`.
    pub features: Matrix<T>,
    /// Labels, `n x 1`, normalized when label normalization is on.
    pub labels: Matrix<T>,
}

/// Everything a trained model needs for inference, and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct ModelState<T: Float> {
    pub config: ModelConfig,
    pub weights: Matrix<T>,
    pub normalizers: NormalizerTable<T>,
    pub label_normalizer: Option<Normalizer<T>>,
}

/// Shared state of every linear model: prepared data, weights, and the
/// normalization statistics fitted at construction time.
///
/// Concrete models hold one of these and hand it to [`crate::fit`] together
/// with their loss/gradient. The starting weight is fixed at construction
/// and afterwards only the trainer mutates the weights.
#[derive(Debug, Clone)]
pub struct TrainingContext<T: Float> {
    config: ModelConfig,
    pub(crate) data: Option<TrainingData<T>>,
    pub(crate) weights: Matrix<T>,
    normalizers: NormalizerTable<T>,
    label_normalizer: Option<Normalizer<T>>,
    n_samples: usize,
}

impl<T: Float> TrainingContext<T> {
    /// Take ownership of `features` (`n x d`) and `labels` (`n x 1`), augment
    /// with a bias column, fit the normalizers and zero the weights.
    pub fn new(features: Matrix<T>, labels: Matrix<T>, config: ModelConfig) -> LinfitResult<Self> {
        Self::with_initial_weight(features, labels, config, T::ZERO)
    }

    /// Like [`new`](Self::new) but every weight, bias included, starts at `initial`.
    pub fn with_initial_weight(
        features: Matrix<T>,
        labels: Matrix<T>,
        config: ModelConfig,
        initial: T,
    ) -> LinfitResult<Self> {
        if labels.cols() != 1 || labels.rows() != features.rows() {
            return Err(LinfitError::ShapeMismatch {
                expected: (features.rows(), 1),
                got: labels.shape(),
            });
        }

        let (labels, label_normalizer) = if config.normalize_labels {
            let norm = Normalizer::fit_matrix(&labels);
            if norm.is_degenerate() {
                log::warn!("labels have zero variance; they will only be centered");
            }
            (norm.transform_matrix(&labels), Some(norm))
        } else {
            (labels, None)
        };

        let mut augmented = augment_with_bias(&features)?;
        drop(features);
        let normalizers = fit_and_normalize(&mut augmented, config.first_normalized_column())?;

        let (n, cols) = augmented.shape();
        log::info!(
            "prepared {} samples x {} features ({} normalized, labels normalized: {})",
            n,
            cols - 1,
            normalizers.len(),
            config.normalize_labels
        );

        Ok(TrainingContext {
            config,
            data: Some(TrainingData {
                features: augmented,
                labels,
            }),
            weights: Matrix::full(cols, 1, initial),
            normalizers,
            label_normalizer,
            n_samples: n,
        })
    }

    /// Copy the matrices out of a data source. A source that failed to load
    /// is refused.
    pub fn from_source<S: DataSource<T>>(source: &S, config: ModelConfig) -> LinfitResult<Self> {
        Self::from_source_with_initial_weight(source, config, T::ZERO)
    }

    pub fn from_source_with_initial_weight<S: DataSource<T>>(
        source: &S,
        config: ModelConfig,
        initial: T,
    ) -> LinfitResult<Self> {
        if !source.is_good() {
            log::error!("refusing to build a model from a failed data source");
            return Err(LinfitError::LoadFailed(
                "data source reported an unsuccessful load".to_string(),
            ));
        }
        Self::with_initial_weight(
            source.features().clone(),
            source.labels().clone(),
            config,
            initial,
        )
    }

    /// Rebuild an inference-only context from a saved state.
    pub fn from_state(state: ModelState<T>) -> LinfitResult<Self> {
        let ModelState {
            config,
            weights,
            normalizers,
            label_normalizer,
        } = state;

        if !weights.is_consistent() || weights.cols() != 1 || weights.rows() == 0 {
            return Err(LinfitError::InvalidParameter(format!(
                "weights must be a non-empty column vector, got shape {:?}",
                weights.shape()
            )));
        }
        let expected: Vec<usize> = (config.first_normalized_column()..weights.rows()).collect();
        if normalizers.columns() != expected {
            return Err(LinfitError::InvalidParameter(format!(
                "normalizer columns {:?} do not match start_norm {} and {} weights",
                normalizers.columns(),
                config.start_norm,
                weights.rows()
            )));
        }
        if label_normalizer.is_some() != config.normalize_labels {
            return Err(LinfitError::InvalidParameter(
                "label normalizer does not match the label normalization setting".to_string(),
            ));
        }

        Ok(TrainingContext {
            config,
            data: None,
            weights,
            normalizers,
            label_normalizer,
            n_samples: 0,
        })
    }

    /// Snapshot the parts needed for inference.
    pub fn state(&self) -> ModelState<T> {
        ModelState {
            config: self.config,
            weights: self.weights.clone(),
            normalizers: self.normalizers.clone(),
            label_normalizer: self.label_normalizer,
        }
    }

    /// Give up the training matrices. Weights and normalizers stay, so
    /// inference keeps working; further training fails with `DataReleased`.
    pub fn release(&mut self) -> Option<TrainingData<T>> {
        self.data.take()
    }

    pub fn is_released(&self) -> bool {
        self.data.is_none()
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn labels(&self) -> LinfitResult<&Matrix<T>> {
        self.data
            .as_ref()
            .map(|d| &d.labels)
            .ok_or(LinfitError::DataReleased)
    }

    /// Normalized, bias-augmented training features.
    pub fn features(&self) -> LinfitResult<&Matrix<T>> {
        self.data
            .as_ref()
            .map(|d| &d.features)
            .ok_or(LinfitError::DataReleased)
    }

    pub fn weights(&self) -> &Matrix<T> {
        &self.weights
    }

    /// `(n, d + 1)` of the training matrix. `n` is 0 for a restored model.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_samples, self.weights.rows())
    }

    /// Number of features, excluding the bias column.
    pub fn n_features(&self) -> usize {
        self.weights.rows() - 1
    }

    pub fn normalizers(&self) -> &NormalizerTable<T> {
        &self.normalizers
    }

    pub fn label_normalizer(&self) -> Option<&Normalizer<T>> {
        self.label_normalizer.as_ref()
    }

    pub fn label_mean(&self) -> Option<T> {
        self.label_normalizer.map(|n| n.mean)
    }

    pub fn label_std(&self) -> Option<T> {
        self.label_normalizer.map(|n| n.std)
    }

    /// Normalize a bias-augmented input matrix with the stored statistics.
    ///
    /// Every column from the first normalized column onward must have been
    /// fitted at training time; an unknown column is an error, never skipped.
    pub fn prepare_inputs(&self, x: &Matrix<T>) -> LinfitResult<Matrix<T>> {
        for c in self.config.first_normalized_column()..x.cols() {
            self.normalizers.lookup(c)?;
        }
        let mut prepared = x.clone();
        apply_normalization(&mut prepared, &self.normalizers)?;
        Ok(prepared)
    }

    /// Raw scores `X·w` for a bias-augmented input.
    pub fn scores(&self, x: &Matrix<T>) -> LinfitResult<Matrix<T>> {
        self.prepare_inputs(x)?.matmul(&self.weights)
    }

    /// Map values from the training label space back to raw label units.
    pub fn restore_labels(&self, y: &Matrix<T>) -> Matrix<T> {
        match &self.label_normalizer {
            Some(norm) => norm.inverse_matrix(y),
            None => y.clone(),
        }
    }

    /// Map raw labels into the training label space.
    pub fn normalize_labels(&self, y: &Matrix<T>) -> Matrix<T> {
        match &self.label_normalizer {
            Some(norm) => norm.transform_matrix(y),
            None => y.clone(),
        }
    }
}

/// Classifier labels must be coded as -1 / +1 and must not be normalized.
pub fn check_signed_labels<T: Float>(labels: &Matrix<T>, config: &ModelConfig) -> LinfitResult<()> {
    if config.normalize_labels {
        return Err(LinfitError::InvalidParameter(
            "label normalization is not supported for ±1 classifiers".to_string(),
        ));
    }
    if let Some(pos) = labels.data().iter().position(|&y| y != T::ONE && y != T::NEG_ONE) {
        return Err(LinfitError::InvalidParameter(format!(
            "classifier labels must be -1 or +1, row {} has {}",
            pos,
            labels.data()[pos]
        )));
    }
    Ok(())
}
