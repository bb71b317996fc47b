use linfit_core::{LinfitError, LinfitResult, Matrix};
use linfit_data::MatrixDataset;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Standard normal sample via Box-Muller.
fn gaussian(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-10);
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Generate regression data `y = X·w + intercept + noise`.
///
/// Features are uniform on `[-5, 5)`, one column per entry of `weights`;
/// `noise` is the standard deviation of the Gaussian noise on `y`.
pub fn make_linear(
    n_samples: usize,
    weights: &[f64],
    intercept: f64,
    noise: f64,
    seed: Option<u64>,
) -> LinfitResult<MatrixDataset<f64>> {
    if n_samples == 0 || weights.is_empty() {
        return Err(LinfitError::InvalidParameter(
            "make_linear needs at least one sample and one weight".to_string(),
        ));
    }
    let mut rng = rng_from(seed);
    let n_features = weights.len();

    let mut features = Vec::with_capacity(n_samples * n_features);
    let mut labels = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let mut y = intercept;
        for &w in weights {
            let x = rng.gen_range(-5.0..5.0);
            y += w * x;
            features.push(x);
        }
        labels.push(y + noise * gaussian(&mut rng));
    }

    MatrixDataset::new(
        Matrix::new(features, n_samples, n_features)?,
        Matrix::column(&labels),
    )
}

/// Generate two linearly separable blobs labelled `+1` and `-1`.
///
/// Every coordinate of a `+1` sample is `gap / 2 + |z|` with `z` standard
/// normal, and the mirror image for `-1`, so the hyperplane `Σx = 0`
/// separates the classes with a margin that grows with `gap`. The first
/// half of the rows is `+1`.
pub fn make_separable(
    n_samples: usize,
    n_features: usize,
    gap: f64,
    seed: Option<u64>,
) -> LinfitResult<MatrixDataset<f64>> {
    if n_samples < 2 || n_features == 0 {
        return Err(LinfitError::InvalidParameter(
            "make_separable needs two samples and one feature".to_string(),
        ));
    }
    if !(gap.is_finite() && gap > 0.0) {
        return Err(LinfitError::InvalidParameter(format!(
            "gap must be positive, got {}",
            gap
        )));
    }
    let mut rng = rng_from(seed);
    let n_positive = n_samples / 2 + n_samples % 2;

    let mut features = Vec::with_capacity(n_samples * n_features);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let label = if i < n_positive { 1.0 } else { -1.0 };
        for _ in 0..n_features {
            features.push(label * (gap / 2.0 + gaussian(&mut rng).abs()));
        }
        labels.push(label);
    }

    MatrixDataset::new(
        Matrix::new(features, n_samples, n_features)?,
        Matrix::column(&labels),
    )
}
