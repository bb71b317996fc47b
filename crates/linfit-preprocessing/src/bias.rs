use linfit_core::{Float, LinfitError, LinfitResult, Matrix};

/// Prepend a column of ones to `features`.
///
/// The result has shape `(n, d + 1)`; column 0 is the bias column and
/// columns `1..=d` are the original features in order.
pub fn augment_with_bias<T: Float>(features: &Matrix<T>) -> LinfitResult<Matrix<T>> {
    let (n, d) = features.shape();
    if n == 0 || d == 0 {
        return Err(LinfitError::EmptyMatrix { rows: n, cols: d });
    }

    let mut data = Vec::with_capacity(n * (d + 1));
    for i in 0..n {
        data.push(T::ONE);
        data.extend_from_slice(features.row(i)?);
    }
    Matrix::new(data, n, d + 1)
}
