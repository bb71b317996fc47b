use linfit_core::{Float, LinfitError, LinfitResult, Matrix};

/// Anything that can hand a model its training data.
///
/// `is_good` reports whether loading succeeded; models refuse to build from a
/// source that reports failure.
pub trait DataSource<T: Float> {
    /// Feature matrix, `n x d`.
    fn features(&self) -> &Matrix<T>;
    /// Label column, `n x 1`.
    fn labels(&self) -> &Matrix<T>;
    fn is_good(&self) -> bool;

    fn n_samples(&self) -> usize {
        self.features().rows()
    }

    fn n_features(&self) -> usize {
        self.features().cols()
    }
}

/// A dataset wrapping feature and label matrices already in memory.
#[derive(Debug, Clone)]
pub struct MatrixDataset<T: Float> {
    features: Matrix<T>,
    labels: Matrix<T>,
}

impl<T: Float> MatrixDataset<T> {
    /// Pair features with labels. Labels must be a single column with one
    /// entry per feature row.
    pub fn new(features: Matrix<T>, labels: Matrix<T>) -> LinfitResult<Self> {
        if labels.cols() != 1 || labels.rows() != features.rows() {
            return Err(LinfitError::ShapeMismatch {
                expected: (features.rows(), 1),
                got: labels.shape(),
            });
        }
        Ok(MatrixDataset { features, labels })
    }

    pub fn into_parts(self) -> (Matrix<T>, Matrix<T>) {
        (self.features, self.labels)
    }
}

impl<T: Float> DataSource<T> for MatrixDataset<T> {
    fn features(&self) -> &Matrix<T> {
        &self.features
    }

    fn labels(&self) -> &Matrix<T> {
        &self.labels
    }

    fn is_good(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_dataset() {
        let x: Matrix<f64> =
            Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        let y: Matrix<f64> = Matrix::column(&[1.0, 2.0, 3.0]);
        let ds = MatrixDataset::new(x, y).unwrap();
        assert!(ds.is_good());
        assert_eq!(ds.n_samples(), 3);
        assert_eq!(ds.n_features(), 2);
    }

    #[test]
    fn test_row_count_mismatch() {
        let x: Matrix<f64> = Matrix::zeros(3, 2);
        let y: Matrix<f64> = Matrix::zeros(4, 1);
        assert_eq!(
            MatrixDataset::new(x, y).unwrap_err(),
            LinfitError::ShapeMismatch { expected: (3, 1), got: (4, 1) }
        );
    }

    #[test]
    fn test_labels_must_be_a_column() {
        let x: Matrix<f64> = Matrix::zeros(3, 2);
        let y: Matrix<f64> = Matrix::zeros(3, 2);
        assert!(MatrixDataset::new(x, y).is_err());
    }
}
