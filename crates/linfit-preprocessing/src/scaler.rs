use std::collections::BTreeMap;

use linfit_core::{Float, LinfitError, LinfitResult, Matrix};
use serde::{Deserialize, Serialize};

/// Z-score statistics fitted on one column (or one label vector).
///
/// A zero standard deviation is kept as fitted but scaled by one instead,
/// so a constant column maps to zero rather than NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct Normalizer<T: Float> {
    pub mean: T,
    pub std: T,
}

impl<T: Float> Normalizer<T> {
    pub fn new(mean: T, std: T) -> Self {
        Normalizer { mean, std }
    }

    /// Fit mean and population standard deviation over `values`.
    pub fn fit(values: &[T]) -> Self {
        let first = match values.first() {
            Some(&v) => v,
            None => return Normalizer::new(T::ZERO, T::ZERO),
        };
        // identical values: exact zero spread, no summation residue
        if values.iter().all(|&x| x == first) {
            return Normalizer::new(first, T::ZERO);
        }
        let n = T::from_usize(values.len());
        let mean = values.iter().copied().sum::<T>() / n;
        let var = values.iter().map(|&x| (x - mean) * (x - mean)).sum::<T>() / n;
        Normalizer::new(mean, var.sqrt())
    }

    /// Fit over every element of a matrix.
    pub fn fit_matrix(m: &Matrix<T>) -> Self {
        Self::fit(m.data())
    }

    /// True when the fitted standard deviation is zero or not finite.
    /// Tiny but real spreads are still divided out.
    pub fn is_degenerate(&self) -> bool {
        self.std == T::ZERO || !self.std.is_finite()
    }

    fn scale(&self) -> T {
        if self.is_degenerate() {
            T::ONE
        } else {
            self.std
        }
    }

    /// `(x - mean) / std`
    #[inline]
    pub fn transform(&self, x: T) -> T {
        (x - self.mean) / self.scale()
    }

    /// `x * std + mean`
    #[inline]
    pub fn inverse(&self, x: T) -> T {
        x * self.scale() + self.mean
    }

    pub fn transform_matrix(&self, m: &Matrix<T>) -> Matrix<T> {
        m.apply(|x| self.transform(x))
    }

    pub fn inverse_matrix(&self, m: &Matrix<T>) -> Matrix<T> {
        m.apply(|x| self.inverse(x))
    }
}

/// Fitted normalizers keyed by augmented column index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct NormalizerTable<T: Float> {
    entries: BTreeMap<usize, Normalizer<T>>,
}

impl<T: Float> NormalizerTable<T> {
    pub fn new() -> Self {
        NormalizerTable {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, column: usize, normalizer: Normalizer<T>) {
        self.entries.insert(column, normalizer);
    }

    pub fn get(&self, column: usize) -> Option<&Normalizer<T>> {
        self.entries.get(&column)
    }

    /// Like [`get`](Self::get) but an absent column is an error.
    pub fn lookup(&self, column: usize) -> LinfitResult<&Normalizer<T>> {
        self.entries
            .get(&column)
            .ok_or(LinfitError::UnregisteredColumn { column })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending column order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Normalizer<T>)> {
        self.entries.iter().map(|(&c, n)| (c, n))
    }

    pub fn columns(&self) -> Vec<usize> {
        self.entries.keys().copied().collect()
    }
}

impl<T: Float> Default for NormalizerTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Fit a normalizer for every column in `[start_col, cols)` and normalize those
/// columns in place. Earlier columns (bias, reserved categorical features) are
/// left untouched.
pub fn fit_and_normalize<T: Float>(
    matrix: &mut Matrix<T>,
    start_col: usize,
) -> LinfitResult<NormalizerTable<T>> {
    let mut table = NormalizerTable::new();
    for c in start_col..matrix.cols() {
        let norm = Normalizer::fit(&matrix.column_values(c)?);
        if norm.is_degenerate() {
            log::warn!("column {} has zero variance; it will only be centered", c);
        }
        log::debug!("column {}: mean={} std={}", c, norm.mean, norm.std);
        table.insert(c, norm);
    }
    apply_normalization(matrix, &table)?;
    Ok(table)
}

/// Overwrite every column named in `table` with its z-score.
///
/// Used both right after fitting and at inference time, so training and
/// prediction inputs always go through the same transform.
pub fn apply_normalization<T: Float>(
    matrix: &mut Matrix<T>,
    table: &NormalizerTable<T>,
) -> LinfitResult<()> {
    for (c, norm) in table.iter() {
        matrix.map_column_mut(c, |x| norm.transform(x))?;
    }
    Ok(())
}

/// Reverse [`apply_normalization`].
pub fn invert_normalization<T: Float>(
    matrix: &mut Matrix<T>,
    table: &NormalizerTable<T>,
) -> LinfitResult<()> {
    for (c, norm) in table.iter() {
        matrix.map_column_mut(c, |x| norm.inverse(x))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample() -> Matrix<f64> {
        Matrix::from_rows(&[
            vec![1.0, 0.0, 1.0, 10.0],
            vec![1.0, 1.0, 3.0, 20.0],
            vec![1.0, 0.0, 5.0, 30.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_normalizer_fit() {
        let n = Normalizer::fit(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_abs_diff_eq!(n.mean, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(n.std, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(n.transform(9.0), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(n.inverse(2.0), 9.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_std_is_guarded() {
        let n = Normalizer::fit(&[3.0, 3.0, 3.0]);
        assert!(n.is_degenerate());
        assert_eq!(n.transform(3.0), 0.0);
        assert!(n.transform(4.0).is_finite());
        assert_eq!(n.inverse(0.0), 3.0);
    }

    #[test]
    fn test_constant_column_has_exact_zero_std() {
        let n = Normalizer::fit(&[0.1; 7]);
        assert_eq!(n.mean, 0.1);
        assert_eq!(n.std, 0.0);
        assert!(n.is_degenerate());
        assert_eq!(n.transform(0.1), 0.0);
    }

    #[test]
    fn test_tiny_scale_column_is_standardized() {
        let mut m = Matrix::from_rows(&[
            vec![1.0, 1e-17],
            vec![1.0, 2e-17],
            vec![1.0, 3e-17],
        ])
        .unwrap();
        let table = fit_and_normalize(&mut m, 1).unwrap();
        assert!(!table.lookup(1).unwrap().is_degenerate());

        let z = m.column_values(1).unwrap();
        let expected = [-1.5_f64.sqrt(), 0.0, 1.5_f64.sqrt()];
        for (got, want) in z.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_fit_and_normalize_skips_leading_columns() {
        let mut m = sample();
        let table = fit_and_normalize(&mut m, 2).unwrap();

        assert_eq!(table.columns(), vec![2, 3]);
        // bias and the reserved column are untouched
        assert_eq!(m.column_values(0).unwrap(), vec![1.0, 1.0, 1.0]);
        assert_eq!(m.column_values(1).unwrap(), vec![0.0, 1.0, 0.0]);

        for c in 2..4 {
            let col = Matrix::column(&m.column_values(c).unwrap());
            assert_abs_diff_eq!(col.mean_all(), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(col.std_all(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_start_past_last_column_gives_empty_table() {
        let mut m = sample();
        let table = fit_and_normalize(&mut m, 4).unwrap();
        assert!(table.is_empty());
        assert_eq!(m, sample());
    }

    #[test]
    fn test_apply_reuses_fitted_statistics() {
        let mut train = sample();
        let table = fit_and_normalize(&mut train, 1).unwrap();

        // one row identical to the first training row
        let mut fresh: Matrix<f64> = Matrix::from_rows(&[vec![1.0, 0.0, 1.0, 10.0]]).unwrap();
        apply_normalization(&mut fresh, &table).unwrap();
        assert_eq!(fresh.row(0).unwrap(), train.row(0).unwrap());
    }

    #[test]
    fn test_round_trip() {
        let original = sample();
        let mut m = original.clone();
        let table = fit_and_normalize(&mut m, 1).unwrap();
        invert_normalization(&mut m, &table).unwrap();
        apply_normalization(&mut m, &table).unwrap();
        invert_normalization(&mut m, &table).unwrap();
        for (a, b) in m.data().iter().zip(original.data()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_apply_rejects_narrow_matrix() {
        let mut m = sample();
        let table = fit_and_normalize(&mut m, 1).unwrap();
        let mut narrow: Matrix<f64> = Matrix::ones(2, 2);
        assert_eq!(
            apply_normalization(&mut narrow, &table),
            Err(LinfitError::ColumnOutOfRange { column: 2, cols: 2 })
        );
    }

    #[test]
    fn test_lookup_unregistered() {
        let table: NormalizerTable<f64> = NormalizerTable::new();
        assert_eq!(
            table.lookup(3).unwrap_err(),
            LinfitError::UnregisteredColumn { column: 3 }
        );
    }

    #[test]
    fn test_table_json_round_trip() {
        let mut m = sample();
        let table = fit_and_normalize(&mut m, 1).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        let back: NormalizerTable<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
