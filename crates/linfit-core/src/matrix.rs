use crate::dtype::Float;
use crate::error::{LinfitError, LinfitResult};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense 2-D matrix, the data structure every linfit model trains on.
///
/// Stores data in a flat contiguous `Vec<T>` with row-major (C-order) layout,
/// so row `i` is `data[i * cols..(i + 1) * cols]`. Column vectors (labels,
/// weights, predictions) are `n x 1` matrices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct Matrix<T: Float> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl<T: Float> Matrix<T> {
    /// Create a matrix from row-major data.
    pub fn new(data: Vec<T>, rows: usize, cols: usize) -> LinfitResult<Self> {
        if data.len() != rows * cols {
            return Err(LinfitError::ShapeMismatch {
                expected: (rows, cols),
                got: (data.len(), 1),
            });
        }
        Ok(Matrix { data, rows, cols })
    }

    /// Create a matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::full(rows, cols, T::ZERO)
    }

    /// Create a matrix filled with ones.
    pub fn ones(rows: usize, cols: usize) -> Self {
        Self::full(rows, cols, T::ONE)
    }

    /// Create a matrix filled with a constant value.
    pub fn full(rows: usize, cols: usize, value: T) -> Self {
        Matrix {
            data: vec![value; rows * cols],
            rows,
            cols,
        }
    }

    /// Create an `n x 1` column vector.
    pub fn column(values: &[T]) -> Self {
        Matrix {
            data: values.to_vec(),
            rows: values.len(),
            cols: 1,
        }
    }

    /// Create a matrix from a slice of rows. All rows must have equal length.
    pub fn from_rows(rows: &[Vec<T>]) -> LinfitResult<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(LinfitError::DimensionMismatch(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    n_cols
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Matrix {
            data,
            rows: n_rows,
            cols: n_cols,
        })
    }
}

// ─── Accessors ──────────────────────────────────────────────────────────────

impl<T: Float> Matrix<T> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when the stored buffer matches the declared shape.
    /// Deserialized matrices should be checked before use.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.rows * self.cols
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> LinfitResult<T> {
        self.check_index(row, col)?;
        Ok(self.data[row * self.cols + col])
    }

    /// Borrow row `i` as a slice.
    pub fn row(&self, i: usize) -> LinfitResult<&[T]> {
        if i >= self.rows {
            return Err(LinfitError::IndexOutOfBounds {
                row: i,
                col: 0,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(&self.data[i * self.cols..(i + 1) * self.cols])
    }

    /// Copy column `j` out of the matrix.
    pub fn column_values(&self, j: usize) -> LinfitResult<Vec<T>> {
        self.check_column(j)?;
        Ok(self.data.iter().skip(j).step_by(self.cols).copied().collect())
    }

    /// Overwrite every element of column `j` in place with `f(x)`.
    pub fn map_column_mut<F: Fn(T) -> T>(&mut self, j: usize, f: F) -> LinfitResult<()> {
        self.check_column(j)?;
        let cols = self.cols;
        for v in self.data.iter_mut().skip(j).step_by(cols) {
            *v = f(*v);
        }
        Ok(())
    }

    /// Copy columns `[start, end)` into a new matrix.
    pub fn slice_cols(&self, start: usize, end: usize) -> LinfitResult<Matrix<T>> {
        if start > end || end > self.cols {
            return Err(LinfitError::DimensionMismatch(format!(
                "column range {}..{} invalid for {} columns",
                start, end, self.cols
            )));
        }
        let width = end - start;
        let mut data = Vec::with_capacity(self.rows * width);
        for i in 0..self.rows {
            let base = i * self.cols;
            data.extend_from_slice(&self.data[base + start..base + end]);
        }
        Ok(Matrix {
            data,
            rows: self.rows,
            cols: width,
        })
    }

    fn check_index(&self, row: usize, col: usize) -> LinfitResult<()> {
        if row >= self.rows || col >= self.cols {
            return Err(LinfitError::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    fn check_column(&self, j: usize) -> LinfitResult<()> {
        if j >= self.cols {
            return Err(LinfitError::ColumnOutOfRange {
                column: j,
                cols: self.cols,
            });
        }
        Ok(())
    }
}

// ─── Element-wise Operations ────────────────────────────────────────────────

impl<T: Float> Matrix<T> {
    /// Apply a function element-wise, returning a new matrix.
    pub fn apply<F: Fn(T) -> T>(&self, f: F) -> Matrix<T> {
        Matrix {
            data: self.data.iter().map(|&x| f(x)).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }

    pub fn mul_scalar(&self, s: T) -> Matrix<T> {
        self.apply(|x| x * s)
    }

    /// Combine two equally-shaped matrices element-wise.
    pub fn zip_map<F: Fn(T, T) -> T>(&self, other: &Matrix<T>, f: F) -> LinfitResult<Matrix<T>> {
        if self.shape() != other.shape() {
            return Err(LinfitError::ShapeMismatch {
                expected: self.shape(),
                got: other.shape(),
            });
        }
        Ok(Matrix {
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
            rows: self.rows,
            cols: self.cols,
        })
    }

    pub fn add(&self, other: &Matrix<T>) -> LinfitResult<Matrix<T>> {
        self.zip_map(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &Matrix<T>) -> LinfitResult<Matrix<T>> {
        self.zip_map(other, |a, b| a - b)
    }

    /// Element-wise (Hadamard) product.
    pub fn mul(&self, other: &Matrix<T>) -> LinfitResult<Matrix<T>> {
        self.zip_map(other, |a, b| a * b)
    }

    /// `self -= scale * other`, in place.
    pub fn scaled_sub_assign(&mut self, scale: T, other: &Matrix<T>) -> LinfitResult<()> {
        if self.shape() != other.shape() {
            return Err(LinfitError::ShapeMismatch {
                expected: self.shape(),
                got: other.shape(),
            });
        }
        for (a, &b) in self.data.iter_mut().zip(other.data.iter()) {
            *a -= scale * b;
        }
        Ok(())
    }
}

// ─── Reductions ─────────────────────────────────────────────────────────────

impl<T: Float> Matrix<T> {
    pub fn sum_all(&self) -> T {
        self.data.iter().copied().sum()
    }

    /// Mean of all elements. NaN for an empty matrix.
    pub fn mean_all(&self) -> T {
        if self.data.is_empty() {
            return T::NAN;
        }
        self.sum_all() / T::from_usize(self.data.len())
    }

    /// Population standard deviation of all elements.
    pub fn std_all(&self) -> T {
        if self.data.is_empty() {
            return T::NAN;
        }
        let mean = self.mean_all();
        let var = self
            .data
            .iter()
            .map(|&x| (x - mean) * (x - mean))
            .sum::<T>()
            / T::from_usize(self.data.len());
        var.sqrt()
    }
}

// ─── Linear Algebra ─────────────────────────────────────────────────────────

impl<T: Float> Matrix<T> {
    /// Transpose.
    pub fn t(&self) -> Matrix<T> {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.cols {
            for i in 0..self.rows {
                data.push(self.data[i * self.cols + j]);
            }
        }
        Matrix {
            data,
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Matrix product `self · other`. Output rows are computed in parallel.
    pub fn matmul(&self, other: &Matrix<T>) -> LinfitResult<Matrix<T>> {
        if self.cols != other.rows {
            return Err(LinfitError::DimensionMismatch(format!(
                "matmul: inner dimensions must match, got ({}, {}) x ({}, {})",
                self.rows, self.cols, other.rows, other.cols
            )));
        }

        let (k, n) = (self.cols, other.cols);
        let mut data = vec![T::ZERO; self.rows * n];
        if n > 0 {
            data.par_chunks_mut(n).enumerate().for_each(|(i, out_row)| {
                let a_row = &self.data[i * k..(i + 1) * k];
                for (p, &a) in a_row.iter().enumerate() {
                    let b_row = &other.data[p * n..(p + 1) * n];
                    for (o, &b) in out_row.iter_mut().zip(b_row.iter()) {
                        *o += a * b;
                    }
                }
            });
        }

        Ok(Matrix {
            data,
            rows: self.rows,
            cols: n,
        })
    }
}

// ─── Display ────────────────────────────────────────────────────────────────

impl<T: Float> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "matrix([")?;
        for i in 0..self.rows.min(8) {
            write!(f, "  [")?;
            for j in 0..self.cols.min(8) {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:.4}", self.data[i * self.cols + j])?;
            }
            if self.cols > 8 {
                write!(f, ", ...")?;
            }
            writeln!(f, "],")?;
        }
        if self.rows > 8 {
            writeln!(f, "  ...")?;
        }
        write!(f, "], shape=({}, {}))", self.rows, self.cols)
    }
}
