use serde::{Deserialize, Serialize};

/// Dense row-major matrix with one row per subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

/// Encoded covariates, one column per encoded feature.
pub type CovariateMatrix = Matrix<f64>;

/// Binarized covariates; every entry is `0` or `1`.
pub type BinaryMatrix = Matrix<u8>;

impl<T: Copy> Matrix<T> {
    /// Assembles a matrix from column vectors of length `rows`.
    ///
    /// # Panics
    ///
    /// Panics if a column length differs from `rows`.
    pub fn from_columns(rows: usize, columns: &[Vec<T>]) -> Self {
        let cols = columns.len();
        let mut data = Vec::with_capacity(rows * cols);
        for column in columns {
            assert_eq!(column.len(), rows, "column length must equal row count");
        }
        for row in 0..rows {
            data.extend(columns.iter().map(|column| column[row]));
        }
        Self { rows, cols, data }
    }

    /// Number of rows (subjects).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (encoded features).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the entry at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    /// Returns one row as a slice.
    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Copies one column out of the matrix.
    pub fn column(&self, col: usize) -> Vec<T> {
        (0..self.rows).map(|row| self.get(row, col)).collect()
    }
}
