//! Dense rectangular matrix of `f64`

use crate::error::{Result, WorkbenchError};
use crate::traits::Shaped;

/// Dense row-major matrix
///
/// Rows are stored as-is and the shape is always derived from them, so the
/// dimensions can never drift from the data. Construction rejects empty,
/// jagged and non-finite input; every operation in this crate returns a new
/// rectangular matrix.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")
)]
pub struct Matrix {
    rows: Vec<Vec<f64>>,
}

impl Matrix {
    /// Build a matrix from rows, validating shape and values
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let expected = match rows.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(WorkbenchError::EmptyInput),
        };

        for (i, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(WorkbenchError::JaggedMatrix {
                    row: i,
                    expected,
                    found: row.len(),
                });
            }
            if let Some(j) = row.iter().position(|v| !v.is_finite()) {
                return Err(WorkbenchError::NonFiniteEntry { row: i, col: j });
            }
        }

        Ok(Self { rows })
    }

    /// Wrap rows already known to be rectangular and non-empty
    pub(crate) fn from_rows_unchecked(rows: Vec<Vec<f64>>) -> Self {
        debug_assert!(!rows.is_empty() && !rows[0].is_empty());
        debug_assert!(rows.iter().all(|r| r.len() == rows[0].len()));
        Self { rows }
    }

    /// Build a matrix whose columns are the given equal-length slices
    pub fn from_columns(columns: &[&[f64]]) -> Result<Self> {
        let height = match columns.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(WorkbenchError::EmptyInput),
        };
        if let Some(bad) = columns.iter().find(|c| c.len() != height) {
            return Err(WorkbenchError::DimensionMismatch {
                operation: "column stacking",
                left: (height, 1),
                right: (bad.len(), 1),
            });
        }
        let rows = (0..height)
            .map(|i| columns.iter().map(|c| c[i]).collect())
            .collect();
        Self::new(rows)
    }

    /// All-zero matrix
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(WorkbenchError::EmptyInput);
        }
        Ok(Self::from_rows_unchecked(vec![vec![0.0; cols]; rows]))
    }

    /// n×n identity
    pub fn identity(n: usize) -> Result<Self> {
        let mut m = Self::zeros(n, n)?;
        for i in 0..n {
            m.rows[i][i] = 1.0;
        }
        Ok(m)
    }

    /// Element at (row, col), or `None` when out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Borrow one row
    pub fn row(&self, index: usize) -> &[f64] {
        &self.rows[index]
    }

    /// Borrow all rows
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Copy one column out
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r[index]).collect()
    }

    /// Consume into plain rows
    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }

    /// Submatrix with one row and one column removed
    ///
    /// Returns `None` for 1×1 input, which has no minor.
    pub fn minor(&self, skip_row: usize, skip_col: usize) -> Option<Self> {
        let (rows, cols) = self.dimensions();
        if rows < 2 || cols < 2 {
            return None;
        }
        let minor = self
            .rows
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != skip_row)
            .map(|(_, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(j, _)| *j != skip_col)
                    .map(|(_, v)| *v)
                    .collect()
            })
            .collect();
        Some(Self::from_rows_unchecked(minor))
    }

    /// Copy with column `col` replaced by `values`
    pub fn with_column(&self, col: usize, values: &[f64]) -> Result<Self> {
        if values.len() != self.nrows() || col >= self.ncols() {
            return Err(WorkbenchError::DimensionMismatch {
                operation: "column replacement",
                left: self.dimensions(),
                right: (values.len(), 1),
            });
        }
        let mut rows = self.rows.clone();
        for (row, v) in rows.iter_mut().zip(values) {
            row[col] = *v;
        }
        Ok(Self::from_rows_unchecked(rows))
    }

    /// Split an augmented matrix `[A | b]` into `A` and `b`
    pub fn split_last_column(&self) -> Result<(Self, Vec<f64>)> {
        let (rows, cols) = self.dimensions();
        if cols < 2 {
            return Err(WorkbenchError::DimensionMismatch {
                operation: "augmented matrix",
                left: (rows, cols),
                right: (rows, 2),
            });
        }
        let coefficients = self.rows.iter().map(|r| r[..cols - 1].to_vec()).collect();
        let constants = self.column(cols - 1);
        Ok((Self::from_rows_unchecked(coefficients), constants))
    }

    /// Elementwise comparison within an absolute tolerance
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.dimensions() == other.dimensions()
            && self
                .rows
                .iter()
                .flatten()
                .zip(other.rows.iter().flatten())
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

impl Shaped for Matrix {
    fn dimensions(&self) -> (usize, usize) {
        (self.rows.len(), self.rows[0].len())
    }
}

impl core::ops::Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.rows[row][col]
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = WorkbenchError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(rows)
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(matrix: Matrix) -> Self {
        matrix.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_shape() {
        assert_eq!(Matrix::new(vec![]), Err(WorkbenchError::EmptyInput));
        assert_eq!(Matrix::new(vec![vec![]]), Err(WorkbenchError::EmptyInput));
        assert_eq!(
            Matrix::new(vec![vec![1.0, 2.0], vec![3.0]]),
            Err(WorkbenchError::JaggedMatrix {
                row: 1,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            Matrix::new(vec![vec![1.0, f64::NAN]]),
            Err(WorkbenchError::NonFiniteEntry { row: 0, col: 1 })
        );
    }

    #[test]
    fn test_dimensions_are_derived() {
        let m = Matrix::new(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.dimensions(), (2, 3));
        assert!(!m.is_square());
        assert_eq!(m[(1, 2)], 6.0);
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.column(1), vec![2.0, 5.0]);
    }

    #[test]
    fn test_minor() {
        let m = Matrix::new(vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        ])
        .unwrap();
        let minor = m.minor(0, 1).unwrap();
        assert_eq!(minor.rows(), &[vec![4.0, 6.0], vec![7.0, 9.0]]);

        let single = Matrix::new(vec![vec![5.0]]).unwrap();
        assert!(single.minor(0, 0).is_none());
    }

    #[test]
    fn test_from_columns() {
        let m = Matrix::from_columns(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]).unwrap();
        assert_eq!(m.rows(), &[vec![1.0, 3.0, 5.0], vec![2.0, 4.0, 6.0]]);
        assert!(Matrix::from_columns(&[&[1.0, 2.0], &[3.0]]).is_err());
    }

    #[test]
    fn test_split_last_column() {
        let aug = Matrix::new(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let (a, b) = aug.split_last_column().unwrap();
        assert_eq!(a.dimensions(), (2, 2));
        assert_eq!(b, vec![3.0, 6.0]);

        let narrow = Matrix::new(vec![vec![1.0], vec![2.0]]).unwrap();
        assert!(narrow.split_last_column().is_err());
    }

    #[test]
    fn test_identity_and_with_column() {
        let id = Matrix::identity(2).unwrap();
        let replaced = id.with_column(1, &[7.0, 8.0]).unwrap();
        assert_eq!(replaced.rows(), &[vec![1.0, 7.0], vec![0.0, 8.0]]);
        assert!(id.with_column(2, &[1.0, 1.0]).is_err());
    }
}
