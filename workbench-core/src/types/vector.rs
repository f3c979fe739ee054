//! Real vectors

use crate::error::{Result, WorkbenchError};
use crate::traits::Shaped;
use crate::types::Matrix;

/// Vector of `f64` with a fixed, non-zero dimension
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<f64>", into = "Vec<f64>")
)]
pub struct Vector {
    components: Vec<f64>,
}

impl Vector {
    /// Build a vector, rejecting empty and non-finite input
    pub fn new(components: Vec<f64>) -> Result<Self> {
        if components.is_empty() {
            return Err(WorkbenchError::EmptyInput);
        }
        if let Some(i) = components.iter().position(|v| !v.is_finite()) {
            return Err(WorkbenchError::NonFiniteEntry { row: 0, col: i });
        }
        Ok(Self { components })
    }

    /// Number of components
    pub fn dimension(&self) -> usize {
        self.components.len()
    }

    /// Borrow the components
    pub fn components(&self) -> &[f64] {
        &self.components
    }

    /// Consume into plain components
    pub fn into_components(self) -> Vec<f64> {
        self.components
    }

    /// Whether every component is within `tolerance` of zero
    pub fn is_zero(&self, tolerance: f64) -> bool {
        self.components.iter().all(|v| v.abs() < tolerance)
    }

    /// Interpret a 1×n or n×1 matrix as a vector
    pub fn from_matrix(matrix: &Matrix) -> Result<Self> {
        match matrix.dimensions() {
            (1, _) => Self::new(matrix.row(0).to_vec()),
            (_, 1) => Self::new(matrix.column(0)),
            (rows, cols) => Err(WorkbenchError::DimensionMismatch {
                operation: "vector coercion",
                left: (rows, cols),
                right: (1, cols),
            }),
        }
    }

    /// View as a 1×n row matrix
    pub fn to_row_matrix(&self) -> Matrix {
        Matrix::from_rows_unchecked(vec![self.components.clone()])
    }
}

impl Shaped for Vector {
    /// Vectors behave as column vectors
    fn dimensions(&self) -> (usize, usize) {
        (self.components.len(), 1)
    }
}

impl TryFrom<Vec<f64>> for Vector {
    type Error = WorkbenchError;

    fn try_from(components: Vec<f64>) -> Result<Self> {
        Self::new(components)
    }
}

impl From<Vector> for Vec<f64> {
    fn from(vector: Vector) -> Self {
        vector.components
    }
}

impl core::fmt::Display for Vector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", crate::trace::fmt_num(*v))?;
        }
        write!(f, ")")
    }
}
