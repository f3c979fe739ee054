//! Shape preconditions for matrix and vector operations

use crate::error::{Result, WorkbenchError};
use crate::traits::Shaped;
use crate::types::Vector;

/// Both operands must have identical dimensions (add, subtract)
pub fn require_same_shape<A: Shaped, B: Shaped>(
    operation: &'static str,
    left: &A,
    right: &B,
) -> Result<()> {
    if left.dimensions() != right.dimensions() {
        return Err(WorkbenchError::DimensionMismatch {
            operation,
            left: left.dimensions(),
            right: right.dimensions(),
        });
    }
    Ok(())
}

/// `left.cols` must equal `right.rows` (multiply)
pub fn require_conformable<A: Shaped, B: Shaped>(left: &A, right: &B) -> Result<()> {
    if left.ncols() != right.nrows() {
        return Err(WorkbenchError::DimensionMismatch {
            operation: "multiplication",
            left: left.dimensions(),
            right: right.dimensions(),
        });
    }
    Ok(())
}

/// The operand must be square, returning its order
pub fn require_square<A: Shaped>(operand: &A) -> Result<usize> {
    let (rows, cols) = operand.dimensions();
    if rows != cols {
        return Err(WorkbenchError::NotSquare { rows, cols });
    }
    Ok(rows)
}

/// A non-empty set of vectors sharing one dimension, returning that dimension
pub fn require_vector_set(vectors: &[Vector]) -> Result<usize> {
    let first = vectors.first().ok_or(WorkbenchError::EmptyInput)?;
    let dimension = first.dimension();
    if let Some(bad) = vectors.iter().find(|v| v.dimension() != dimension) {
        return Err(WorkbenchError::DimensionMismatch {
            operation: "vector set",
            left: (dimension, 1),
            right: (bad.dimension(), 1),
        });
    }
    Ok(dimension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Matrix;

    fn m(rows: usize, cols: usize) -> Matrix {
        Matrix::zeros(rows, cols).unwrap()
    }

    #[test]
    fn test_same_shape() {
        assert!(require_same_shape("addition", &m(2, 3), &m(2, 3)).is_ok());
        assert_eq!(
            require_same_shape("addition", &m(2, 3), &m(3, 2)),
            Err(WorkbenchError::DimensionMismatch {
                operation: "addition",
                left: (2, 3),
                right: (3, 2)
            })
        );
    }

    #[test]
    fn test_conformable_and_square() {
        assert!(require_conformable(&m(2, 3), &m(3, 4)).is_ok());
        assert!(require_conformable(&m(2, 3), &m(2, 3)).is_err());
        assert_eq!(require_square(&m(3, 3)), Ok(3));
        assert_eq!(
            require_square(&m(2, 3)),
            Err(WorkbenchError::NotSquare { rows: 2, cols: 3 })
        );
    }

    #[test]
    fn test_vector_set() {
        let a = Vector::new(vec![1.0, 2.0]).unwrap();
        let b = Vector::new(vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(require_vector_set(&[]), Err(WorkbenchError::EmptyInput));
        assert_eq!(require_vector_set(&[a.clone()]), Ok(2));
        assert!(require_vector_set(&[a, b]).is_err());
    }
}
