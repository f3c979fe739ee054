//! Linear independence, bases and spans of vector sets
//!
//! Vectors are laid out as the columns of a matrix, so a set is independent
//! exactly when every column holds a pivot after forward elimination.

use crate::error::{Result, WorkbenchError};
use crate::kernel::elimination::Elimination;
use crate::solver::{solve_traced, SolutionType};
use crate::trace::{fmt_num, format_matrix};
use crate::traits::StepSink;
use crate::types::{Matrix, Vector};
use crate::validation::require_vector_set;

/// Outcome of an independence test
#[derive(Debug, Clone, PartialEq)]
pub struct Independence {
    pub independent: bool,
    pub rank: usize,
    pub count: usize,
    pub dimension: usize,
    /// Row-echelon form of the column matrix
    pub reduced: Matrix,
}

/// Outcome of a basis test
#[derive(Debug, Clone, PartialEq)]
pub struct BasisCheck {
    pub basis: bool,
    /// `None` when the cardinality check failed before any reduction
    pub rank: Option<usize>,
    pub reduced: Option<Matrix>,
}

/// Outcome of a span-membership test
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    pub in_span: bool,
    pub solution_type: SolutionType,
    /// Coefficients `c1..ck`, present when they are unique
    pub coefficients: Option<Vec<f64>>,
}

fn columns_matrix(vectors: &[Vector]) -> Result<Matrix> {
    let columns: Vec<&[f64]> = vectors.iter().map(Vector::components).collect();
    Matrix::from_columns(&columns)
}

fn record_titled<S: StepSink>(sink: &mut S, title: &str, matrix: &Matrix) {
    if sink.is_recording() {
        sink.record(title.to_string());
        for line in format_matrix(matrix) {
            sink.record(line);
        }
    }
}

fn reduce_columns<S: StepSink>(matrix: &Matrix, sink: &mut S) -> (Matrix, usize) {
    let mut rows = matrix.rows().to_vec();
    let summary = Elimination::echelon().run(&mut rows, sink);
    (Matrix::from_rows_unchecked(rows), summary.rank())
}

/// Test whether `vectors` are linearly independent
pub fn independence_traced<S: StepSink>(vectors: &[Vector], sink: &mut S) -> Result<Independence> {
    let dimension = require_vector_set(vectors)?;
    let count = vectors.len();
    let matrix = columns_matrix(vectors)?;

    sink.record_with(|| format!("Linear independence of {count} vectors in R^{dimension}"));
    record_titled(sink, "Matrix [v1 v2 … vk] with the vectors as columns:", &matrix);
    sink.blank();
    if count > dimension {
        sink.record_with(|| format!(
            "{count} vectors in R^{dimension}: more vectors than the dimension, so the set is dependent"
        ));
        sink.blank();
    }

    let (reduced, rank) = reduce_columns(&matrix, sink);
    record_titled(sink, "Row-echelon form:", &reduced);
    sink.record_with(|| format!("Rank = {rank}, number of vectors = {count}"));

    let independent = rank == count;
    sink.record_with(|| {
        if independent {
            "Conclusion: the set is linearly INDEPENDENT".to_string()
        } else {
            "Conclusion: the set is linearly DEPENDENT".to_string()
        }
    });

    Ok(Independence {
        independent,
        rank,
        count,
        dimension,
        reduced,
    })
}

/// Test whether `vectors` form a basis of R^dimension
///
/// `dimension` defaults to the length of the vectors and must match it.
pub fn basis_traced<S: StepSink>(
    vectors: &[Vector],
    dimension: Option<usize>,
    sink: &mut S,
) -> Result<BasisCheck> {
    let length = require_vector_set(vectors)?;
    let dimension = dimension.unwrap_or(length);
    if dimension != length {
        return Err(WorkbenchError::DimensionMismatch {
            operation: "basis",
            left: (length, 1),
            right: (dimension, 1),
        });
    }

    let count = vectors.len();
    sink.record_with(|| format!("Basis test for R^{dimension}"));
    if count != dimension {
        sink.record_with(|| format!(
            "There are {count} vectors but the dimension is {dimension}, so they cannot form a basis"
        ));
        return Ok(BasisCheck {
            basis: false,
            rank: None,
            reduced: None,
        });
    }

    let matrix = columns_matrix(vectors)?;
    record_titled(sink, "Matrix [v1 v2 … vn]:", &matrix);
    sink.blank();
    let (reduced, rank) = reduce_columns(&matrix, sink);
    record_titled(sink, "Row-echelon form:", &reduced);
    sink.record_with(|| format!("Rank = {rank}"));

    let basis = rank == dimension;
    sink.record_with(|| {
        if basis {
            format!("Conclusion: the vectors form a BASIS of R^{dimension}")
        } else {
            format!("Conclusion: the vectors do NOT form a basis of R^{dimension}")
        }
    });

    Ok(BasisCheck {
        basis,
        rank: Some(rank),
        reduced: Some(reduced),
    })
}

/// Test whether `target` is a linear combination of `vectors`
pub fn linear_combination_traced<S: StepSink>(
    vectors: &[Vector],
    target: &Vector,
    sink: &mut S,
) -> Result<Combination> {
    let dimension = require_vector_set(vectors)?;
    if target.dimension() != dimension {
        return Err(WorkbenchError::DimensionMismatch {
            operation: "linear combination",
            left: (dimension, 1),
            right: (target.dimension(), 1),
        });
    }

    let mut columns: Vec<&[f64]> = vectors.iter().map(Vector::components).collect();
    columns.push(target.components());
    let augmented = Matrix::from_columns(&columns)?;

    if sink.is_recording() {
        let terms: Vec<String> = (1..=vectors.len()).map(|i| format!("c{i}·v{i}")).collect();
        sink.record_with(|| format!("Is w = {target} a combination of the vectors?"));
        sink.record_with(|| format!("Solve {} = w", terms.join(" + ")));
        sink.blank();
    }

    let system = solve_traced(&augmented, sink)?;
    sink.blank();

    let in_span = system.solution_type != SolutionType::Inconsistent;
    match (&system.solution, system.solution_type) {
        (Some(c), _) => {
            let terms: Vec<String> = c
                .iter()
                .enumerate()
                .map(|(i, v)| format!("({})·v{}", fmt_num(*v), i + 1))
                .collect();
            sink.record_with(|| format!("w = {}", terms.join(" + ")));
        }
        (None, SolutionType::Infinite) => {
            sink.record_with(|| "w is in the span, with infinitely many choices of coefficients".to_string())
        }
        _ => sink.record_with(|| "w is NOT in the span of the vectors".to_string()),
    }

    Ok(Combination {
        in_span,
        solution_type: system.solution_type,
        coefficients: system.solution,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Silent;
    use approx::assert_relative_eq;

    fn vectors(list: &[&[f64]]) -> Vec<Vector> {
        list.iter().map(|v| Vector::new(v.to_vec()).unwrap()).collect()
    }

    #[test]
    fn test_standard_basis_is_independent() {
        let set = vectors(&[&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0]]);
        let result = independence_traced(&set, &mut Silent).unwrap();
        assert!(result.independent);
        assert_eq!(result.rank, 3);
        assert!(basis_traced(&set, None, &mut Silent).unwrap().basis);
    }

    #[test]
    fn test_multiple_is_dependent() {
        let set = vectors(&[&[1.0, 2.0], &[2.0, 4.0]]);
        let result = independence_traced(&set, &mut Silent).unwrap();
        assert!(!result.independent);
        assert_eq!(result.rank, 1);
        let basis = basis_traced(&set, Some(2), &mut Silent).unwrap();
        assert!(!basis.basis);
        assert_eq!(basis.rank, Some(1));
    }

    #[test]
    fn test_too_many_vectors_still_reduced() {
        let set = vectors(&[&[1.0, 0.0], &[0.0, 1.0], &[1.0, 1.0]]);
        let mut steps = Vec::new();
        let result = independence_traced(&set, &mut steps).unwrap();
        assert!(!result.independent);
        assert!(steps.iter().any(|s| s.contains("more vectors than the dimension")));
        assert!(steps.iter().any(|s| s == "Row-echelon form:"));
    }

    #[test]
    fn test_basis_cardinality_mismatch_skips_reduction() {
        let set = vectors(&[&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]]);
        let mut steps = Vec::new();
        let result = basis_traced(&set, None, &mut steps).unwrap();
        assert!(!result.basis);
        assert!(result.reduced.is_none());
        assert!(!steps.iter().any(|s| s == "Row-echelon form:"));
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            independence_traced(&[], &mut Silent),
            Err(WorkbenchError::EmptyInput)
        );
        let mixed = vectors(&[&[1.0, 0.0], &[1.0, 0.0, 0.0]]);
        assert!(independence_traced(&mixed, &mut Silent).is_err());
        let set = vectors(&[&[1.0, 0.0], &[0.0, 1.0]]);
        assert!(basis_traced(&set, Some(3), &mut Silent).is_err());
    }

    #[test]
    fn test_linear_combination() {
        let set = vectors(&[&[1.0, 0.0, 1.0], &[0.0, 1.0, 1.0]]);
        let target = Vector::new(vec![2.0, 3.0, 5.0]).unwrap();
        let result = linear_combination_traced(&set, &target, &mut Silent).unwrap();
        assert!(result.in_span);
        let c = result.coefficients.unwrap();
        assert_relative_eq!(c[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(c[1], 3.0, epsilon = 1e-9);

        let outside = Vector::new(vec![0.0, 0.0, 1.0]).unwrap();
        let result = linear_combination_traced(&set, &outside, &mut Silent).unwrap();
        assert!(!result.in_span);
        assert_eq!(result.solution_type, SolutionType::Inconsistent);
    }
}
