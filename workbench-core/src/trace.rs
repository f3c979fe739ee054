//! Traced results and the text formatting shared by every derivation
//!
//! Operations that explain themselves return a [`TracedResult`]: on success
//! the value together with its steps, on failure the error together with
//! whatever steps were recorded before it was detected. Validation and parse
//! failures happen before any computation, so their step list is empty.

use crate::constants::MATRIX_DECIMALS;
use crate::error::{ErrorCategory, Result, WorkbenchError};
use crate::types::Matrix;

/// A value and the derivation that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Traced<T> {
    pub value: T,
    pub steps: Vec<String>,
}

impl<T> Traced<T> {
    /// Transform the value, keeping the steps
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Traced<U> {
        Traced {
            value: f(self.value),
            steps: self.steps,
        }
    }
}

/// An error and the steps recorded before it occurred
#[derive(Debug, Clone, PartialEq)]
pub struct TracedError {
    pub error: WorkbenchError,
    pub steps: Vec<String>,
}

impl core::fmt::Display for TracedError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for TracedError {}

impl From<WorkbenchError> for TracedError {
    fn from(error: WorkbenchError) -> Self {
        Self {
            error,
            steps: Vec::new(),
        }
    }
}

/// Result of an explained computation
pub type TracedResult<T> = core::result::Result<Traced<T>, TracedError>;

/// Run `body` against a fresh step list and package the outcome
pub fn explain<T, F>(body: F) -> TracedResult<T>
where
    F: FnOnce(&mut Vec<String>) -> Result<T>,
{
    let mut steps = Vec::new();
    match body(&mut steps) {
        Ok(value) => Ok(Traced { value, steps }),
        Err(error) => {
            if matches!(
                error.category(),
                ErrorCategory::Validation | ErrorCategory::Parse
            ) {
                steps.clear();
            }
            Err(TracedError { error, steps })
        }
    }
}

/// Shortest round-trip rendering of a number, with `-0` shown as `0`
pub fn fmt_num(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{value}")
    }
}

/// Fixed-point rendering with `decimals` places, never showing `-0.000`
pub fn fmt_fixed(value: f64, decimals: usize) -> String {
    let text = format!("{value:.decimals$}");
    match text.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => text,
    }
}

/// One line per row: `[ ` + entries right-aligned to width 10 + ` ]`
pub fn format_matrix(matrix: &Matrix) -> Vec<String> {
    matrix.rows().iter().map(|row| format_row(row)).collect()
}

/// Render a single row in the matrix layout
pub fn format_row(row: &[f64]) -> String {
    let cells: Vec<String> = row
        .iter()
        .map(|v| format!("{:>10}", fmt_fixed(*v, MATRIX_DECIMALS)))
        .collect();
    format!("[ {} ]", cells.join(" "))
}

/// Render rows of an augmented matrix with a bar before column `split`
pub fn format_augmented(rows: &[Vec<f64>], split: usize) -> Vec<String> {
    rows.iter()
        .map(|row| {
            let split = split.min(row.len());
            let left: Vec<String> = row[..split]
                .iter()
                .map(|v| format!("{:>10}", fmt_fixed(*v, MATRIX_DECIMALS)))
                .collect();
            let right: Vec<String> = row[split..]
                .iter()
                .map(|v| format!("{:>10}", fmt_fixed(*v, MATRIX_DECIMALS)))
                .collect();
            format!("[ {} | {} ]", left.join(" "), right.join(" "))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_matrix_layout() {
        let m = Matrix::new(vec![vec![1.0, -2.5], vec![0.0, 10.0]]).unwrap();
        assert_eq!(
            format_matrix(&m),
            vec![
                "[     1.0000    -2.5000 ]".to_string(),
                "[     0.0000    10.0000 ]".to_string(),
            ]
        );
    }

    #[test]
    fn test_negative_zero_is_hidden() {
        assert_eq!(fmt_fixed(-0.0, 4), "0.0000");
        assert_eq!(fmt_fixed(-0.00001, 4), "0.0000");
        assert_eq!(fmt_fixed(-0.5, 2), "-0.50");
        assert_eq!(fmt_num(-0.0), "0");
        assert_eq!(fmt_num(2.5), "2.5");
    }

    #[test]
    fn test_explain_drops_steps_on_validation() {
        let out: TracedResult<()> = explain(|steps| {
            steps.push("started".into());
            Err(WorkbenchError::EmptyInput)
        });
        assert_eq!(out.unwrap_err().steps, Vec::<String>::new());

        let out: TracedResult<()> = explain(|steps| {
            steps.push("det(A) = 0".into());
            Err(WorkbenchError::Singular { determinant: 0.0 })
        });
        assert_eq!(out.unwrap_err().steps, vec!["det(A) = 0"]);
    }

    #[test]
    fn test_format_augmented() {
        let rows = vec![vec![1.0, 0.0, 3.0]];
        assert_eq!(
            format_augmented(&rows, 2),
            vec!["[     1.0000     0.0000 |     3.0000 ]".to_string()]
        );
    }
}
