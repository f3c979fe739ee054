//! Linear systems given as an augmented matrix `[A | b]`

use crate::constants::{PIVOT_EPSILON, SINGULAR_EPSILON};
use crate::error::{Result, WorkbenchError};
use crate::kernel::elimination::{determinant_by_elimination, Elimination};
use crate::trace::{fmt_fixed, fmt_num, format_augmented};
use crate::traits::{Shaped, Silent, StepSink};
use crate::types::Matrix;
use crate::validation::require_square;

/// Classification of a linear system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolutionType {
    #[cfg_attr(feature = "serde", serde(rename = "unique"))]
    Unique,
    #[cfg_attr(feature = "serde", serde(rename = "infinite"))]
    Infinite,
    #[cfg_attr(feature = "serde", serde(rename = "none"))]
    Inconsistent,
}

/// Solver used for a system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum SolveMethod {
    #[default]
    GaussJordan,
    Cramer,
}

/// Result of solving `[A | b]`
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSolution {
    pub solution_type: SolutionType,
    /// Present only for a unique solution
    pub solution: Option<Vec<f64>>,
    /// Reduced row-echelon form of `[A | b]`, for Gauss-Jordan
    pub reduced: Option<Matrix>,
    /// Pivot column of each pivot row
    pub pivot_columns: Vec<usize>,
}

/// Solve with the chosen method
pub fn solve_with<S: StepSink>(
    augmented: &Matrix,
    method: SolveMethod,
    sink: &mut S,
) -> Result<SystemSolution> {
    match method {
        SolveMethod::GaussJordan => solve_traced(augmented, sink),
        SolveMethod::Cramer => solve_cramer_traced(augmented, sink),
    }
}

/// Gauss-Jordan elimination and classification
///
/// Any shape with at least two columns is accepted. The last column holds
/// the constants; pivots are searched only among the coefficient columns.
pub fn solve_traced<S: StepSink>(augmented: &Matrix, sink: &mut S) -> Result<SystemSolution> {
    let (rows, cols) = augmented.dimensions();
    augmented.split_last_column()?;
    let vars = cols - 1;

    if sink.is_recording() {
        sink.record_with(|| format!(
            "Gauss-Jordan elimination on [A | b] ({rows} equations, {vars} unknowns)"
        ));
        for line in format_augmented(augmented.rows(), vars) {
            sink.record(line);
        }
        sink.blank();
    }

    let mut work = augmented.rows().to_vec();
    let summary = Elimination::reduced()
        .with_pivot_columns(vars)
        .with_augmented_at(vars)
        .run(&mut work, sink);

    if sink.is_recording() {
        sink.record_with(|| "Reduced row-echelon form:".to_string());
        for line in format_augmented(&work, vars) {
            sink.record(line);
        }
        sink.blank();
    }

    // Elimination residue grows with the entries, so zero is judged relative to them
    let zero = PIVOT_EPSILON * magnitude(augmented.rows());
    let inconsistent = work
        .iter()
        .position(|row| row[..vars].iter().all(|v| v.abs() < zero) && row[vars].abs() > zero);

    let solution_type;
    let mut solution = None;
    if let Some(i) = inconsistent {
        sink.record_with(|| format!(
            "Row {}: 0 = {}, the system is inconsistent",
            i + 1,
            fmt_fixed(work[i][vars], 4)
        ));
        solution_type = SolutionType::Inconsistent;
    } else if summary.rank() < vars {
        if sink.is_recording() {
            record_general_solution(&work, &summary.pivot_columns, vars, sink);
        }
        solution_type = SolutionType::Infinite;
    } else {
        let mut values = vec![0.0; vars];
        for (row, &col) in summary.pivot_columns.iter().enumerate() {
            values[col] = work[row][vars];
        }
        for (i, v) in values.iter().enumerate() {
            sink.record_with(|| format!("x{} = {}", i + 1, fmt_num(*v)));
        }
        solution_type = SolutionType::Unique;
        solution = Some(values);
    }

    Ok(SystemSolution {
        solution_type,
        solution,
        reduced: Some(Matrix::from_rows_unchecked(work)),
        pivot_columns: summary.pivot_columns,
    })
}

/// Largest absolute entry, never below one
fn magnitude(rows: &[Vec<f64>]) -> f64 {
    rows.iter().flatten().fold(1.0, |m: f64, v| m.max(v.abs()))
}

/// Describe pivot variables in terms of the free ones
fn record_general_solution<S: StepSink>(
    reduced: &[Vec<f64>],
    pivots: &[usize],
    vars: usize,
    sink: &mut S,
) {
    let free: Vec<usize> = (0..vars).filter(|c| !pivots.contains(c)).collect();
    let names: Vec<String> = free.iter().map(|c| format!("x{}", c + 1)).collect();
    sink.record_with(|| format!(
        "Free variables: {}, so there are infinitely many solutions",
        names.join(", ")
    ));
    for (row, &col) in pivots.iter().enumerate() {
        let mut expression = fmt_num(reduced[row][vars]);
        for &f in &free {
            let coefficient = reduced[row][f];
            if coefficient.abs() < PIVOT_EPSILON {
                continue;
            }
            let sign = if coefficient > 0.0 { '−' } else { '+' };
            expression.push_str(&format!(" {sign} {}·x{}", fmt_num(coefficient.abs()), f + 1));
        }
        sink.record_with(|| format!("x{} = {expression}", col + 1));
    }
    for name in names {
        sink.record_with(|| format!("{name} is free"));
    }
}

/// Cramer's rule for a square coefficient matrix
///
/// Cannot classify singular systems, so `det(A) ≈ 0` is reported as
/// `Singular` together with the steps that computed it.
pub fn solve_cramer_traced<S: StepSink>(
    augmented: &Matrix,
    sink: &mut S,
) -> Result<SystemSolution> {
    let (a, b) = augmented.split_last_column()?;
    let n = require_square(&a)?;

    let det = determinant_by_elimination(&a)?;
    if sink.is_recording() {
        sink.record_with(|| format!("Cramer's rule for a {n}×{n} system: x_i = det(A_i) / det(A)"));
        sink.record_with(|| format!("det(A) = {}", fmt_num(det)));
    }
    if det.abs() < SINGULAR_EPSILON {
        sink.record_with(|| "det(A) ≈ 0, Cramer's rule does not apply".to_string());
        return Err(WorkbenchError::Singular { determinant: det });
    }

    let mut values = Vec::with_capacity(n);
    for i in 0..n {
        let replaced = a.with_column(i, &b)?;
        let det_i = determinant_by_elimination(&replaced)?;
        let x = det_i / det;
        if sink.is_recording() {
            sink.record_with(|| format!("A_{} = A with column {} replaced by b:", i + 1, i + 1));
            for line in crate::trace::format_matrix(&replaced) {
                sink.record(line);
            }
            sink.record_with(|| format!(
                "x{} = {} / {} = {}",
                i + 1,
                fmt_num(det_i),
                fmt_num(det),
                fmt_num(x)
            ));
        }
        values.push(x);
    }

    Ok(SystemSolution {
        solution_type: SolutionType::Unique,
        solution: Some(values),
        reduced: None,
        pivot_columns: (0..n).collect(),
    })
}

/// Gauss-Jordan solve without a trace
pub fn solve(augmented: &Matrix) -> Result<SystemSolution> {
    solve_traced(augmented, &mut Silent)
}

/// Cramer's rule without a trace
pub fn solve_cramer(augmented: &Matrix) -> Result<SystemSolution> {
    solve_cramer_traced(augmented, &mut Silent)
}
