//! Row reduction with partial pivoting
//!
//! One elimination routine backs rank, row-echelon form, the linear system
//! solver, inversion and the elimination determinant. [`Elimination`] is
//! configured with `with_*` methods and run over a scratch copy of the rows.

use crate::constants::PIVOT_EPSILON;
use crate::error::Result;
use crate::trace::{fmt_fixed, format_augmented, format_row};
use crate::traits::{Shaped, Silent, StepSink};
use crate::types::Matrix;

/// How far elimination goes below and above each pivot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Zero entries below each pivot only
    Echelon,
    /// Zero entries above and below each pivot (Gauss-Jordan)
    Reduced,
}

/// Configuration for one elimination pass
#[derive(Debug, Clone, Copy)]
pub struct Elimination {
    mode: Reduction,
    pivot_columns: Option<usize>,
    augmented_at: Option<usize>,
}

/// What happened during an elimination pass
#[derive(Debug, Clone, PartialEq)]
pub struct EliminationSummary {
    /// Column of the pivot in row i, for each pivot row i
    pub pivot_columns: Vec<usize>,
    /// Pivot values before normalisation, in pivot order
    pub pivot_values: Vec<f64>,
    /// Number of row interchanges performed
    pub swaps: usize,
}

impl EliminationSummary {
    /// Number of pivots found
    pub fn rank(&self) -> usize {
        self.pivot_columns.len()
    }
}

impl Elimination {
    /// Forward elimination to row-echelon form
    pub fn echelon() -> Self {
        Self {
            mode: Reduction::Echelon,
            pivot_columns: None,
            augmented_at: None,
        }
    }

    /// Full Gauss-Jordan reduction
    pub fn reduced() -> Self {
        Self {
            mode: Reduction::Reduced,
            ..Self::echelon()
        }
    }

    /// Only search for pivots in the first `columns` columns
    pub fn with_pivot_columns(mut self, columns: usize) -> Self {
        self.pivot_columns = Some(columns);
        self
    }

    /// Render traced matrices with a bar before column `split`
    pub fn with_augmented_at(mut self, split: usize) -> Self {
        self.augmented_at = Some(split);
        self
    }

    /// Reduce `rows` in place, recording every row operation into `sink`
    ///
    /// Rows must be non-empty and rectangular. Each pivot is the entry of
    /// largest magnitude in its column at or below the current row, and is
    /// accepted only when its magnitude is at least [`PIVOT_EPSILON`].
    pub fn run<S: StepSink>(&self, rows: &mut [Vec<f64>], sink: &mut S) -> EliminationSummary {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let search = self.pivot_columns.unwrap_or(width).min(width);

        let mut summary = EliminationSummary {
            pivot_columns: Vec::new(),
            pivot_values: Vec::new(),
            swaps: 0,
        };

        let mut current = 0;
        for col in 0..search {
            if current >= height {
                break;
            }

            let pivot = (current..height)
                .max_by(|&a, &b| rows[a][col].abs().total_cmp(&rows[b][col].abs()))
                .unwrap_or(current);
            let value = rows[pivot][col];
            if value.abs() < PIVOT_EPSILON {
                if sink.is_recording() {
                    sink.record_with(|| format!("Column {}: no pivot, skipped", col + 1));
                }
                continue;
            }

            if sink.is_recording() {
                sink.record_with(|| format!(
                    "Pivot {} at row {}, column {}: {}",
                    summary.pivot_columns.len() + 1,
                    pivot + 1,
                    col + 1,
                    fmt_fixed(value, 4)
                ));
            }

            if pivot != current {
                rows.swap(pivot, current);
                summary.swaps += 1;
                if sink.is_recording() {
                    sink.record_with(|| format!("R{} ↔ R{}", current + 1, pivot + 1));
                }
            }

            if value != 1.0 {
                for entry in rows[current][col..].iter_mut() {
                    *entry /= value;
                }
                if sink.is_recording() {
                    sink.record_with(|| format!(
                        "R{} ← R{} / {}",
                        current + 1,
                        current + 1,
                        fmt_fixed(value, 4)
                    ));
                }
            }
            rows[current][col] = 1.0;

            let targets: Vec<usize> = match self.mode {
                Reduction::Echelon => (current + 1..height).collect(),
                Reduction::Reduced => (0..height).filter(|&r| r != current).collect(),
            };
            for target in targets {
                let factor = rows[target][col];
                if factor == 0.0 {
                    continue;
                }
                let (pivot_row, target_row) = pair_mut(rows, current, target);
                for (t, p) in target_row[col..].iter_mut().zip(&pivot_row[col..]) {
                    *t -= factor * p;
                }
                target_row[col] = 0.0;
                if sink.is_recording() {
                    sink.record_with(|| format!(
                        "R{} ← R{} − ({})·R{}",
                        target + 1,
                        target + 1,
                        fmt_fixed(factor, 4),
                        current + 1
                    ));
                }
            }

            if sink.is_recording() {
                self.record_rows(rows, sink);
                sink.blank();
            }

            summary.pivot_columns.push(col);
            summary.pivot_values.push(value);
            current += 1;
        }

        summary
    }

    fn record_rows<S: StepSink>(&self, rows: &[Vec<f64>], sink: &mut S) {
        match self.augmented_at {
            Some(split) => format_augmented(rows, split)
                .into_iter()
                .for_each(|line| sink.record(line)),
            None => rows.iter().for_each(|row| sink.record(format_row(row))),
        }
    }
}

/// Borrow row `a` shared and row `b` mutably, with `a != b`
fn pair_mut(rows: &mut [Vec<f64>], a: usize, b: usize) -> (&[f64], &mut [f64]) {
    debug_assert_ne!(a, b);
    if a < b {
        let (head, tail) = rows.split_at_mut(b);
        (head[a].as_slice(), tail[0].as_mut_slice())
    } else {
        let (head, tail) = rows.split_at_mut(a);
        (tail[0].as_slice(), head[b].as_mut_slice())
    }
}

/// Row-echelon form of a matrix with the columns holding pivots
#[derive(Debug, Clone, PartialEq)]
pub struct RowEchelon {
    pub matrix: Matrix,
    pub pivot_columns: Vec<usize>,
}

impl RowEchelon {
    /// Number of pivots
    pub fn rank(&self) -> usize {
        self.pivot_columns.len()
    }
}

/// Reduce `matrix` to row-echelon form, recording each row operation
pub fn row_echelon_traced<S: StepSink>(matrix: &Matrix, sink: &mut S) -> RowEchelon {
    let mut rows = matrix.rows().to_vec();
    let summary = Elimination::echelon().run(&mut rows, sink);
    RowEchelon {
        matrix: Matrix::from_rows_unchecked(rows),
        pivot_columns: summary.pivot_columns,
    }
}

/// Row-echelon form without a trace
pub fn row_echelon(matrix: &Matrix) -> RowEchelon {
    row_echelon_traced(matrix, &mut Silent)
}

/// Number of linearly independent rows
pub fn rank(matrix: &Matrix) -> usize {
    row_echelon(matrix).rank()
}

/// Determinant from the pivots of forward elimination
///
/// Returns exactly `0.0` when a column has no usable pivot.
pub fn determinant_by_elimination(matrix: &Matrix) -> Result<f64> {
    let n = crate::validation::require_square(matrix)?;
    let mut rows = matrix.rows().to_vec();
    let summary = Elimination::echelon().run(&mut rows, &mut Silent);
    if summary.rank() < n {
        return Ok(0.0);
    }
    let sign = if summary.swaps % 2 == 0 { 1.0 } else { -1.0 };
    Ok(sign * summary.pivot_values.iter().product::<f64>())
}
