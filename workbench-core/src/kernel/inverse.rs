//! Matrix inversion by Gauss-Jordan elimination on `[A | I]`

use crate::constants::SINGULAR_EPSILON;
use crate::error::{Result, WorkbenchError};
use crate::kernel::elimination::{determinant_by_elimination, Elimination};
use crate::trace::{fmt_num, format_augmented, format_matrix};
use crate::traits::{Silent, StepSink};
use crate::types::Matrix;
use crate::validation::require_square;

/// Invert `a`, tracing the determinant check and every row operation
///
/// Fails with `NotSquare` before recording anything, and with `Singular`
/// once the determinant has been computed and shown.
pub fn inverse_traced<S: StepSink>(a: &Matrix, sink: &mut S) -> Result<Matrix> {
    let n = require_square(a)?;
    let determinant = determinant_by_elimination(a)?;

    if sink.is_recording() {
        sink.record_with(|| "Inverse by Gauss-Jordan elimination on [A | I]".to_string());
        sink.record_with(|| format!("det(A) = {}", fmt_num(determinant)));
    }
    if determinant.abs() < SINGULAR_EPSILON {
        sink.record_with(|| "det(A) ≈ 0, so A is not invertible".to_string());
        return Err(WorkbenchError::Singular { determinant });
    }

    let mut rows: Vec<Vec<f64>> = a
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut augmented = row.clone();
            augmented.extend((0..n).map(|j| if i == j { 1.0 } else { 0.0 }));
            augmented
        })
        .collect();

    if sink.is_recording() {
        sink.blank();
        sink.record_with(|| "[A | I] =".to_string());
        for line in format_augmented(&rows, n) {
            sink.record(line);
        }
        sink.blank();
    }

    let summary = Elimination::reduced()
        .with_pivot_columns(n)
        .with_augmented_at(n)
        .run(&mut rows, sink);
    if summary.rank() < n {
        sink.record_with(|| "A zero pivot appeared, so A is not invertible".to_string());
        return Err(WorkbenchError::Singular { determinant });
    }

    let inverse = Matrix::from_rows_unchecked(rows.into_iter().map(|r| r[n..].to_vec()).collect());
    if sink.is_recording() {
        sink.record_with(|| "A⁻¹ =".to_string());
        for line in format_matrix(&inverse) {
            sink.record(line);
        }
    }
    Ok(inverse)
}

pub fn inverse(a: &Matrix) -> Result<Matrix> {
    inverse_traced(a, &mut Silent)
}
