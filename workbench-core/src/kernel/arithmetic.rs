//! Elementwise arithmetic, products and transposition

use crate::error::Result;
use crate::trace::{fmt_num, format_matrix};
use crate::traits::{Shaped, Silent, StepSink};
use crate::types::Matrix;
use crate::validation::{require_conformable, require_same_shape};

fn record_matrix<S: StepSink>(sink: &mut S, title: &str, matrix: &Matrix) {
    if sink.is_recording() {
        sink.record(title.to_string());
        for line in format_matrix(matrix) {
            sink.record(line);
        }
    }
}

fn elementwise<S: StepSink>(
    a: &Matrix,
    b: &Matrix,
    name: &'static str,
    symbol: char,
    op: fn(f64, f64) -> f64,
    sink: &mut S,
) -> Result<Matrix> {
    require_same_shape(name, a, b)?;

    if sink.is_recording() {
        sink.record_with(|| format!("Matrix {name}: C = A {symbol} B"));
        record_matrix(sink, "A =", a);
        sink.blank();
        record_matrix(sink, "B =", b);
        sink.blank();
    }

    let mut rows = Vec::with_capacity(a.nrows());
    for (i, (ra, rb)) in a.rows().iter().zip(b.rows()).enumerate() {
        let mut row = Vec::with_capacity(ra.len());
        for (j, (x, y)) in ra.iter().zip(rb).enumerate() {
            let c = op(*x, *y);
            if sink.is_recording() {
                sink.record_with(|| format!(
                    "C[{},{}] = {} {symbol} {} = {}",
                    i + 1,
                    j + 1,
                    fmt_num(*x),
                    fmt_num(*y),
                    fmt_num(c)
                ));
            }
            row.push(c);
        }
        rows.push(row);
    }

    let result = Matrix::from_rows_unchecked(rows);
    if sink.is_recording() {
        sink.blank();
        record_matrix(sink, &format!("Result C = A {symbol} B:"), &result);
    }
    Ok(result)
}

/// `A + B`, tracing every entry
pub fn add_traced<S: StepSink>(a: &Matrix, b: &Matrix, sink: &mut S) -> Result<Matrix> {
    elementwise(a, b, "addition", '+', |x, y| x + y, sink)
}

/// `A − B`, tracing every entry
pub fn subtract_traced<S: StepSink>(a: &Matrix, b: &Matrix, sink: &mut S) -> Result<Matrix> {
    elementwise(a, b, "subtraction", '-', |x, y| x - y, sink)
}

/// Matrix product, tracing each dot product term by term
pub fn multiply_traced<S: StepSink>(a: &Matrix, b: &Matrix, sink: &mut S) -> Result<Matrix> {
    require_conformable(a, b)?;
    let (n, inner) = a.dimensions();
    let m = b.ncols();

    if sink.is_recording() {
        sink.record_with(|| "Matrix product: C = A × B".to_string());
        sink.record_with(|| format!(
            "Dimensions: ({n}×{inner})·({}×{m}) → {n}×{m}",
            b.nrows()
        ));
        sink.blank();
    }

    let mut rows = vec![vec![0.0; m]; n];
    for (i, out) in rows.iter_mut().enumerate() {
        for (j, cell) in out.iter_mut().enumerate() {
            let total: f64 = (0..inner).map(|k| a[(i, k)] * b[(k, j)]).sum();
            if sink.is_recording() {
                let terms: Vec<String> = (0..inner)
                    .map(|k| format!("({}×{})", fmt_num(a[(i, k)]), fmt_num(b[(k, j)])))
                    .collect();
                sink.record_with(|| format!(
                    "C[{},{}] = {} = {}",
                    i + 1,
                    j + 1,
                    terms.join(" + "),
                    fmt_num(total)
                ));
            }
            *cell = total;
        }
    }

    let result = Matrix::from_rows_unchecked(rows);
    if sink.is_recording() {
        sink.blank();
        record_matrix(sink, "Result C = A × B:", &result);
    }
    Ok(result)
}

/// `k·A`; always succeeds
pub fn scalar_multiply_traced<S: StepSink>(a: &Matrix, k: f64, sink: &mut S) -> Matrix {
    if sink.is_recording() {
        sink.record_with(|| format!("Scalar multiplication: C = k·A with k = {}", fmt_num(k)));
    }
    let mut rows = Vec::with_capacity(a.nrows());
    for (i, row) in a.rows().iter().enumerate() {
        let mut out = Vec::with_capacity(row.len());
        for (j, v) in row.iter().enumerate() {
            let c = k * v;
            if sink.is_recording() {
                sink.record_with(|| format!(
                    "C[{},{}] = {}×{} = {}",
                    i + 1,
                    j + 1,
                    fmt_num(k),
                    fmt_num(*v),
                    fmt_num(c)
                ));
            }
            out.push(c);
        }
        rows.push(out);
    }
    let result = Matrix::from_rows_unchecked(rows);
    if sink.is_recording() {
        sink.blank();
        record_matrix(sink, "Result C = k·A:", &result);
    }
    result
}

/// `Aᵀ`; always succeeds and is exactly involutive
pub fn transpose_traced<S: StepSink>(a: &Matrix, sink: &mut S) -> Matrix {
    let (rows, cols) = a.dimensions();
    let result = Matrix::from_rows_unchecked((0..cols).map(|j| a.column(j)).collect());
    if sink.is_recording() {
        sink.record_with(|| format!("Transpose: C = Aᵀ, ({rows}×{cols}) → ({cols}×{rows})"));
        sink.record_with(|| "C[i,j] = A[j,i]".to_string());
        sink.blank();
        record_matrix(sink, "Result C = Aᵀ:", &result);
    }
    result
}

pub fn add(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    add_traced(a, b, &mut Silent)
}

pub fn subtract(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    subtract_traced(a, b, &mut Silent)
}

pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    multiply_traced(a, b, &mut Silent)
}

pub fn scalar_multiply(a: &Matrix, k: f64) -> Matrix {
    scalar_multiply_traced(a, k, &mut Silent)
}

pub fn transpose(a: &Matrix) -> Matrix {
    transpose_traced(a, &mut Silent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkbenchError;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn matrix(rows: &[&[f64]]) -> Matrix {
        Matrix::new(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> Matrix {
        Matrix::new(
            (0..rows)
                .map(|_| (0..cols).map(|_| rng.gen_range(-10.0..10.0)).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_add_and_trace() {
        let a = matrix(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let b = matrix(&[&[5.0, 6.0], &[7.0, 8.0]]);
        let mut steps = Vec::new();
        let c = add_traced(&a, &b, &mut steps).unwrap();
        assert_eq!(c, matrix(&[&[6.0, 8.0], &[10.0, 12.0]]));
        assert!(steps.contains(&"C[2,1] = 3 + 7 = 10".to_string()));
        assert_eq!(subtract(&c, &b).unwrap(), a);
    }

    #[test]
    fn test_shape_mismatch() {
        let a = matrix(&[&[1.0, 2.0]]);
        let b = matrix(&[&[1.0], &[2.0]]);
        assert!(matches!(
            add(&a, &b),
            Err(WorkbenchError::DimensionMismatch { .. })
        ));
        assert!(multiply(&a, &a).is_err());
    }

    #[test]
    fn test_product_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for (n, k, m) in [(1, 1, 1), (2, 3, 4), (4, 1, 2), (3, 3, 3)] {
            let a = random_matrix(&mut rng, n, k);
            let b = random_matrix(&mut rng, k, m);
            assert_eq!(multiply(&a, &b).unwrap().dimensions(), (n, m));
        }
    }

    #[test]
    fn test_multiply_trace_lists_terms() {
        let a = matrix(&[&[1.0, 2.0]]);
        let b = matrix(&[&[3.0], &[4.0]]);
        let mut steps = Vec::new();
        let c = multiply_traced(&a, &b, &mut steps).unwrap();
        assert_eq!(c, matrix(&[&[11.0]]));
        assert!(steps.contains(&"C[1,1] = (1×3) + (2×4) = 11".to_string()));
    }

    #[test]
    fn test_transpose_is_involutive() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let rows = rng.gen_range(1..6);
            let cols = rng.gen_range(1..6);
            let a = random_matrix(&mut rng, rows, cols);
            let t = transpose(&a);
            assert_eq!(t.dimensions(), (cols, rows));
            assert_eq!(transpose(&t), a);
        }
    }

    #[test]
    fn test_scalar_multiply() {
        let a = matrix(&[&[1.0, -2.0]]);
        assert_eq!(scalar_multiply(&a, 3.0), matrix(&[&[3.0, -6.0]]));
    }
}
