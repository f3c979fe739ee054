//! Determinants with derivations, and checks of determinant properties

use crate::error::{Result, WorkbenchError};
use crate::kernel::arithmetic::multiply;
use crate::kernel::elimination::determinant_by_elimination;
use crate::trace::{fmt_fixed, fmt_num, format_matrix, format_row};
use crate::traits::{Silent, StepSink};
use crate::types::Matrix;
use crate::validation::require_square;

/// How a determinant is computed and explained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum DeterminantMethod {
    /// First-row cofactor expansion, any size
    #[default]
    Cofactors,
    /// Rule of Sarrus, 3×3 only
    Sarrus,
    /// Closed form used by Cramer's rule, 2×2 or 3×3
    Cramer,
}

impl DeterminantMethod {
    pub fn name(self) -> &'static str {
        match self {
            Self::Cofactors => "cofactors",
            Self::Sarrus => "sarrus",
            Self::Cramer => "cramer",
        }
    }

    /// Whether the method applies to an n×n matrix
    pub fn supports(self, n: usize) -> bool {
        match self {
            Self::Cofactors => n >= 1,
            Self::Sarrus => n == 3,
            Self::Cramer => n == 2 || n == 3,
        }
    }
}

/// Compute `det(a)` with `method`, recording the derivation
pub fn determinant_traced<S: StepSink>(
    a: &Matrix,
    method: DeterminantMethod,
    sink: &mut S,
) -> Result<f64> {
    let n = require_square(a)?;
    if !method.supports(n) {
        return Err(WorkbenchError::InvalidMethodForDimension {
            method: method.name(),
            size: n,
        });
    }

    if sink.is_recording() {
        sink.record_with(|| format!("Determinant of a {n}×{n} matrix"));
        sink.record_with(|| "A =".to_string());
        for line in format_matrix(a) {
            sink.record(line);
        }
        sink.blank();
    }

    let det = match (method, n) {
        (DeterminantMethod::Cofactors, _) => cofactors_traced(a, sink),
        (DeterminantMethod::Cramer, 2) => {
            sink.record_with(|| "Closed form used by Cramer's rule for 2×2:".to_string());
            two_by_two_traced(a, sink)
        }
        (DeterminantMethod::Cramer, _) => {
            sink.record_with(|| "Closed form used by Cramer's rule for 3×3 (Sarrus expansion):".to_string());
            sarrus_traced(a, sink)
        }
        (DeterminantMethod::Sarrus, _) => sarrus_traced(a, sink),
    };

    sink.record_with(|| format!("det(A) = {}", fmt_num(det)));
    Ok(det)
}

/// Determinant by cofactor expansion, without a trace
pub fn determinant(a: &Matrix) -> Result<f64> {
    determinant_traced(a, DeterminantMethod::Cofactors, &mut Silent)
}

fn two_by_two(a: &Matrix) -> f64 {
    a[(0, 0)] * a[(1, 1)] - a[(0, 1)] * a[(1, 0)]
}

fn two_by_two_traced<S: StepSink>(a: &Matrix, sink: &mut S) -> f64 {
    let det = two_by_two(a);
    if sink.is_recording() {
        sink.record_with(|| "det(A) = ad − bc".to_string());
        sink.record_with(|| format!(
            "       = ({})({}) − ({})({}) = {}",
            fmt_num(a[(0, 0)]),
            fmt_num(a[(1, 1)]),
            fmt_num(a[(0, 1)]),
            fmt_num(a[(1, 0)]),
            fmt_num(det)
        ));
    }
    det
}

/// Plain recursive cofactor expansion along the first row
fn cofactor_expansion(a: &Matrix) -> f64 {
    match a.rows().len() {
        1 => a[(0, 0)],
        2 => two_by_two(a),
        n => (0..n)
            .filter_map(|j| {
                let minor = a.minor(0, j)?;
                let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
                Some(sign * a[(0, j)] * cofactor_expansion(&minor))
            })
            .sum(),
    }
}

/// Cofactor expansion that explains only the top-level terms
fn cofactors_traced<S: StepSink>(a: &Matrix, sink: &mut S) -> f64 {
    let n = a.rows().len();
    match n {
        1 => {
            sink.record_with(|| "A 1×1 determinant is its only entry".to_string());
            return a[(0, 0)];
        }
        2 => return two_by_two_traced(a, sink),
        _ => {}
    }

    sink.record_with(|| "Cofactor expansion along row 1: det(A) = Σ (−1)^(1+j) · a1j · det(M1j)".to_string());
    sink.blank();

    let mut contributions = Vec::with_capacity(n);
    for j in 0..n {
        let Some(minor) = a.minor(0, j) else { continue };
        let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
        let element = a[(0, j)];
        let minor_det = cofactor_expansion(&minor);
        let contribution = sign * element * minor_det;
        contributions.push(contribution);

        if sink.is_recording() {
            sink.record_with(|| format!(
                "j = {}: sign = {}, a1{} = {}",
                j + 1,
                if sign > 0.0 { "+1" } else { "−1" },
                j + 1,
                fmt_num(element)
            ));
            sink.record_with(|| format!("  M1{} =", j + 1));
            for line in format_matrix(&minor) {
                sink.record_with(|| format!("  {line}"));
            }
            sink.record_with(|| format!("  det(M1{}) = {}", j + 1, fmt_num(minor_det)));
            sink.record_with(|| format!(
                "  contribution = ({}) · ({}) · ({}) = {}",
                fmt_num(sign),
                fmt_num(element),
                fmt_num(minor_det),
                fmt_num(contribution)
            ));
        }
    }

    let det = contributions.iter().sum();
    if sink.is_recording() {
        let terms: Vec<String> = contributions.iter().map(|c| fmt_num(*c)).collect();
        sink.blank();
        sink.record_with(|| format!("det(A) = {} = {}", terms.join(" + "), fmt_num(det)));
    }
    det
}

fn sarrus_traced<S: StepSink>(a: &Matrix, sink: &mut S) -> f64 {
    let e = |i: usize, j: usize| a[(i, j % 3)];
    let down_right: Vec<f64> = (0..3).map(|j| e(0, j) * e(1, j + 1) * e(2, j + 2)).collect();
    let down_left: Vec<f64> = (0..3).map(|j| e(0, j + 2) * e(1, j + 1) * e(2, j)).collect();
    let positive: f64 = down_right.iter().sum();
    let negative: f64 = down_left.iter().sum();
    let det = positive - negative;

    if sink.is_recording() {
        sink.record_with(|| "Rule of Sarrus".to_string());
        sink.record_with(|| "Extended matrix (columns 1 and 2 repeated):".to_string());
        for i in 0..3 {
            let row: Vec<f64> = (0..5).map(|j| e(i, j)).collect();
            sink.record(format_row(&row));
        }
        sink.blank();

        sink.record_with(|| "Down-right diagonals:".to_string());
        for (j, p) in down_right.iter().enumerate() {
            sink.record_with(|| format!(
                "  P{} = {} · {} · {} = {}",
                j + 1,
                fmt_num(e(0, j)),
                fmt_num(e(1, j + 1)),
                fmt_num(e(2, j + 2)),
                fmt_num(*p)
            ));
        }
        sink.record_with(|| format!("Positive sum = {}", fmt_num(positive)));
        sink.blank();

        sink.record_with(|| "Down-left diagonals:".to_string());
        for (j, p) in down_left.iter().enumerate() {
            sink.record_with(|| format!(
                "  P{} = {} · {} · {} = {}",
                j + 4,
                fmt_num(e(0, j + 2)),
                fmt_num(e(1, j + 1)),
                fmt_num(e(2, j)),
                fmt_num(*p)
            ));
        }
        sink.record_with(|| format!("Negative sum = {}", fmt_num(negative)));
        sink.blank();
        sink.record_with(|| format!(
            "det(A) = {} − {} = {}",
            fmt_num(positive),
            fmt_num(negative),
            fmt_num(det)
        ));
    }
    det
}

/// Outcome of one determinant identity check
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyCheck {
    pub property: String,
    pub expected: f64,
    pub actual: f64,
    pub holds: bool,
}

impl PropertyCheck {
    fn new(property: impl Into<String>, expected: f64, actual: f64) -> Self {
        let scale = expected.abs().max(actual.abs()).max(1.0);
        Self {
            property: property.into(),
            expected,
            actual,
            holds: (expected - actual).abs() <= 1e-9 * scale,
        }
    }

    fn record<S: StepSink>(&self, sink: &mut S) {
        if sink.is_recording() {
            sink.record(self.property.clone());
            sink.record_with(|| format!(
                "  expected {}, computed {} → {}",
                fmt_fixed(self.expected, 4),
                fmt_fixed(self.actual, 4),
                if self.holds { "holds" } else { "does not hold" }
            ));
        }
    }
}

/// Check the elementary row properties of the determinant on `a`
///
/// Each property is checked by building the modified matrix and comparing
/// its determinant with the predicted value.
pub fn verify_properties_traced<S: StepSink>(
    a: &Matrix,
    sink: &mut S,
) -> Result<Vec<PropertyCheck>> {
    let n = require_square(a)?;
    let det = determinant_by_elimination(a)?;

    if sink.is_recording() {
        sink.record_with(|| "Determinant properties".to_string());
        sink.record_with(|| "A =".to_string());
        for line in format_matrix(a) {
            sink.record(line);
        }
        sink.record_with(|| format!("det(A) = {}", fmt_fixed(det, 4)));
        sink.blank();
    }

    let mut rows = a.rows().to_vec();
    let mut checks = Vec::new();

    rows[0].iter_mut().for_each(|v| *v = 0.0);
    checks.push(PropertyCheck::new(
        "Row 1 replaced by zeros: det = 0",
        0.0,
        determinant_by_elimination(&Matrix::from_rows_unchecked(rows.clone()))?,
    ));

    if n >= 2 {
        let mut equal = a.rows().to_vec();
        equal[1] = equal[0].clone();
        checks.push(PropertyCheck::new(
            "Row 2 replaced by row 1: det = 0",
            0.0,
            determinant_by_elimination(&Matrix::from_rows_unchecked(equal))?,
        ));

        let mut swapped = a.rows().to_vec();
        swapped.swap(0, 1);
        checks.push(PropertyCheck::new(
            "Rows 1 and 2 swapped: det = −det(A)",
            -det,
            determinant_by_elimination(&Matrix::from_rows_unchecked(swapped))?,
        ));
    }

    let k = 2.0;
    rows = a.rows().to_vec();
    rows[0].iter_mut().for_each(|v| *v *= k);
    checks.push(PropertyCheck::new(
        "Row 1 multiplied by k = 2: det = k·det(A)",
        k * det,
        determinant_by_elimination(&Matrix::from_rows_unchecked(rows))?,
    ));

    let transposed = crate::kernel::arithmetic::transpose(a);
    checks.push(PropertyCheck::new(
        "Transpose: det(Aᵀ) = det(A)",
        det,
        determinant_by_elimination(&transposed)?,
    ));

    for check in &checks {
        check.record(sink);
    }
    Ok(checks)
}

/// Compare `det(AB)` with `det(A)·det(B)`
pub fn verify_multiplicative_traced<S: StepSink>(
    a: &Matrix,
    b: &Matrix,
    sink: &mut S,
) -> Result<PropertyCheck> {
    require_square(a)?;
    require_square(b)?;
    let product = multiply(a, b)?;

    let det_a = determinant_by_elimination(a)?;
    let det_b = determinant_by_elimination(b)?;
    let det_ab = determinant_by_elimination(&product)?;

    if sink.is_recording() {
        sink.record_with(|| "Multiplicative property: det(AB) = det(A)·det(B)".to_string());
        sink.record_with(|| format!("det(A) = {}", fmt_fixed(det_a, 4)));
        sink.record_with(|| format!("det(B) = {}", fmt_fixed(det_b, 4)));
        sink.record_with(|| format!("det(A)·det(B) = {}", fmt_fixed(det_a * det_b, 4)));
        sink.record_with(|| "AB =".to_string());
        for line in format_matrix(&product) {
            sink.record(line);
        }
        sink.record_with(|| format!("det(AB) = {}", fmt_fixed(det_ab, 4)));
    }

    let check = PropertyCheck::new("det(AB) = det(A)·det(B)", det_a * det_b, det_ab);
    check.record(sink);
    Ok(check)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn matrix(rows: &[&[f64]]) -> Matrix {
        Matrix::new(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    fn random_square(rng: &mut StdRng, n: usize) -> Matrix {
        Matrix::new(
            (0..n)
                .map(|_| (0..n).map(|_| rng.gen_range(-9.0..9.0)).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_small_cases() {
        assert_eq!(determinant(&matrix(&[&[7.0]])).unwrap(), 7.0);
        assert_eq!(
            determinant(&matrix(&[&[1.0, 2.0], &[3.0, 4.0]])).unwrap(),
            -2.0
        );
    }

    #[test]
    fn test_methods_agree() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..25 {
            let a = random_square(&mut rng, 3);
            let cof = determinant_traced(&a, DeterminantMethod::Cofactors, &mut Silent).unwrap();
            let sar = determinant_traced(&a, DeterminantMethod::Sarrus, &mut Silent).unwrap();
            let cra = determinant_traced(&a, DeterminantMethod::Cramer, &mut Silent).unwrap();
            let eli = determinant_by_elimination(&a).unwrap();
            assert_relative_eq!(cof, sar, epsilon = 1e-9);
            assert_relative_eq!(cof, cra, epsilon = 1e-9);
            assert_relative_eq!(cof, eli, epsilon = 1e-9);
        }
        for n in [2, 4, 5] {
            let a = random_square(&mut rng, n);
            assert_relative_eq!(
                determinant(&a).unwrap(),
                determinant_by_elimination(&a).unwrap(),
                epsilon = 1e-9,
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn test_method_dimension_rules() {
        let two = matrix(&[&[1.0, 2.0], &[3.0, 4.0]]);
        assert_eq!(
            determinant_traced(&two, DeterminantMethod::Sarrus, &mut Silent),
            Err(WorkbenchError::InvalidMethodForDimension {
                method: "sarrus",
                size: 2
            })
        );
        assert_eq!(
            determinant_traced(&two, DeterminantMethod::Cramer, &mut Silent),
            Ok(-2.0)
        );
        let four = Matrix::identity(4).unwrap();
        assert!(determinant_traced(&four, DeterminantMethod::Cramer, &mut Silent).is_err());
        assert!(matches!(
            determinant(&matrix(&[&[1.0, 2.0]])),
            Err(WorkbenchError::NotSquare { .. })
        ));
    }

    #[test]
    fn test_cofactor_trace_is_top_level_only() {
        let a = Matrix::identity(4).unwrap();
        let mut steps = Vec::new();
        determinant_traced(&a, DeterminantMethod::Cofactors, &mut steps).unwrap();
        let terms = steps.iter().filter(|s| s.starts_with("j = ")).count();
        assert_eq!(terms, 4);
        assert_eq!(steps.last().map(String::as_str), Some("det(A) = 1"));
    }

    #[test]
    fn test_sarrus_trace() {
        let a = matrix(&[&[2.0, -3.0, 1.0], &[2.0, 0.0, -1.0], &[1.0, 4.0, 5.0]]);
        let mut steps = Vec::new();
        let det = determinant_traced(&a, DeterminantMethod::Sarrus, &mut steps).unwrap();
        assert_relative_eq!(det, 49.0, epsilon = 1e-12);
        assert!(steps.iter().any(|s| s.starts_with("Positive sum")));
        assert!(steps.iter().any(|s| s.starts_with("Negative sum")));
    }

    #[test]
    fn test_properties_hold() {
        let a = matrix(&[&[2.0, 1.0, 3.0], &[0.0, -1.0, 4.0], &[1.0, 2.0, 0.0]]);
        let checks = verify_properties_traced(&a, &mut Silent).unwrap();
        assert_eq!(checks.len(), 5);
        assert!(checks.iter().all(|c| c.holds));

        let single = matrix(&[&[3.0]]);
        assert_eq!(verify_properties_traced(&single, &mut Silent).unwrap().len(), 3);
    }

    #[test]
    fn test_multiplicative() {
        let mut rng = StdRng::seed_from_u64(5);
        let a = random_square(&mut rng, 3);
        let b = random_square(&mut rng, 3);
        assert!(verify_multiplicative_traced(&a, &b, &mut Silent).unwrap().holds);

        let c = Matrix::identity(2).unwrap();
        assert!(verify_multiplicative_traced(&a, &c, &mut Silent).is_err());
    }
}
