//! Demonstrations of positional notation and numerical error
//!
//! These operations exist for their steps: each returns a small summary of
//! the numbers it computed, while the derivation carries the explanation.

use crate::constants::{MAX_ROUNDOFF_ITERATIONS, MAX_TAYLOR_TERMS, RELATIVE_ERROR_FLOOR};
use crate::error::{Result, WorkbenchError};
use crate::trace::fmt_num;
use crate::traits::StepSink;
use crate::validation::{parse_digits, require_finite, require_range};

/// Longest digit strings whose value always fits in a `u128`
const MAX_DIGITS_BASE10: usize = 38;
const MAX_DIGITS_BASE2: usize = 128;

fn decompose<S: StepSink>(input: &str, base: u32, sink: &mut S) -> Result<u128> {
    let digits = parse_digits(input, base)?;
    let limit = if base == 2 {
        MAX_DIGITS_BASE2
    } else {
        MAX_DIGITS_BASE10
    };
    if digits.len() > limit {
        return Err(WorkbenchError::TooLarge {
            what: "digit count",
            limit,
            found: digits.len(),
        });
    }

    let text = input.trim();
    let top = digits.len() - 1;
    let mut powers = Vec::with_capacity(digits.len());
    let mut products = Vec::with_capacity(digits.len());
    let mut values = Vec::with_capacity(digits.len());
    let mut total: u128 = 0;
    for (i, &d) in digits.iter().enumerate() {
        let exponent = top - i;
        let place = u128::from(base).pow(exponent as u32);
        let value = u128::from(d) * place;
        total += value;
        powers.push(format!("{d}×{base}^{exponent}"));
        products.push(format!("{d}×{place}"));
        values.push(value.to_string());
    }

    if sink.is_recording() {
        let pad = " ".repeat(text.chars().count());
        sink.record_with(|| format!("Positional decomposition of {text} in base {base}"));
        sink.record_with(|| format!("{text} = {}", powers.join(" + ")));
        sink.record_with(|| format!("{pad} = {}", products.join(" + ")));
        sink.record_with(|| format!("{pad} = {}", values.join(" + ")));
        sink.record_with(|| format!("{pad} = {total}"));
        if base == 2 {
            sink.blank();
            sink.record_with(|| format!("{text}₂ = {total}₁₀"));
        }
    }
    Ok(total)
}

/// Expand a decimal digit string by powers of ten
pub fn decompose_base10<S: StepSink>(digits: &str, sink: &mut S) -> Result<u128> {
    decompose(digits, 10, sink)
}

/// Expand a binary string by powers of two and convert to decimal
pub fn decompose_base2<S: StepSink>(bits: &str, sink: &mut S) -> Result<u128> {
    decompose(bits, 2, sink)
}

/// Running sum from [`roundoff_demo`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Roundoff {
    pub sum: f64,
    pub expected: f64,
    pub error: f64,
    pub single_precision_sum: f32,
    pub exactly_equal: bool,
}

/// Add `value` to itself `n` times and compare with `n·value`
///
/// A single-precision accumulator runs alongside to show how the drift grows
/// with fewer mantissa bits.
pub fn roundoff_demo<S: StepSink>(value: f64, n: usize, sink: &mut S) -> Result<Roundoff> {
    require_finite("value", value)?;
    require_range("n", n, 1, MAX_ROUNDOFF_ITERATIONS)?;

    sink.record_with(|| format!(
        "Round-off: adding {} to itself {n} times and comparing with i·{}",
        fmt_num(value),
        fmt_num(value)
    ));
    sink.blank();

    let mut sum = 0.0_f64;
    let mut single = 0.0_f32;
    let mut expected = 0.0;
    for i in 1..=n {
        sum += value;
        single += value as f32;
        expected = i as f64 * value;
        if sink.is_recording() {
            sink.record_with(|| format!(
                "i = {i}: sum = {sum:.17}, i·value = {expected:.17}, |error| = {:.3e}, f32 sum = {single:.9}",
                (sum - expected).abs()
            ));
        }
    }

    let exactly_equal = sum == expected;
    sink.blank();
    sink.record_with(|| format!(
        "sum == {n}·{}: {exactly_equal} (sum = {sum:.17})",
        fmt_num(value)
    ));
    sink.record_with(|| format!(
        "f32 accumulation error = {:.3e}",
        (f64::from(single) - expected).abs()
    ));

    Ok(Roundoff {
        sum,
        expected,
        error: (sum - expected).abs(),
        single_precision_sum: single,
        exactly_equal,
    })
}

/// Final partial sum from [`truncation_demo`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Truncation {
    pub approximation: f64,
    pub exact: f64,
    pub absolute_error: f64,
    pub relative_error: f64,
}

/// Taylor partial sums of `e^x` up to degree `max_terms`
pub fn truncation_demo<S: StepSink>(x: f64, max_terms: usize, sink: &mut S) -> Result<Truncation> {
    require_finite("x", x)?;
    require_range("max_terms", max_terms, 1, MAX_TAYLOR_TERMS)?;

    let exact = x.exp();
    sink.record_with(|| format!(
        "Truncation: Taylor series of e^x at x = {}, exact value {exact:.12}",
        fmt_num(x)
    ));
    sink.record_with(|| "e^x = Σ x^n / n!".to_string());
    sink.blank();

    let mut approximation = 0.0;
    let mut term = 1.0;
    let mut absolute_error = 0.0;
    let mut relative_error = 0.0;
    for n in 0..=max_terms {
        if n > 0 {
            term *= x / n as f64;
        }
        approximation += term;
        absolute_error = (exact - approximation).abs();
        relative_error = if exact.abs() > RELATIVE_ERROR_FLOOR {
            absolute_error / exact.abs()
        } else {
            0.0
        };
        if sink.is_recording() {
            sink.record_with(|| format!(
                "n = {n}: term = {term:.10}, partial sum = {approximation:.10}, |error| = {absolute_error:.3e}, relative = {:.6}%",
                relative_error * 100.0
            ));
        }
    }

    Ok(Truncation {
        approximation,
        exact,
        absolute_error,
        relative_error,
    })
}

/// Residuals from [`propagation_demo`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Propagation {
    pub sum: f64,
    /// `|(a − (a − b)) − b|`
    pub subtraction_residual: f64,
    /// `|(a / b)·b − a|`, absent when `b = 0`
    pub division_residual: Option<f64>,
}

/// Show how round-off propagates through inverse operations
pub fn propagation_demo<S: StepSink>(a: f64, b: f64, sink: &mut S) -> Result<Propagation> {
    require_finite("a", a)?;
    require_finite("b", b)?;

    sink.record_with(|| format!("Error propagation with a = {}, b = {}", fmt_num(a), fmt_num(b)));
    let sum = a + b;
    sink.record_with(|| format!("a + b = {}", fmt_num(sum)));

    let back = a - (a - b);
    let subtraction_residual = (back - b).abs();
    sink.record_with(|| format!(
        "a − (a − b) = {} (should be {}), residual = {subtraction_residual:.3e}",
        fmt_num(back),
        fmt_num(b)
    ));

    let division_residual = if b != 0.0 {
        let round_trip = (a / b) * b;
        let residual = (round_trip - a).abs();
        sink.record_with(|| format!(
            "(a / b)·b = {} (should be {}), residual = {residual:.3e}",
            fmt_num(round_trip),
            fmt_num(a)
        ));
        Some(residual)
    } else {
        sink.record_with(|| "b = 0, so (a / b)·b is skipped".to_string());
        None
    };

    Ok(Propagation {
        sum,
        subtraction_residual,
        division_residual,
    })
}

/// How a function changed the relative error of its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Diagnosis {
    Amplified,
    Attenuated,
    Stable,
}

/// Input and output errors from [`function_propagation`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionPropagation {
    pub absolute_input_error: f64,
    pub relative_input_error: f64,
    pub absolute_output_error: f64,
    pub relative_output_error: f64,
    pub diagnosis: Diagnosis,
}

fn sample_function(x: f64) -> f64 {
    x.sin() + x * x
}

fn relative(absolute: f64, reference: f64) -> f64 {
    if reference.abs() > RELATIVE_ERROR_FLOOR {
        absolute / reference.abs()
    } else {
        0.0
    }
}

/// Propagate the error of `approx_x` through `f(x) = sin(x) + x²`
///
/// A relative output error more than 10% above the input's is amplified,
/// more than 10% below is attenuated, anything else is stable.
pub fn function_propagation<S: StepSink>(
    true_x: f64,
    approx_x: f64,
    sink: &mut S,
) -> Result<FunctionPropagation> {
    require_finite("true_value", true_x)?;
    require_finite("approx_value", approx_x)?;

    let (true_y, approx_y) = (sample_function(true_x), sample_function(approx_x));
    let absolute_input_error = (true_x - approx_x).abs();
    let relative_input_error = relative(absolute_input_error, true_x);
    let absolute_output_error = (true_y - approx_y).abs();
    let relative_output_error = relative(absolute_output_error, true_y);

    let diagnosis = if relative_output_error > relative_input_error * 1.1
        && relative_input_error > RELATIVE_ERROR_FLOOR
    {
        Diagnosis::Amplified
    } else if relative_output_error < relative_input_error * 0.9
        && relative_output_error > RELATIVE_ERROR_FLOOR
    {
        Diagnosis::Attenuated
    } else {
        Diagnosis::Stable
    };

    if sink.is_recording() {
        sink.record_with(|| "Error propagation through f(x) = sin(x) + x^2".to_string());
        sink.blank();
        sink.record_with(|| format!("{:<18} | {:>20} | {:>20}", "", "input x", "output f(x)"));
        sink.record("-".repeat(64));
        let rows = [
            ("true value", true_x, true_y),
            ("approximation", approx_x, approx_y),
            ("absolute error", absolute_input_error, absolute_output_error),
            ("relative error", relative_input_error, relative_output_error),
        ];
        for (name, input, output) in rows {
            sink.record_with(|| format!("{name:<18} | {input:>20.10} | {output:>20.10}"));
        }
        sink.record_with(|| format!(
            "{:<18} | {:>19.8}% | {:>19.8}%",
            "relative error %",
            relative_input_error * 100.0,
            relative_output_error * 100.0
        ));
        sink.blank();
        sink.record(match diagnosis {
            Diagnosis::Amplified => "Diagnosis: the function amplified the relative error",
            Diagnosis::Attenuated => "Diagnosis: the function attenuated the relative error",
            Diagnosis::Stable => "Diagnosis: the relative error stayed about the same",
        }
        .to_string());
    }

    Ok(FunctionPropagation {
        absolute_input_error,
        relative_input_error,
        absolute_output_error,
        relative_output_error,
        diagnosis,
    })
}

/// `0.1 + 0.2` compared with `0.3`; returns the computed sum
pub fn floating_point_demo<S: StepSink>(sink: &mut S) -> f64 {
    let sum = 0.1_f64 + 0.2_f64;
    sink.record_with(|| "Floating point: 0.1 + 0.2".to_string());
    sink.record_with(|| format!("Result: {sum}"));
    sink.record_with(|| format!("Equal to 0.3? {}", sum == 0.3));
    sink.record_with(|| format!("Stored value: {sum:.17}"));
    sink.record(
        "0.1 and 0.2 have no finite binary expansion, so both are stored as the nearest double and their sum rounds to a value just above 0.3"
            .to_string(),
    );
    sum
}
