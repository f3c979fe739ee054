//! Root finding for user functions f(x) = 0
//!
//! Bracketing methods (bisection, false position) need a sign change over
//! `[a, b]`; open methods (Newton-Raphson, secant) start from one or two
//! guesses. Every method is bounded by `max_iterations`. Running out of
//! iterations is not an error here: the best estimate comes back with
//! `converged == false`, and [`RootSolution::convergence_error`] turns that
//! into an error for callers that report one.

use crate::constants::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE, DERIVATIVE_STEP, STAGNATION_EPSILON,
};
use crate::error::{Result, WorkbenchError};
use crate::trace::fmt_num;
use crate::traits::{ScalarFunction, StepSink};
use crate::validation::{require_finite, require_tolerance};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum RootMethod {
    Bisection,
    FalsePosition,
    NewtonRaphson,
    Secant,
}

impl RootMethod {
    pub fn title(self) -> &'static str {
        match self {
            Self::Bisection => "Bisection method",
            Self::FalsePosition => "False position (regula falsi) method",
            Self::NewtonRaphson => "Newton-Raphson method",
            Self::Secant => "Secant method",
        }
    }
}

/// Stopping parameters shared by every method
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootOptions {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for RootOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl RootOptions {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn validate(&self) -> Result<()> {
        require_tolerance(self.tolerance)?;
        if self.max_iterations == 0 {
            return Err(WorkbenchError::OutOfRange {
                name: "max_iterations",
                min: 1.0,
                max: f64::MAX,
                found: 0.0,
            });
        }
        Ok(())
    }
}

/// Where a root finder stopped
#[derive(Debug, Clone, PartialEq)]
pub struct RootSolution {
    pub root: f64,
    pub converged: bool,
    pub iterations: usize,
    pub function_value: f64,
    pub method: RootMethod,
}

impl RootSolution {
    /// `NotConverged` when the iteration budget ran out
    pub fn convergence_error(&self) -> Option<WorkbenchError> {
        (!self.converged).then_some(WorkbenchError::NotConverged {
            iterations: self.iterations,
            estimate: self.root,
        })
    }
}

fn header<F, S>(method: RootMethod, f: &F, options: &RootOptions, sink: &mut S)
where
    F: ScalarFunction + ?Sized,
    S: StepSink,
{
    if sink.is_recording() {
        sink.record(method.title().to_string());
        sink.record_with(|| format!("f(x) = {}", f.label()));
        sink.record_with(|| format!(
            "Tolerance = {}, maximum iterations = {}",
            fmt_num(options.tolerance),
            options.max_iterations
        ));
    }
}

fn found<S: StepSink>(
    method: RootMethod,
    root: f64,
    function_value: f64,
    iterations: usize,
    sink: &mut S,
) -> RootSolution {
    sink.record_with(|| format!(
        "Root ≈ {root:.8}, f(root) = {function_value:.6e}, after {iterations} iterations"
    ));
    RootSolution {
        root,
        converged: true,
        iterations,
        function_value,
        method,
    }
}

fn exhausted<S: StepSink>(
    method: RootMethod,
    root: f64,
    function_value: f64,
    iterations: usize,
    sink: &mut S,
) -> RootSolution {
    sink.record_with(|| format!(
        "Maximum of {iterations} iterations reached without convergence, best estimate x ≈ {root:.8}"
    ));
    RootSolution {
        root,
        converged: false,
        iterations,
        function_value,
        method,
    }
}

/// Shared driver for the two bracketing methods
fn bracketing<F, S>(
    method: RootMethod,
    f: &F,
    a: f64,
    b: f64,
    options: &RootOptions,
    sink: &mut S,
    next: fn(f64, f64, f64, f64) -> f64,
) -> Result<RootSolution>
where
    F: ScalarFunction + ?Sized,
    S: StepSink,
{
    options.validate()?;
    let (mut a, mut b) = (require_finite("a", a)?, require_finite("b", b)?);

    header(method, f, options, sink);
    if a > b {
        core::mem::swap(&mut a, &mut b);
        sink.record_with(|| "a > b, so the endpoints were swapped".to_string());
    }

    let (mut fa, mut fb) = (f.evaluate(a)?, f.evaluate(b)?);
    sink.record_with(|| format!(
        "[a, b] = [{}, {}], f(a) = {fa:.6e}, f(b) = {fb:.6e}",
        fmt_num(a),
        fmt_num(b)
    ));
    if fa == 0.0 {
        sink.record_with(|| "f(a) = 0, so a is already a root".to_string());
        return Ok(found(method, a, fa, 0, sink));
    }
    if fb == 0.0 {
        sink.record_with(|| "f(b) = 0, so b is already a root".to_string());
        return Ok(found(method, b, fb, 0, sink));
    }
    if fa.signum() == fb.signum() {
        sink.record_with(|| "f(a) and f(b) have the same sign, so no root is guaranteed".to_string());
        return Err(WorkbenchError::NoSignChange { fa, fb });
    }
    sink.blank();

    let mut previous: Option<f64> = None;
    let mut c = a;
    let mut fc = fa;
    for k in 1..=options.max_iterations {
        c = next(a, b, fa, fb);
        fc = f.evaluate(c)?;
        sink.record_with(|| format!(
            "k = {k}: a = {a:.8}, b = {b:.8}, c = {c:.8}, f(c) = {fc:.6e}"
        ));

        let half_width = (b - a) / 2.0;
        // False position can pin one endpoint, so the half-width alone may never shrink
        let step = previous.map(|p| (c - p).abs());
        if fc.abs() < options.tolerance
            || half_width < options.tolerance
            || step.is_some_and(|s| s < options.tolerance)
        {
            sink.record_with(|| "Stopping criterion met".to_string());
            return Ok(found(method, c, fc, k, sink));
        }

        if fa.signum() != fc.signum() {
            b = c;
            fb = fc;
        } else {
            a = c;
            fa = fc;
        }
        previous = Some(c);
    }

    Ok(exhausted(method, c, fc, options.max_iterations, sink))
}

/// Bisection on `[a, b]`: halve the bracket until `|f(c)|`, the half-width
/// or the distance between successive estimates drops below the tolerance
pub fn bisection<F, S>(f: &F, a: f64, b: f64, options: &RootOptions, sink: &mut S) -> Result<RootSolution>
where
    F: ScalarFunction + ?Sized,
    S: StepSink,
{
    bracketing(RootMethod::Bisection, f, a, b, options, sink, |a, b, _, _| {
        (a + b) / 2.0
    })
}

/// False position on `[a, b]`: replace an endpoint with the secant
/// intercept `c = a − f(a)(b − a)/(f(b) − f(a))`
pub fn false_position<F, S>(
    f: &F,
    a: f64,
    b: f64,
    options: &RootOptions,
    sink: &mut S,
) -> Result<RootSolution>
where
    F: ScalarFunction + ?Sized,
    S: StepSink,
{
    bracketing(RootMethod::FalsePosition, f, a, b, options, sink, |a, b, fa, fb| {
        a - fa * (b - a) / (fb - fa)
    })
}

/// Central-difference approximation of f'(x)
pub fn derivative<F: ScalarFunction + ?Sized>(f: &F, x: f64) -> Result<f64> {
    let h = DERIVATIVE_STEP * x.abs().max(1.0);
    Ok((f.evaluate(x + h)? - f.evaluate(x - h)?) / (2.0 * h))
}

/// Newton-Raphson from `x0` with a numerical derivative
pub fn newton_raphson<F, S>(f: &F, x0: f64, options: &RootOptions, sink: &mut S) -> Result<RootSolution>
where
    F: ScalarFunction + ?Sized,
    S: StepSink,
{
    let method = RootMethod::NewtonRaphson;
    options.validate()?;
    let mut x = require_finite("x0", x0)?;

    header(method, f, options, sink);
    sink.record_with(|| "x_{n+1} = x_n − f(x_n) / f'(x_n), f' by central difference".to_string());

    let mut fx = f.evaluate(x)?;
    if fx == 0.0 {
        sink.record_with(|| format!("f(x0) = 0, so x0 = {} is already a root", fmt_num(x)));
        return Ok(found(method, x, fx, 0, sink));
    }
    sink.blank();

    for k in 1..=options.max_iterations {
        let slope = derivative(f, x)?;
        if slope.abs() < options.tolerance {
            sink.record_with(|| format!(
                "k = {k}: f'({x:.8}) = {slope:.6e} is below the tolerance, cannot continue"
            ));
            return Err(WorkbenchError::DerivativeNearZero {
                x,
                derivative: slope,
            });
        }

        let next = x - fx / slope;
        sink.record_with(|| format!(
            "k = {k}: x = {x:.8}, f(x) = {fx:.6e}, f'(x) = {slope:.6e}, x_next = {next:.8}"
        ));
        let step = (next - x).abs();
        x = next;
        fx = f.evaluate(x)?;
        if step < options.tolerance {
            sink.record_with(|| format!("|x_next − x| = {step:.3e} < tolerance"));
            return Ok(found(method, x, fx, k, sink));
        }
    }

    Ok(exhausted(method, x, fx, options.max_iterations, sink))
}

/// Secant method from the two starting points `x0`, `x1`
pub fn secant<F, S>(
    f: &F,
    x0: f64,
    x1: f64,
    options: &RootOptions,
    sink: &mut S,
) -> Result<RootSolution>
where
    F: ScalarFunction + ?Sized,
    S: StepSink,
{
    let method = RootMethod::Secant;
    options.validate()?;
    let (mut previous, mut x) = (require_finite("x0", x0)?, require_finite("x1", x1)?);

    header(method, f, options, sink);
    sink.record_with(|| "x_{n+1} = x_n − f(x_n)(x_n − x_{n−1}) / (f(x_n) − f(x_{n−1}))".to_string());

    let mut f_previous = f.evaluate(previous)?;
    let mut fx = f.evaluate(x)?;
    if f_previous == 0.0 {
        sink.record_with(|| "f(x0) = 0, so x0 is already a root".to_string());
        return Ok(found(method, previous, f_previous, 0, sink));
    }
    if fx == 0.0 {
        sink.record_with(|| "f(x1) = 0, so x1 is already a root".to_string());
        return Ok(found(method, x, fx, 0, sink));
    }
    sink.blank();

    for k in 1..=options.max_iterations {
        let denominator = fx - f_previous;
        if denominator.abs() < STAGNATION_EPSILON {
            sink.record_with(|| format!(
                "k = {k}: f(x_n) − f(x_n−1) = {denominator:.3e}, the secant is flat"
            ));
            return Err(WorkbenchError::StagnantSecant { iteration: k });
        }

        let next = x - fx * (x - previous) / denominator;
        sink.record_with(|| format!(
            "k = {k}: x_n−1 = {previous:.8}, x_n = {x:.8}, f(x_n) = {fx:.6e}, x_next = {next:.8}"
        ));
        let step = (next - x).abs();
        previous = x;
        f_previous = fx;
        x = next;
        fx = f.evaluate(x)?;
        if step < options.tolerance {
            sink.record_with(|| format!("|x_next − x_n| = {step:.3e} < tolerance"));
            return Ok(found(method, x, fx, k, sink));
        }
    }

    Ok(exhausted(method, x, fx, options.max_iterations, sink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expression;
    use crate::traits::Silent;
    use approx::assert_abs_diff_eq;

    fn cubic() -> Expression {
        Expression::parse("x^3 - x - 2").unwrap()
    }

    #[test]
    fn test_bisection_cubic() {
        let mut steps = Vec::new();
        let result = bisection(&cubic(), 1.0, 2.0, &RootOptions::default(), &mut steps).unwrap();
        assert!(result.converged);
        assert_abs_diff_eq!(result.root, 1.5214, epsilon = 1e-3);
        assert_eq!(
            steps.iter().filter(|s| s.starts_with("k = ")).count(),
            result.iterations
        );
    }

    #[test]
    fn test_newton_needs_fewer_iterations() {
        let options = RootOptions::default();
        let bisect = bisection(&cubic(), 1.0, 2.0, &options, &mut Silent).unwrap();
        let newton = newton_raphson(&cubic(), 1.5, &options, &mut Silent).unwrap();
        assert!(newton.converged);
        assert_abs_diff_eq!(newton.root, 1.52138, epsilon = 1e-4);
        assert!(newton.iterations < bisect.iterations);
    }

    #[test]
    fn test_false_position_stops_on_successive_estimates() {
        let f = Expression::parse("x^2 - 2").unwrap();
        let options = RootOptions::default()
            .with_tolerance(1e-6)
            .with_max_iterations(200);
        let mut steps = Vec::new();
        let result = false_position(&f, 0.0, 10.0, &options, &mut steps).unwrap();
        assert!(result.converged);
        assert_abs_diff_eq!(result.root, std::f64::consts::SQRT_2, epsilon = 1e-4);
        // b = 10 is never replaced
        let last = steps.iter().rev().find(|s| s.starts_with("k = ")).unwrap();
        assert!(last.contains("b = 10.00000000"));
    }

    #[test]
    fn test_false_position_and_secant() {
        let options = RootOptions::default().with_tolerance(1e-8);
        let fp = false_position(&cubic(), 1.0, 2.0, &options, &mut Silent).unwrap();
        let sec = secant(&cubic(), 1.0, 2.0, &options, &mut Silent).unwrap();
        assert!(fp.converged && sec.converged);
        assert_abs_diff_eq!(fp.root, 1.5213797, epsilon = 1e-6);
        assert_abs_diff_eq!(sec.root, 1.5213797, epsilon = 1e-6);
    }

    #[test]
    fn test_no_sign_change() {
        let f = Expression::parse("x^2 + 1").unwrap();
        let mut steps = Vec::new();
        let err = bisection(&f, -1.0, 1.0, &RootOptions::default(), &mut steps).unwrap_err();
        assert_eq!(err, WorkbenchError::NoSignChange { fa: 2.0, fb: 2.0 });
        assert!(!steps.is_empty());
    }

    #[test]
    fn test_endpoint_root_returns_immediately() {
        let f = Expression::parse("x - 1").unwrap();
        let result = bisection(&f, 1.0, 3.0, &RootOptions::default(), &mut Silent).unwrap();
        assert_eq!(result.root, 1.0);
        assert_eq!(result.iterations, 0);
        assert!(result.converged);
    }

    #[test]
    fn test_swapped_bracket() {
        let result = bisection(&cubic(), 2.0, 1.0, &RootOptions::default(), &mut Silent).unwrap();
        assert_abs_diff_eq!(result.root, 1.5214, epsilon = 1e-3);
    }

    #[test]
    fn test_exhaustion_reports_best_estimate() {
        let options = RootOptions::default().with_max_iterations(3);
        let result = bisection(&cubic(), 1.0, 2.0, &options, &mut Silent).unwrap();
        assert!(!result.converged);
        assert_eq!(result.iterations, 3);
        assert!(matches!(
            result.convergence_error(),
            Some(WorkbenchError::NotConverged { iterations: 3, .. })
        ));
    }

    #[test]
    fn test_newton_flat_derivative() {
        let f = Expression::parse("x^2 + 1").unwrap();
        let err = newton_raphson(&f, 0.0, &RootOptions::default(), &mut Silent).unwrap_err();
        assert!(matches!(err, WorkbenchError::DerivativeNearZero { .. }));
    }

    #[test]
    fn test_secant_stagnation() {
        let f = Expression::parse("x^2 - 4").unwrap();
        let err = secant(&f, -1.0, 1.0, &RootOptions::default(), &mut Silent).unwrap_err();
        assert_eq!(err, WorkbenchError::StagnantSecant { iteration: 1 });
    }

    #[test]
    fn test_invalid_options() {
        let options = RootOptions::default().with_tolerance(0.0);
        assert!(matches!(
            bisection(&cubic(), 1.0, 2.0, &options, &mut Silent),
            Err(WorkbenchError::OutOfRange { .. })
        ));
        let options = RootOptions::default().with_max_iterations(0);
        assert!(newton_raphson(&cubic(), 1.0, &options, &mut Silent).is_err());
    }

    #[test]
    fn test_evaluation_failure_keeps_error() {
        let f = Expression::parse("log(x)").unwrap();
        assert_eq!(
            newton_raphson(&f, 0.0, &RootOptions::default(), &mut Silent),
            Err(WorkbenchError::NonFiniteValue { x: 0.0 })
        );
    }
}
