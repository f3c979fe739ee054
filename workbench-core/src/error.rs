//! Error types for workbench operations

/// Broad classes of failure, used by callers to decide how much of a trace
/// accompanies an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad input detected before any computation starts
    Validation,
    /// A numeric precondition failed part-way through a computation
    NumericPrecondition,
    /// An iterative method exhausted its iteration budget
    NonConvergence,
    /// A user-supplied expression could not be parsed
    Parse,
}

/// Errors that can occur during workbench operations
#[derive(Debug, Clone, PartialEq)]
pub enum WorkbenchError {
    /// No rows, no columns, or no vectors were supplied
    EmptyInput,
    /// A row of a matrix literal has a different length than the first row
    JaggedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// An entry is NaN or infinite
    NonFiniteEntry { row: usize, col: usize },
    /// Operand shapes are incompatible for the operation
    DimensionMismatch {
        operation: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },
    /// The operation requires a square matrix
    NotSquare { rows: usize, cols: usize },
    /// The determinant method does not apply to this size
    InvalidMethodForDimension { method: &'static str, size: usize },
    /// A positional-notation string contains characters outside the base
    InvalidDigits { base: u32 },
    /// An operation was requested without one of its operands
    MissingOperand(&'static str),
    /// A numeric argument is outside its accepted range
    OutOfRange {
        name: &'static str,
        min: f64,
        max: f64,
        found: f64,
    },
    /// Input exceeds a configured size limit
    TooLarge {
        what: &'static str,
        limit: usize,
        found: usize,
    },
    /// The matrix is (numerically) singular
    Singular { determinant: f64 },
    /// f(a) and f(b) share a sign, so the bracket holds no guaranteed root
    NoSignChange { fa: f64, fb: f64 },
    /// Newton-Raphson derivative fell below the tolerance
    DerivativeNearZero { x: f64, derivative: f64 },
    /// Secant denominator f(x_n) - f(x_{n-1}) underflowed
    StagnantSecant { iteration: usize },
    /// The function evaluated to NaN or infinity
    NonFiniteValue { x: f64 },
    /// The iteration budget ran out before the tolerance was met
    NotConverged { iterations: usize, estimate: f64 },
    /// A function expression is malformed
    Parse { position: usize, message: String },
}

impl WorkbenchError {
    /// Which class of failure this is
    pub fn category(&self) -> ErrorCategory {
        use WorkbenchError::*;
        match self {
            EmptyInput
            | JaggedMatrix { .. }
            | NonFiniteEntry { .. }
            | DimensionMismatch { .. }
            | NotSquare { .. }
            | InvalidMethodForDimension { .. }
            | InvalidDigits { .. }
            | MissingOperand(_)
            | OutOfRange { .. }
            | TooLarge { .. } => ErrorCategory::Validation,
            Singular { .. }
            | NoSignChange { .. }
            | DerivativeNearZero { .. }
            | StagnantSecant { .. }
            | NonFiniteValue { .. } => ErrorCategory::NumericPrecondition,
            NotConverged { .. } => ErrorCategory::NonConvergence,
            Parse { .. } => ErrorCategory::Parse,
        }
    }

    /// Stable machine-readable identifier
    pub fn code(&self) -> &'static str {
        use WorkbenchError::*;
        match self {
            EmptyInput => "empty_input",
            JaggedMatrix { .. } => "jagged_matrix",
            NonFiniteEntry { .. } => "non_finite_entry",
            DimensionMismatch { .. } => "dimension_mismatch",
            NotSquare { .. } => "not_square",
            InvalidMethodForDimension { .. } => "invalid_method_for_dimension",
            InvalidDigits { .. } => "invalid_digits",
            MissingOperand(_) => "missing_operand",
            OutOfRange { .. } => "out_of_range",
            TooLarge { .. } => "too_large",
            Singular { .. } => "singular",
            NoSignChange { .. } => "no_sign_change",
            DerivativeNearZero { .. } => "derivative_near_zero",
            StagnantSecant { .. } => "stagnant_secant",
            NonFiniteValue { .. } => "non_finite_value",
            NotConverged { .. } => "not_converged",
            Parse { .. } => "parse_error",
        }
    }
}

impl core::fmt::Display for WorkbenchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use WorkbenchError::*;
        match self {
            EmptyInput => write!(f, "Input is empty"),
            JaggedMatrix {
                row,
                expected,
                found,
            } => write!(
                f,
                "Row {} has {found} entries, expected {expected}",
                row + 1
            ),
            NonFiniteEntry { row, col } => {
                write!(f, "Entry ({}, {}) is not a finite number", row + 1, col + 1)
            }
            DimensionMismatch {
                operation,
                left,
                right,
            } => write!(
                f,
                "Incompatible dimensions for {operation}: {}x{} and {}x{}",
                left.0, left.1, right.0, right.1
            ),
            NotSquare { rows, cols } => {
                write!(f, "The matrix must be square, got {rows}x{cols}")
            }
            InvalidMethodForDimension { method, size } => {
                write!(f, "Method {method} does not apply to a {size}x{size} matrix")
            }
            InvalidDigits { base } => match base {
                2 => write!(f, "Only the digits 0 and 1 are allowed in base 2"),
                _ => write!(f, "Only the digits 0-9 are allowed in base {base}"),
            },
            MissingOperand(name) => write!(f, "Missing operand: {name}"),
            OutOfRange {
                name,
                min,
                max,
                found,
            } => write!(f, "{name} must be between {min} and {max}, got {found}"),
            TooLarge { what, limit, found } => {
                write!(f, "{what} is {found}, the limit is {limit}")
            }
            Singular { determinant } => {
                write!(f, "The matrix is singular (det = {determinant})")
            }
            NoSignChange { fa, fb } => write!(
                f,
                "f(a) = {fa} and f(b) = {fb} have the same sign, no root is guaranteed"
            ),
            DerivativeNearZero { x, derivative } => {
                write!(f, "Derivative f'({x}) = {derivative} is too close to zero")
            }
            StagnantSecant { iteration } => write!(
                f,
                "Secant denominator vanished at iteration {iteration}"
            ),
            NonFiniteValue { x } => write!(f, "f({x}) is not a finite number"),
            NotConverged {
                iterations,
                estimate,
            } => write!(
                f,
                "No convergence after {iterations} iterations, best estimate {estimate}"
            ),
            Parse { position, message } => {
                write!(f, "Parse error at position {position}: {message}")
            }
        }
    }
}

impl std::error::Error for WorkbenchError {}

/// Result type for workbench operations
pub type Result<T> = core::result::Result<T, WorkbenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            WorkbenchError::NotSquare { rows: 2, cols: 3 }.category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            WorkbenchError::Singular { determinant: 0.0 }.category(),
            ErrorCategory::NumericPrecondition
        );
        assert_eq!(
            WorkbenchError::NotConverged {
                iterations: 5,
                estimate: 1.0
            }
            .category(),
            ErrorCategory::NonConvergence
        );
        assert_eq!(
            WorkbenchError::Parse {
                position: 0,
                message: "x".into()
            }
            .category(),
            ErrorCategory::Parse
        );
    }

    #[test]
    fn test_display_uses_one_based_positions() {
        let err = WorkbenchError::JaggedMatrix {
            row: 1,
            expected: 3,
            found: 2,
        };
        assert_eq!(err.to_string(), "Row 2 has 2 entries, expected 3");
        assert_eq!(err.code(), "jagged_matrix");
    }
}
