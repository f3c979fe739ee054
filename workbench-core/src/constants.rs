//! Numeric tolerances and hard limits shared by every engine component

/// Smallest absolute value accepted as a pivot during elimination, and the
/// threshold below which an entry counts as zero when classifying systems
pub const PIVOT_EPSILON: f64 = 1e-10;

/// Determinants with a smaller magnitude are treated as singular
pub const SINGULAR_EPSILON: f64 = 1e-12;

/// Secant iterations stop when successive function values differ by less
pub const STAGNATION_EPSILON: f64 = 1e-15;

/// Relative step for the central-difference derivative used by Newton-Raphson
pub const DERIVATIVE_STEP: f64 = 1e-6;

/// Default convergence tolerance for root finders
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Default iteration budget for root finders
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// Maximum depth of a parsed function expression, counting both nesting and
/// operator chains
pub const MAX_EXPRESSION_DEPTH: usize = 64;

/// Longest function expression accepted, in characters
pub const MAX_EXPRESSION_LENGTH: usize = 1024;

/// Round-off demo accepts between 1 and this many additions
pub const MAX_ROUNDOFF_ITERATIONS: usize = 100;

/// Truncation demo accepts between 1 and this many Taylor terms
pub const MAX_TAYLOR_TERMS: usize = 50;

/// Decimal places used when rendering matrices in a trace
pub const MATRIX_DECIMALS: usize = 4;

/// Magnitudes below this are treated as zero when forming relative errors
pub const RELATIVE_ERROR_FLOOR: f64 = 1e-12;
