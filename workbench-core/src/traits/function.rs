//! Real-valued functions of one variable, as consumed by the root finders

use crate::error::Result;

/// A scalar function f(x) that can fail to evaluate
pub trait ScalarFunction {
    /// Evaluate f at `x`
    ///
    /// Implementations return an error instead of NaN or infinity.
    fn evaluate(&self, x: f64) -> Result<f64>;

    /// Human-readable form used in trace headers
    fn label(&self) -> String;
}
