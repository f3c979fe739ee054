//! Range checks for scalar arguments

use crate::error::{Result, WorkbenchError};

/// `value` must lie in `min..=max`
pub fn require_range(name: &'static str, value: usize, min: usize, max: usize) -> Result<usize> {
    if value < min || value > max {
        return Err(WorkbenchError::OutOfRange {
            name,
            min: min as f64,
            max: max as f64,
            found: value as f64,
        });
    }
    Ok(value)
}

/// `value` must be finite and strictly positive
pub fn require_positive(name: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(WorkbenchError::OutOfRange {
            name,
            min: 0.0,
            max: f64::MAX,
            found: value,
        });
    }
    Ok(value)
}

/// Convergence tolerance must be positive and finite
pub fn require_tolerance(tolerance: f64) -> Result<f64> {
    require_positive("tolerance", tolerance)
}

/// Every argument must be a finite number
pub fn require_finite(name: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(WorkbenchError::OutOfRange {
            name,
            min: f64::MIN,
            max: f64::MAX,
            found: value,
        });
    }
    Ok(value)
}
