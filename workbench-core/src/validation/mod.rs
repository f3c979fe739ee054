//! Input validation for engine operations
//!
//! Pure checks that run before any computation starts. Every failure here is
//! a validation error, so callers report it without a trace.

pub mod arguments;
pub mod digits;
pub mod shape;

pub use arguments::{require_finite, require_positive, require_range, require_tolerance};
pub use digits::parse_digits;
pub use shape::{require_conformable, require_same_shape, require_square, require_vector_set};
