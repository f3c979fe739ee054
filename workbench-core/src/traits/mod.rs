//! Abstract interfaces shared across the engine
//!
//! Traits here are the seams between the numeric kernels and their callers:
//! where derivation lines go, how operands report their shape, and what a
//! root finder can evaluate.

pub mod function;
pub mod shape;
pub mod sink;

pub use function::ScalarFunction;
pub use shape::Shaped;
pub use sink::{Silent, StepSink};
