//! Matrix kernel: arithmetic, inversion and row reduction
//!
//! Every operation exists in a `_traced` form that writes its derivation to
//! a [`StepSink`](crate::traits::StepSink) and a plain form that computes
//! silently. [`MatrixOperation`] is the closed set of operations a caller
//! can request on one or two matrices.

pub mod arithmetic;
pub mod elimination;
pub mod inverse;

pub use arithmetic::{add, multiply, scalar_multiply, subtract, transpose};
pub use elimination::{rank, row_echelon, Elimination, EliminationSummary, RowEchelon};
pub use inverse::inverse;

use crate::error::{Result, WorkbenchError};
use crate::traits::StepSink;
use crate::types::Matrix;

/// Names of the matrix operations, as they appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum MatrixOperationKind {
    Add,
    Subtract,
    Multiply,
    Scalar,
    Transpose,
    Inverse,
}

/// A matrix operation and the operands it needs beyond `A`
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixOperation {
    Add(Matrix),
    Subtract(Matrix),
    Multiply(Matrix),
    Scalar(f64),
    Transpose,
    Inverse,
}

impl MatrixOperation {
    /// Pair an operation name with its operands
    pub fn from_parts(
        kind: MatrixOperationKind,
        b: Option<Matrix>,
        scalar: Option<f64>,
    ) -> Result<Self> {
        use MatrixOperationKind as Kind;
        let missing_b = WorkbenchError::MissingOperand("matrix B");
        match kind {
            Kind::Add => b.map(Self::Add).ok_or(missing_b),
            Kind::Subtract => b.map(Self::Subtract).ok_or(missing_b),
            Kind::Multiply => b.map(Self::Multiply).ok_or(missing_b),
            Kind::Scalar => scalar
                .map(Self::Scalar)
                .ok_or(WorkbenchError::MissingOperand("scalar")),
            Kind::Transpose => Ok(Self::Transpose),
            Kind::Inverse => Ok(Self::Inverse),
        }
    }

    /// Wire name of the operation
    pub fn kind(&self) -> MatrixOperationKind {
        match self {
            Self::Add(_) => MatrixOperationKind::Add,
            Self::Subtract(_) => MatrixOperationKind::Subtract,
            Self::Multiply(_) => MatrixOperationKind::Multiply,
            Self::Scalar(_) => MatrixOperationKind::Scalar,
            Self::Transpose => MatrixOperationKind::Transpose,
            Self::Inverse => MatrixOperationKind::Inverse,
        }
    }

    /// Apply the operation to `a`, tracing into `sink`
    pub fn apply<S: StepSink>(&self, a: &Matrix, sink: &mut S) -> Result<Matrix> {
        match self {
            Self::Add(b) => arithmetic::add_traced(a, b, sink),
            Self::Subtract(b) => arithmetic::subtract_traced(a, b, sink),
            Self::Multiply(b) => arithmetic::multiply_traced(a, b, sink),
            Self::Scalar(k) => Ok(arithmetic::scalar_multiply_traced(a, *k, sink)),
            Self::Transpose => Ok(arithmetic::transpose_traced(a, sink)),
            Self::Inverse => inverse::inverse_traced(a, sink),
        }
    }
}
