//! Wire types for the JSON API
//!
//! Field names follow what the web client sends and reads. Every response
//! carries the derivation `steps` and an `error` string that is `null` on
//! success.
//!
//! Requests carry matrices and vectors as plain nested arrays. Shape checks
//! run in the [`Workbench`](crate::Workbench), so a jagged or empty operand
//! comes back as a response `error` rather than a framework rejection.

use serde::{Deserialize, Serialize};
use workbench_core::determinant::PropertyCheck;
use workbench_core::numerical::Diagnosis;
use workbench_core::{DeterminantMethod, Matrix, MatrixOperationKind, SolutionType, SolveMethod};

/// Matrix rows as sent on the wire, not yet validated
pub type Rows = Vec<Vec<f64>>;

/// Vector components as sent on the wire, not yet validated
pub type Components = Vec<f64>;

/// A matrix wrapped the way `/matrix/operate` expects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixPayload {
    pub data: Rows,
}

impl From<Matrix> for MatrixPayload {
    fn from(matrix: Matrix) -> Self {
        Self {
            data: matrix.into_rows(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixOperationRequest {
    pub operation: MatrixOperationKind,
    pub a: MatrixPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<MatrixPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalar: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixOperationResponse {
    pub result: Option<Matrix>,
    pub steps: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeterminantRequest {
    pub matrix: Rows,
    #[serde(default)]
    pub method: DeterminantMethod,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeterminantResponse {
    pub determinant: Option<f64>,
    pub steps: Vec<String>,
    pub error: Option<String>,
}

/// Property checks on `matrix`, plus `det(AB) = det(A)·det(B)` when `b` is given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertiesRequest {
    pub matrix: Rows,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<Rows>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertiesResponse {
    #[serde(default)]
    pub checks: Vec<PropertyCheck>,
    pub steps: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSystemRequest {
    pub augmented: Rows,
    #[serde(default)]
    pub method: SolveMethod,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearSystemResponse {
    pub solution_type: Option<SolutionType>,
    pub solution: Option<Vec<f64>>,
    pub steps: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorsRequest {
    pub vectors: Vec<Components>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasisRequest {
    pub vectors: Vec<Components>,
    /// Dimension of the space; defaults to the length of the vectors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationRequest {
    pub vectors: Vec<Components>,
    pub target: Components,
}

/// Response shared by the vector-space routes
///
/// `solution_type` describes the homogeneous (or, for combinations, the
/// target) system: `unique` for independent vectors, `infinite` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorsResponse {
    pub solution_type: Option<SolutionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub independent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basis: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_span: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<Vec<f64>>,
    pub steps: Vec<String>,
    pub error: Option<String>,
}

/// Bisection and false position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketRequest {
    pub expr: String,
    pub a: f64,
    pub b: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tol: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iter: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewtonRequest {
    pub expr: String,
    pub x0: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tol: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iter: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecantRequest {
    pub expr: String,
    pub x0: f64,
    pub x1: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tol: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iter: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionRequest {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundoffRequest {
    pub value: f64,
    pub n: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruncationRequest {
    pub x: f64,
    pub max_terms: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationRequest {
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionPropagationRequest {
    pub true_value: f64,
    pub approx_value: f64,
}

/// Response shared by the numerical routes
///
/// Root finders fill `value`, `converged` and `iterations`. The error demos
/// put their headline number in `value` and the supporting figures in
/// `values`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericalResponse {
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<Diagnosis>,
    pub steps: Vec<String>,
    pub error: Option<String>,
}
