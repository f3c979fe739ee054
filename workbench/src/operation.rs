//! Operation dispatch
//!
//! [`Workbench`] turns wire requests into engine calls and folds the traced
//! outcome back into a response. [`Request`] is the closed set of operations
//! the service knows; each variant maps to exactly one evaluator and one
//! HTTP route.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;
use workbench_core::determinant::{
    determinant_traced, verify_multiplicative_traced, verify_properties_traced,
};
use workbench_core::numerical::{
    decompose_base10, decompose_base2, floating_point_demo, function_propagation,
    propagation_demo, roundoff_demo, truncation_demo,
};
use workbench_core::roots::{bisection, false_position, newton_raphson, secant};
use workbench_core::solver::solve_with;
use workbench_core::vector_space::{basis_traced, independence_traced, linear_combination_traced};
use workbench_core::{
    explain, DeterminantMethod, Expression, Matrix, MatrixOperation, RootOptions, RootSolution,
    Shaped, SolutionType, TracedResult, Vector, WorkbenchError,
};

use crate::api::*;
use crate::config::WorkbenchConfig;
use crate::error::{Result, ServiceError};

/// One operation, tagged by `kind` when sent on its own or in a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Request {
    MatrixOperate(MatrixOperationRequest),
    Determinant(DeterminantRequest),
    DeterminantProperties(PropertiesRequest),
    LinearSystem(LinearSystemRequest),
    Independence(VectorsRequest),
    Basis(BasisRequest),
    Combination(CombinationRequest),
    Bisection(BracketRequest),
    FalsePosition(BracketRequest),
    NewtonRaphson(NewtonRequest),
    Secant(SecantRequest),
    DecomposeBase10(DecompositionRequest),
    DecomposeBase2(DecompositionRequest),
    Roundoff(RoundoffRequest),
    Truncation(TruncationRequest),
    Propagation(PropagationRequest),
    FunctionPropagation(FunctionPropagationRequest),
    FloatingPoint,
}

impl Request {
    /// HTTP path serving this operation
    pub fn route(&self) -> &'static str {
        match self {
            Self::MatrixOperate(_) => "/matrix/operate",
            Self::Determinant(_) => "/determinants/calculate",
            Self::DeterminantProperties(_) => "/determinants/properties",
            Self::LinearSystem(_) => "/linear-systems/solve",
            Self::Independence(_) => "/vectors/independence",
            Self::Basis(_) => "/vectors/basis",
            Self::Combination(_) => "/vectors/combination",
            Self::Bisection(_) => "/numerical/bisection",
            Self::FalsePosition(_) => "/numerical/false-position",
            Self::NewtonRaphson(_) => "/numerical/newton-raphson",
            Self::Secant(_) => "/numerical/secant",
            Self::DecomposeBase10(_) => "/numerical/decompose/base10",
            Self::DecomposeBase2(_) => "/numerical/decompose/base2",
            Self::Roundoff(_) => "/numerical/errors/roundoff",
            Self::Truncation(_) => "/numerical/errors/truncation",
            Self::Propagation(_) => "/numerical/errors/propagation",
            Self::FunctionPropagation(_) => "/numerical/errors/function-propagation",
            Self::FloatingPoint => "/numerical/floating-point",
        }
    }

    /// Tag used in logs and on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MatrixOperate(_) => "matrix-operate",
            Self::Determinant(_) => "determinant",
            Self::DeterminantProperties(_) => "determinant-properties",
            Self::LinearSystem(_) => "linear-system",
            Self::Independence(_) => "independence",
            Self::Basis(_) => "basis",
            Self::Combination(_) => "combination",
            Self::Bisection(_) => "bisection",
            Self::FalsePosition(_) => "false-position",
            Self::NewtonRaphson(_) => "newton-raphson",
            Self::Secant(_) => "secant",
            Self::DecomposeBase10(_) => "decompose-base10",
            Self::DecomposeBase2(_) => "decompose-base2",
            Self::Roundoff(_) => "roundoff",
            Self::Truncation(_) => "truncation",
            Self::Propagation(_) => "propagation",
            Self::FunctionPropagation(_) => "function-propagation",
            Self::FloatingPoint => "floating-point",
        }
    }
}

/// Response to any [`Request`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Matrix(MatrixOperationResponse),
    Determinant(DeterminantResponse),
    Properties(PropertiesResponse),
    LinearSystem(LinearSystemResponse),
    Vectors(VectorsResponse),
    Numerical(NumericalResponse),
}

impl Response {
    pub fn steps(&self) -> &[String] {
        match self {
            Self::Matrix(r) => &r.steps,
            Self::Determinant(r) => &r.steps,
            Self::Properties(r) => &r.steps,
            Self::LinearSystem(r) => &r.steps,
            Self::Vectors(r) => &r.steps,
            Self::Numerical(r) => &r.steps,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Matrix(r) => r.error.as_deref(),
            Self::Determinant(r) => r.error.as_deref(),
            Self::Properties(r) => r.error.as_deref(),
            Self::LinearSystem(r) => r.error.as_deref(),
            Self::Vectors(r) => r.error.as_deref(),
            Self::Numerical(r) => r.error.as_deref(),
        }
    }
}

/// Value, steps and error message of a finished computation
struct Settled<T> {
    value: Option<T>,
    steps: Vec<String>,
    error: Option<String>,
}

impl<T> From<TracedResult<T>> for Settled<T> {
    fn from(outcome: TracedResult<T>) -> Self {
        match outcome {
            Ok(traced) => Self {
                value: Some(traced.value),
                steps: traced.steps,
                error: None,
            },
            Err(failure) => Self {
                value: None,
                steps: failure.steps,
                error: Some(failure.error.to_string()),
            },
        }
    }
}

/// Evaluates requests against a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct Workbench {
    config: WorkbenchConfig,
}

impl Workbench {
    pub fn new(config: WorkbenchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    /// Evaluate one request
    pub fn execute(&self, request: &Request) -> Response {
        let response = match request {
            Request::MatrixOperate(r) => Response::Matrix(self.matrix_operate(r)),
            Request::Determinant(r) => Response::Determinant(self.determinant(r)),
            Request::DeterminantProperties(r) => {
                Response::Properties(self.determinant_properties(r))
            }
            Request::LinearSystem(r) => Response::LinearSystem(self.linear_system(r)),
            Request::Independence(r) => Response::Vectors(self.independence(r)),
            Request::Basis(r) => Response::Vectors(self.basis(r)),
            Request::Combination(r) => Response::Vectors(self.combination(r)),
            Request::Bisection(r) => Response::Numerical(self.bisection(r)),
            Request::FalsePosition(r) => Response::Numerical(self.false_position(r)),
            Request::NewtonRaphson(r) => Response::Numerical(self.newton_raphson(r)),
            Request::Secant(r) => Response::Numerical(self.secant(r)),
            Request::DecomposeBase10(r) => Response::Numerical(self.decompose_base10(r)),
            Request::DecomposeBase2(r) => Response::Numerical(self.decompose_base2(r)),
            Request::Roundoff(r) => Response::Numerical(self.roundoff(r)),
            Request::Truncation(r) => Response::Numerical(self.truncation(r)),
            Request::Propagation(r) => Response::Numerical(self.propagation(r)),
            Request::FunctionPropagation(r) => {
                Response::Numerical(self.function_propagation(r))
            }
            Request::FloatingPoint => Response::Numerical(self.floating_point()),
        };
        debug!(
            kind = request.kind(),
            steps = response.steps().len(),
            error = response.error().unwrap_or("none"),
            "operation evaluated"
        );
        response
    }

    /// Evaluate independent requests in parallel, preserving order
    pub fn execute_batch(&self, requests: &[Request]) -> Result<Vec<Response>> {
        if requests.len() > self.config.max_batch_size {
            return Err(ServiceError::BatchTooLarge {
                limit: self.config.max_batch_size,
                found: requests.len(),
            });
        }
        Ok(requests.par_iter().map(|r| self.execute(r)).collect())
    }

    pub fn matrix_operate(&self, request: &MatrixOperationRequest) -> MatrixOperationResponse {
        let settled = Settled::from(explain(|steps| {
            let a = self.matrix(&request.a.data)?;
            let b = request.b.as_ref().map(|b| self.matrix(&b.data)).transpose()?;
            MatrixOperation::from_parts(request.operation, b, request.scalar)?.apply(&a, steps)
        }));
        MatrixOperationResponse {
            result: settled.value,
            steps: settled.steps,
            error: settled.error,
        }
    }

    pub fn determinant(&self, request: &DeterminantRequest) -> DeterminantResponse {
        let settled = Settled::from(explain(|steps| {
            let matrix = self.matrix(&request.matrix)?;
            if request.method == DeterminantMethod::Cofactors
                && matrix.nrows() > self.config.max_cofactor_dimension
            {
                return Err(WorkbenchError::TooLarge {
                    what: "matrix size for cofactor expansion",
                    limit: self.config.max_cofactor_dimension,
                    found: matrix.nrows(),
                });
            }
            determinant_traced(&matrix, request.method, steps)
        }));
        DeterminantResponse {
            determinant: settled.value,
            steps: settled.steps,
            error: settled.error,
        }
    }

    pub fn determinant_properties(&self, request: &PropertiesRequest) -> PropertiesResponse {
        let settled = Settled::from(explain(|steps| {
            let matrix = self.matrix(&request.matrix)?;
            let b = request.b.as_deref().map(|b| self.matrix(b)).transpose()?;
            let mut checks = verify_properties_traced(&matrix, steps)?;
            if let Some(b) = &b {
                checks.push(verify_multiplicative_traced(&matrix, b, steps)?);
            }
            Ok(checks)
        }));
        PropertiesResponse {
            checks: settled.value.unwrap_or_default(),
            steps: settled.steps,
            error: settled.error,
        }
    }

    pub fn linear_system(&self, request: &LinearSystemRequest) -> LinearSystemResponse {
        let settled = Settled::from(explain(|steps| {
            let augmented = self.matrix(&request.augmented)?;
            solve_with(&augmented, request.method, steps)
        }));
        let (solution_type, solution) = match settled.value {
            Some(s) => (Some(s.solution_type), s.solution),
            None => (None, None),
        };
        LinearSystemResponse {
            solution_type,
            solution,
            steps: settled.steps,
            error: settled.error,
        }
    }

    pub fn independence(&self, request: &VectorsRequest) -> VectorsResponse {
        let settled = Settled::from(explain(|steps| {
            let vectors = self.vectors(&request.vectors)?;
            independence_traced(&vectors, steps)
        }));
        let independent = settled.value.map(|i| i.independent);
        VectorsResponse {
            solution_type: independent.map(homogeneous_type),
            independent,
            steps: settled.steps,
            error: settled.error,
            ..VectorsResponse::default()
        }
    }

    pub fn basis(&self, request: &BasisRequest) -> VectorsResponse {
        let settled = Settled::from(explain(|steps| {
            let vectors = self.vectors(&request.vectors)?;
            basis_traced(&vectors, request.dimension, steps)
        }));
        let (solution_type, basis) = match settled.value {
            Some(check) => {
                // No reduction ran when the cardinality was wrong
                let independent = check.rank.map(|rank| rank == request.vectors.len());
                (independent.map(homogeneous_type), Some(check.basis))
            }
            None => (None, None),
        };
        VectorsResponse {
            solution_type,
            basis,
            steps: settled.steps,
            error: settled.error,
            ..VectorsResponse::default()
        }
    }

    pub fn combination(&self, request: &CombinationRequest) -> VectorsResponse {
        let settled = Settled::from(explain(|steps| {
            let vectors = self.vectors(&request.vectors)?;
            let target = Vector::new(request.target.clone())?;
            linear_combination_traced(&vectors, &target, steps)
        }));
        let (solution_type, in_span, solution) = match settled.value {
            Some(c) => (Some(c.solution_type), Some(c.in_span), c.coefficients),
            None => (None, None, None),
        };
        VectorsResponse {
            solution_type,
            in_span,
            solution,
            steps: settled.steps,
            error: settled.error,
            ..VectorsResponse::default()
        }
    }

    pub fn bisection(&self, request: &BracketRequest) -> NumericalResponse {
        self.find_root(&request.expr, request.tol, request.max_iter, |f, options, steps| {
            bisection(f, request.a, request.b, options, steps)
        })
    }

    pub fn false_position(&self, request: &BracketRequest) -> NumericalResponse {
        self.find_root(&request.expr, request.tol, request.max_iter, |f, options, steps| {
            false_position(f, request.a, request.b, options, steps)
        })
    }

    pub fn newton_raphson(&self, request: &NewtonRequest) -> NumericalResponse {
        self.find_root(&request.expr, request.tol, request.max_iter, |f, options, steps| {
            newton_raphson(f, request.x0, options, steps)
        })
    }

    pub fn secant(&self, request: &SecantRequest) -> NumericalResponse {
        self.find_root(&request.expr, request.tol, request.max_iter, |f, options, steps| {
            secant(f, request.x0, request.x1, options, steps)
        })
    }

    pub fn decompose_base10(&self, request: &DecompositionRequest) -> NumericalResponse {
        Settled::from(explain(|steps| decompose_base10(&request.value, steps)))
            .numerical(|v| *v as f64, |_| None)
    }

    pub fn decompose_base2(&self, request: &DecompositionRequest) -> NumericalResponse {
        Settled::from(explain(|steps| decompose_base2(&request.value, steps)))
            .numerical(|v| *v as f64, |_| None)
    }

    pub fn roundoff(&self, request: &RoundoffRequest) -> NumericalResponse {
        Settled::from(explain(|steps| roundoff_demo(request.value, request.n, steps))).numerical(
            |r| r.sum,
            |r| {
                Some(vec![
                    r.sum,
                    r.expected,
                    r.error,
                    f64::from(r.single_precision_sum),
                ])
            },
        )
    }

    pub fn truncation(&self, request: &TruncationRequest) -> NumericalResponse {
        Settled::from(explain(|steps| {
            truncation_demo(request.x, request.max_terms, steps)
        }))
        .numerical(
            |t| t.approximation,
            |t| Some(vec![t.approximation, t.exact, t.absolute_error, t.relative_error]),
        )
    }

    pub fn propagation(&self, request: &PropagationRequest) -> NumericalResponse {
        Settled::from(explain(|steps| propagation_demo(request.a, request.b, steps))).numerical(
            |p| p.sum,
            |p| {
                let mut values = vec![p.sum, p.subtraction_residual];
                values.extend(p.division_residual);
                Some(values)
            },
        )
    }

    pub fn function_propagation(&self, request: &FunctionPropagationRequest) -> NumericalResponse {
        let settled = Settled::from(explain(|steps| {
            function_propagation(request.true_value, request.approx_value, steps)
        }));
        let diagnosis = settled.value.map(|p| p.diagnosis);
        let mut response = settled.numerical(
            |p| p.relative_output_error,
            |p| {
                Some(vec![
                    p.absolute_input_error,
                    p.relative_input_error,
                    p.absolute_output_error,
                    p.relative_output_error,
                ])
            },
        );
        response.diagnosis = diagnosis;
        response
    }

    pub fn floating_point(&self) -> NumericalResponse {
        let mut steps = Vec::new();
        let value = floating_point_demo(&mut steps);
        NumericalResponse {
            value: Some(value),
            steps,
            ..NumericalResponse::default()
        }
    }

    fn find_root<F>(
        &self,
        source: &str,
        tol: Option<f64>,
        max_iter: Option<usize>,
        method: F,
    ) -> NumericalResponse
    where
        F: FnOnce(&Expression, &RootOptions, &mut Vec<String>) -> workbench_core::Result<RootSolution>,
    {
        let settled = Settled::from(explain(|steps| {
            let options = self.root_options(tol, max_iter)?;
            let f = Expression::parse(source)?;
            method(&f, &options, steps)
        }));
        match settled.value {
            Some(solution) => NumericalResponse {
                value: Some(solution.root),
                converged: Some(solution.converged),
                iterations: Some(solution.iterations),
                error: solution.convergence_error().map(|e| e.to_string()),
                steps: settled.steps,
                ..NumericalResponse::default()
            },
            None => NumericalResponse {
                converged: Some(false),
                steps: settled.steps,
                error: settled.error,
                ..NumericalResponse::default()
            },
        }
    }

    fn root_options(
        &self,
        tol: Option<f64>,
        max_iter: Option<usize>,
    ) -> workbench_core::Result<RootOptions> {
        let defaults = self.config.root_defaults();
        let max_iterations = max_iter.unwrap_or(defaults.max_iterations);
        if max_iterations > self.config.max_iterations_cap {
            return Err(WorkbenchError::TooLarge {
                what: "max_iter",
                limit: self.config.max_iterations_cap,
                found: max_iterations,
            });
        }
        Ok(defaults
            .with_tolerance(tol.unwrap_or(defaults.tolerance))
            .with_max_iterations(max_iterations))
    }

    /// Validate wire rows into a matrix within the configured size
    fn matrix(&self, rows: &[Vec<f64>]) -> workbench_core::Result<Matrix> {
        let matrix = Matrix::new(rows.to_vec())?;
        let (rows, cols) = matrix.dimensions();
        let largest = rows.max(cols);
        if largest > self.config.max_matrix_dimension {
            return Err(WorkbenchError::TooLarge {
                what: "matrix dimension",
                limit: self.config.max_matrix_dimension,
                found: largest,
            });
        }
        Ok(matrix)
    }

    /// Validate wire components into vectors within the configured size
    fn vectors(&self, components: &[Vec<f64>]) -> workbench_core::Result<Vec<Vector>> {
        let limit = self.config.max_matrix_dimension;
        let vectors = components
            .iter()
            .map(|c| Vector::new(c.clone()))
            .collect::<workbench_core::Result<Vec<_>>>()?;
        let largest = vectors
            .iter()
            .map(Vector::dimension)
            .chain(std::iter::once(vectors.len()))
            .max()
            .unwrap_or(0);
        if largest > limit {
            return Err(WorkbenchError::TooLarge {
                what: "vector set size",
                limit,
                found: largest,
            });
        }
        Ok(vectors)
    }
}

impl<T> Settled<T> {
    /// Headline number in `value`, supporting figures in `values`
    fn numerical(
        self,
        headline: impl FnOnce(&T) -> f64,
        figures: impl FnOnce(&T) -> Option<Vec<f64>>,
    ) -> NumericalResponse {
        NumericalResponse {
            value: self.value.as_ref().map(headline),
            values: self.value.as_ref().and_then(figures),
            steps: self.steps,
            error: self.error,
            ..NumericalResponse::default()
        }
    }
}

/// Solution type of `c1 v1 + … + ck vk = 0`
fn homogeneous_type(independent: bool) -> SolutionType {
    if independent {
        SolutionType::Unique
    } else {
        SolutionType::Infinite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn matrix(rows: Vec<Vec<f64>>) -> Matrix {
        Matrix::new(rows).unwrap()
    }

    #[test]
    fn test_missing_operand_has_no_steps() {
        let bench = Workbench::default();
        let response = bench.matrix_operate(&MatrixOperationRequest {
            operation: workbench_core::MatrixOperationKind::Multiply,
            a: matrix(vec![vec![1.0, 2.0]]).into(),
            b: None,
            scalar: None,
        });
        assert!(response.result.is_none());
        assert!(response.steps.is_empty());
        assert_eq!(response.error.as_deref(), Some("Missing operand: matrix B"));
    }

    #[test]
    fn test_singular_inverse_keeps_partial_steps() {
        let bench = Workbench::default();
        let response = bench.matrix_operate(&MatrixOperationRequest {
            operation: workbench_core::MatrixOperationKind::Inverse,
            a: matrix(vec![vec![1.0, 2.0], vec![2.0, 4.0]]).into(),
            b: None,
            scalar: None,
        });
        assert!(response.result.is_none());
        assert!(!response.steps.is_empty());
        assert!(response.error.unwrap().contains("singular"));
    }

    #[test]
    fn test_bad_shapes_become_response_errors() {
        let bench = Workbench::default();
        let jagged = bench.determinant(&DeterminantRequest {
            matrix: vec![vec![1.0, 2.0], vec![3.0]],
            method: DeterminantMethod::Cofactors,
        });
        assert!(jagged.determinant.is_none());
        assert!(jagged.steps.is_empty());
        assert!(jagged.error.is_some());

        let empty = bench.linear_system(&LinearSystemRequest {
            augmented: Vec::new(),
            method: Default::default(),
        });
        assert!(empty.solution_type.is_none());
        assert!(empty.error.is_some());

        let target = bench.combination(&CombinationRequest {
            vectors: vec![vec![1.0, 0.0]],
            target: Vec::new(),
        });
        assert!(target.in_span.is_none());
        assert!(target.error.is_some());
    }

    #[test]
    fn test_cofactor_limit() {
        let bench = Workbench::new(WorkbenchConfig::default().with_max_cofactor_dimension(2));
        let big = matrix(vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 2.0, 0.0],
            vec![0.0, 0.0, 3.0],
        ]);
        let refused = bench.determinant(&DeterminantRequest {
            matrix: big.clone().into_rows(),
            method: DeterminantMethod::Cofactors,
        });
        assert!(refused.determinant.is_none());
        assert!(refused.error.is_some());

        let sarrus = bench.determinant(&DeterminantRequest {
            matrix: big.into_rows(),
            method: DeterminantMethod::Sarrus,
        });
        assert_relative_eq!(sarrus.determinant.unwrap(), 6.0);
    }

    #[test]
    fn test_root_not_converged_reports_estimate() {
        let bench = Workbench::default();
        let response = bench.bisection(&BracketRequest {
            expr: "x^3 - x - 2".into(),
            a: 1.0,
            b: 2.0,
            tol: Some(1e-12),
            max_iter: Some(3),
        });
        assert_eq!(response.converged, Some(false));
        assert_eq!(response.iterations, Some(3));
        assert!(response.value.is_some());
        assert!(response.error.is_some());
        assert!(!response.steps.is_empty());
    }

    #[test]
    fn test_iteration_cap() {
        let bench = Workbench::new(WorkbenchConfig::default().with_max_iterations_cap(10));
        let response = bench.newton_raphson(&NewtonRequest {
            expr: "x^2 - 2".into(),
            x0: 1.0,
            tol: None,
            max_iter: Some(11),
        });
        assert!(response.value.is_none());
        assert!(response.steps.is_empty());
        assert!(response.error.is_some());
    }

    #[test]
    fn test_batch_limit_and_order() {
        let bench = Workbench::new(WorkbenchConfig::default().with_max_batch_size(2));
        let requests = vec![
            Request::FloatingPoint,
            Request::DecomposeBase2(DecompositionRequest {
                value: "1111001".into(),
            }),
        ];
        let responses = bench.execute_batch(&requests).unwrap();
        match &responses[1] {
            Response::Numerical(r) => assert_eq!(r.value, Some(121.0)),
            other => panic!("unexpected response {other:?}"),
        }

        let too_many = vec![Request::FloatingPoint; 3];
        assert!(matches!(
            bench.execute_batch(&too_many),
            Err(ServiceError::BatchTooLarge { limit: 2, found: 3 })
        ));
    }

    #[test]
    fn test_request_tags() {
        let request: Request = serde_json::from_value(serde_json::json!({
            "kind": "newton-raphson",
            "expr": "cos(x) - x",
            "x0": 1.0
        }))
        .unwrap();
        assert_eq!(request.route(), "/numerical/newton-raphson");
        assert_eq!(request.kind(), "newton-raphson");

        let round_trip = serde_json::to_value(&request).unwrap();
        assert_eq!(round_trip["kind"], "newton-raphson");
    }
}
