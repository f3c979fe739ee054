//! Workbench Core - Numeric Engine for the Linear Workbench
//!
//! This crate holds every algorithm the workbench exposes: matrix
//! arithmetic, determinants, linear systems, vector-space tests, root
//! finding and numerical-error demonstrations. It performs no I/O and keeps
//! no state between calls.
//!
//! Each operation explains itself through a [`StepSink`]. Use
//! [`trace::explain`] to collect the derivation next to the result:
//!
//! ```
//! use workbench_core::{kernel, trace, Matrix};
//!
//! let a = Matrix::new(vec![vec![4.0, 7.0], vec![2.0, 6.0]]).unwrap();
//! let traced = trace::explain(|steps| kernel::inverse::inverse_traced(&a, steps)).unwrap();
//! assert!(traced.steps.iter().any(|s| s.starts_with("det(A) = ")));
//! ```

pub mod constants;
pub mod determinant;
pub mod error;
pub mod expr;
pub mod kernel;
pub mod numerical;
pub mod roots;
pub mod solver;
pub mod trace;
pub mod traits;
pub mod types;
pub mod validation;
pub mod vector_space;

pub use determinant::DeterminantMethod;
pub use error::{ErrorCategory, Result, WorkbenchError};
pub use expr::Expression;
pub use kernel::{MatrixOperation, MatrixOperationKind};
pub use roots::{RootMethod, RootOptions, RootSolution};
pub use solver::{SolutionType, SolveMethod, SystemSolution};
pub use trace::{explain, Traced, TracedError, TracedResult};
pub use traits::*;
pub use types::{Matrix, Vector};
