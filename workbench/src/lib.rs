//! Workbench - HTTP service for the Linear Workbench engine
//!
//! This crate puts the `workbench-core` engine behind the JSON API the web
//! client talks to, and ships a CLI to serve it, run requests locally or
//! forward them to a remote server.
//!
//! ## Architecture
//!
//! The workspace follows a specification/implementation separation:
//!
//! - **workbench-core**: Pure numeric engine, traits and validation (no I/O)
//! - **workbench**: Wire types, dispatch, server, client, configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use workbench::{Request, Workbench, WorkbenchConfig};
//!
//! fn example() -> Result<(), serde_json::Error> {
//!     let workbench = Workbench::new(WorkbenchConfig::default());
//!     let request: Request = serde_json::from_str(
//!         r#"{"kind": "linear-system", "augmented": [[2, 1, -1, 8], [-3, -1, 2, -11], [-2, 1, 2, -3]]}"#,
//!     )?;
//!
//!     let response = workbench.execute(&request);
//!     println!("{}", serde_json::to_string_pretty(&response)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **server**: axum HTTP server with permissive CORS
//! - **http**: reqwest client for a remote server
//! - **Batches**: independent requests evaluated in parallel with rayon
//! - **Sessions**: `A`-`E` variable slots bound into requests

pub use workbench_core::{
    DeterminantMethod, Matrix, MatrixOperationKind, SolutionType, SolveMethod, Vector,
    WorkbenchError,
};

pub mod api;
pub mod config;
pub mod error;
pub mod http_client;
pub mod logging;
pub mod operation;
pub mod server;
pub mod session;

pub use config::WorkbenchConfig;
pub use error::{Result, ServiceError};
pub use http_client::HttpWorkbench;
pub use operation::{Request, Response, Workbench};
pub use session::{Document, Script, Session, Slot, SlotCall, Variable};
