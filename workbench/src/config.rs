//! Service configuration
//!
//! Values are layered: defaults, then an optional TOML file, then
//! `WORKBENCH_*` environment variables, then command-line flags (applied by
//! the binary through the `with_*` builders).

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use workbench_core::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use workbench_core::RootOptions;

use crate::error::{Result, ServiceError};

/// Configuration for the workbench service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkbenchConfig {
    /// Address the server binds to
    pub host: String,
    pub port: u16,
    /// Root-finder tolerance when a request omits `tol`
    pub default_tolerance: f64,
    /// Root-finder iteration budget when a request omits `max_iter`
    pub default_max_iterations: usize,
    /// Largest row or column count accepted in any matrix operand
    pub max_matrix_dimension: usize,
    /// Largest matrix for which cofactor expansion is attempted
    pub max_cofactor_dimension: usize,
    /// Upper bound on a requested `max_iter`
    pub max_iterations_cap: usize,
    /// Largest number of requests in one batch
    pub max_batch_size: usize,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            default_tolerance: DEFAULT_TOLERANCE,
            default_max_iterations: DEFAULT_MAX_ITERATIONS,
            max_matrix_dimension: 64,
            max_cofactor_dimension: 8,
            max_iterations_cap: 10_000,
            max_batch_size: 256,
        }
    }
}

impl WorkbenchConfig {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_default_tolerance(mut self, tolerance: f64) -> Self {
        self.default_tolerance = tolerance;
        self
    }

    pub fn with_default_max_iterations(mut self, iterations: usize) -> Self {
        self.default_max_iterations = iterations;
        self
    }

    pub fn with_max_matrix_dimension(mut self, dimension: usize) -> Self {
        self.max_matrix_dimension = dimension;
        self
    }

    pub fn with_max_cofactor_dimension(mut self, dimension: usize) -> Self {
        self.max_cofactor_dimension = dimension;
        self
    }

    pub fn with_max_iterations_cap(mut self, cap: usize) -> Self {
        self.max_iterations_cap = cap;
        self
    }

    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size;
        self
    }

    /// `host:port` for binding
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Root-finder options used when a request leaves them out
    pub fn root_defaults(&self) -> RootOptions {
        RootOptions::default()
            .with_tolerance(self.default_tolerance)
            .with_max_iterations(self.default_max_iterations)
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ServiceError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source).map_err(|source| ServiceError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `WORKBENCH_*` overrides from the process environment
    pub fn apply_env(self) -> Result<Self> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Apply `WORKBENCH_*` overrides from an arbitrary lookup
    pub fn apply_env_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("WORKBENCH_HOST") {
            self.host = host;
        }
        override_with(&lookup, "WORKBENCH_PORT", &mut self.port)?;
        override_with(&lookup, "WORKBENCH_TOLERANCE", &mut self.default_tolerance)?;
        override_with(
            &lookup,
            "WORKBENCH_MAX_ITERATIONS",
            &mut self.default_max_iterations,
        )?;
        override_with(
            &lookup,
            "WORKBENCH_MAX_MATRIX_DIMENSION",
            &mut self.max_matrix_dimension,
        )?;
        override_with(
            &lookup,
            "WORKBENCH_MAX_COFACTOR_DIMENSION",
            &mut self.max_cofactor_dimension,
        )?;
        override_with(
            &lookup,
            "WORKBENCH_MAX_ITERATIONS_CAP",
            &mut self.max_iterations_cap,
        )?;
        override_with(&lookup, "WORKBENCH_MAX_BATCH_SIZE", &mut self.max_batch_size)?;
        Ok(self)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.default_tolerance.is_finite() && self.default_tolerance > 0.0) {
            return Err(ServiceError::InvalidConfig(format!(
                "default_tolerance must be positive, got {}",
                self.default_tolerance
            )));
        }
        let positive = [
            ("default_max_iterations", self.default_max_iterations),
            ("max_matrix_dimension", self.max_matrix_dimension),
            ("max_cofactor_dimension", self.max_cofactor_dimension),
            ("max_iterations_cap", self.max_iterations_cap),
            ("max_batch_size", self.max_batch_size),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ServiceError::InvalidConfig(format!("{name} must be at least 1")));
        }
        if self.default_max_iterations > self.max_iterations_cap {
            return Err(ServiceError::InvalidConfig(format!(
                "default_max_iterations ({}) exceeds max_iterations_cap ({})",
                self.default_max_iterations, self.max_iterations_cap
            )));
        }
        Ok(())
    }
}

fn override_with<F, T>(lookup: &F, name: &'static str, target: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(value) = lookup(name) {
        *target = value
            .trim()
            .parse()
            .map_err(|_| ServiceError::InvalidEnv { name, value })?;
    }
    Ok(())
}
