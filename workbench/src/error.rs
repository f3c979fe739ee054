//! Service-level errors
//!
//! Engine failures never show up here: they are folded into the `error`
//! field of a response. These are the failures of the service itself.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to read config file {path}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("environment variable {name} has invalid value {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("batch of {found} requests exceeds the limit of {limit}")]
    BatchTooLarge { limit: usize, found: usize },

    #[error("failed to bind {address}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "http")]
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
