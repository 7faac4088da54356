//! Error types for the solver.
//!
//! Contract violations inside the core (e.g. `choose` with `k > n`) panic.
//! Everything a caller can get wrong at runtime surfaces as [`CoinflipError`].

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum CoinflipError {
    #[error("invalid game parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown truncation mode '{0}' (expected 'square' or 'triangular')")]
    UnknownMode(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error on {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed sweep file {}, line {line}: {reason}", path.display())]
    MalformedSweep {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl CoinflipError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a serde_json error with the path it happened on.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for the solver.
pub type Result<T> = std::result::Result<T, CoinflipError>;
