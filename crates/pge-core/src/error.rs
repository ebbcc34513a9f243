//! Error types for PGE Core
//!
//! Provides error handling for:
//! - Missing or invalid configuration (fatal, surfaced immediately)
//! - Specification building and notebook inspection
//! - Settings and template handling
//! - Notebook execution

use pge_notebook::{EngineError, NotebookError};
use pge_spec::SpecError;
use std::path::PathBuf;

/// Main PGE error type
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Missing or invalid user-supplied input
    #[error("configuration error: {0}")]
    Config(String),

    /// Document building failed
    #[error("specification error: {0}")]
    Spec(#[from] SpecError),

    /// Notebook could not be read or inspected
    #[error("notebook error: {0}")]
    Notebook(#[from] NotebookError),

    /// Notebook run failed
    #[error("execution error: {0}")]
    Engine(#[from] EngineError),

    /// settings.yml unreadable
    #[error("invalid settings {path}: {source}")]
    Settings {
        /// Settings file
        path: PathBuf,
        /// YAML decode error
        #[source]
        source: serde_yaml::Error,
    },

    /// `_context.json` unreadable
    #[error("invalid context file {path}: {source}")]
    Context {
        /// Context file
        path: PathBuf,
        /// JSON decode error
        #[source]
        source: serde_json::Error,
    },

    /// Template placeholder without a value
    #[error("template error: no value for placeholder '{0}'")]
    Template(String),

    /// Filesystem error
    #[error("io error at {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// One or more notebooks in a batch failed
    #[error("{} notebook(s) failed: {}", .failures.len(), summarize(.failures))]
    Batch {
        /// Notebook file name and error message, per failure
        failures: Vec<(String, String)>,
    },
}

fn summarize(failures: &[(String, String)]) -> String {
    failures
        .iter()
        .map(|(notebook, message)| format!("{notebook} ({message})"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl CoreError {
    /// Create configuration error
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create IO error for path
    #[inline]
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error stems from missing or invalid configuration
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Config(_) | Self::Settings { .. } | Self::Template(_) => true,
            Self::Spec(e) => e.is_configuration(),
            _ => false,
        }
    }

    /// Error message followed by every underlying cause
    #[must_use]
    pub fn trace(&self) -> String {
        if let Self::Engine(engine) = self {
            return engine.trace();
        }
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str("\ncaused by: ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
