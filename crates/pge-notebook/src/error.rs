//! Error types for notebook handling
//!
//! Covers:
//! - Reading and decoding `.ipynb` files
//! - Parameter inspection
//! - Running a notebook through an execution engine

use std::path::PathBuf;

/// Errors while reading or inspecting a notebook
#[derive(Debug, thiserror::Error)]
pub enum NotebookError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid nbformat JSON
    #[error("invalid notebook {path}: {source}")]
    InvalidFormat {
        /// Notebook file
        path: PathBuf,
        /// JSON decode error
        #[source]
        source: serde_json::Error,
    },

    /// Path does not name a `.ipynb` file
    #[error("{0} is not a .ipynb file")]
    NotANotebook(PathBuf),

    /// No inspector understands the notebook's kernel language
    #[error("unsupported kernel language '{language}' in {path}")]
    UnsupportedLanguage {
        /// Notebook file
        path: PathBuf,
        /// Kernel language, lower-cased
        language: String,
    },
}

impl NotebookError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create format error for path
    pub fn invalid_format(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::InvalidFormat {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by a [`NotebookEngine`](crate::engine::NotebookEngine)
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Engine executable could not be started
    #[error("failed to launch {program}: {source}")]
    Spawn {
        /// Executable name or path
        program: String,
        /// Launch error
        #[source]
        source: std::io::Error,
    },

    /// Notebook ran but a cell failed, or the engine exited non-zero
    #[error("notebook execution failed ({status}): {message}")]
    Failed {
        /// Exit status as reported by the OS
        status: String,
        /// Last error line reported by the engine
        message: String,
        /// Everything the engine wrote to stderr
        stderr: String,
    },

    /// Parameters could not be handed to the engine
    #[error("failed to encode parameters: {0}")]
    Parameters(#[from] serde_yaml::Error),
}

impl EngineError {
    /// Full diagnostic text, suitable for a traceback file
    #[must_use]
    pub fn trace(&self) -> String {
        match self {
            Self::Failed { stderr, .. } if !stderr.is_empty() => {
                format!("{self}\n\n{stderr}")
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias for notebook operations
pub type NotebookResult<T> = Result<T, NotebookError>;
