//! Error types for specification building
//!
//! Only configuration problems surface as errors. Undecodable parameter
//! defaults are recovered where they are read and never reach this type.

/// Errors raised while assembling hysds-io or job-spec documents
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// A mandatory builder input was not supplied
    #[error("{field} is required for {document} generation")]
    MissingField {
        /// Input name (e.g. `required_queue`)
        field: &'static str,
        /// Document being built
        document: &'static str,
    },

    /// An input was supplied with an unusable value
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Input name
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// Document could not be serialized
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SpecError {
    /// Create missing field error
    #[inline]
    #[must_use]
    pub fn missing(field: &'static str, document: &'static str) -> Self {
        Self::MissingField { field, document }
    }

    /// Create invalid field error
    #[inline]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Whether this error stems from caller-supplied configuration
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingField { .. } | Self::InvalidField { .. })
    }
}

/// Result type alias for specification operations
pub type SpecResult<T> = Result<T, SpecError>;
