//! Error types and result aliases for Callbox.
//!
//! This module defines the shared error types used across the receiver and
//! producer components. Errors are structured for programmatic handling:
//! the API layer maps each variant to an HTTP status, so variants mirror the
//! request-handling taxonomy (auth, validation, sink IO, internal).

/// The result type used throughout Callbox.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Callbox operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An ingestion request carried no API key while one is required.
    #[error("Missing API key")]
    MissingApiKey,

    /// An ingestion request carried an API key that does not match the
    /// configured shared secret.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// A payload failed strict schema validation.
    #[error("invalid field `{field}`: {reason}")]
    SchemaViolation {
        /// The payload field that failed validation.
        field: &'static str,
        /// Description of what made the field invalid.
        reason: String,
    },

    /// A request body could not be parsed as JSON.
    #[error("malformed JSON body: {message}")]
    MalformedJson {
        /// The parser's description of the syntax error.
        message: String,
    },

    /// A durable log sink write failed.
    #[error("log sink error: {message}")]
    Sink {
        /// Description of the sink failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure.
        message: String,
    },

    /// Invalid input was provided (configuration or startup validation).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An internal error occurred that should not happen in normal operation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Creates a schema violation error for the given field.
    #[must_use]
    pub fn schema_violation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::SchemaViolation {
            field,
            reason: reason.into(),
        }
    }

    /// Creates a new sink error with the given message.
    #[must_use]
    pub fn sink(message: impl Into<String>) -> Self {
        Self::Sink {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new sink error with a source cause.
    #[must_use]
    pub fn sink_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Sink {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for the authentication failure variants.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::InvalidApiKey)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            message: value.to_string(),
        }
    }
}
