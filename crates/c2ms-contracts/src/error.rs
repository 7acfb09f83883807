//! Error types for the C2MS compliance engine.
//!
//! All fallible engine operations return `C2msResult<T>`.  The variants follow
//! the engine's error taxonomy; `Status::from(&C2msError)` maps each of them
//! onto a classification and code for callers that want a status value.

use thiserror::Error;

/// The unified error type for the compliance engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum C2msError {
    /// Bad version, bad schema level, unreadable or incomplete schema source.
    ///
    /// Fatal for the registry being constructed; no partial state survives.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    /// No template is registered under the requested schema id.
    #[error("SchemaID \"{schema_id}\" could not be found in list of available schema.")]
    UnknownSchema { schema_id: String },

    /// A message does not conform to its resolved template.
    #[error("{reason}")]
    Compliance { reason: String },

    /// A field value cannot be represented as the requested type.
    #[error("{reason}")]
    Conversion { reason: String },

    /// The message holds no field under the given name.
    #[error("Message does not contain field with name: {name}")]
    FieldNotFound { name: String },

    /// A cursor was advanced past its last element.
    #[error("{reason}")]
    IteratorExhausted { reason: String },

    /// A mandatory argument was null or empty.
    ///
    /// Raised before any engine logic runs.
    #[error("{reason}")]
    InvalidArgument { reason: String },

    /// XML or JSON input could not be decoded into a field or message.
    #[error("parse error: {reason}")]
    Parse { reason: String },
}

impl C2msError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration { reason: reason.into() }
    }

    pub fn conversion(reason: impl Into<String>) -> Self {
        Self::Conversion { reason: reason.into() }
    }

    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse { reason: reason.into() }
    }

    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument { reason: reason.into() }
    }
}

/// Convenience alias used throughout the C2MS crates.
pub type C2msResult<T> = Result<T, C2msError>;
