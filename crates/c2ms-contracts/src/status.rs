//! Status values returned across the engine boundary.
//!
//! A `Status` is either nominal or carries the first violation found.  The
//! compliance path reports its outcome as a `Status` rather than an `Err`,
//! so the transport layer can decide whether a failure blocks a send.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::C2msError;

/// Broad category of a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusClass {
    NoError,
    MsgError,
    FieldError,
    SpecificationError,
    IteratorError,
    ConfigError,
    ArgumentError,
    ParseError,
}

/// Specific condition within a `StatusClass`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    NoErrorCode,
    MessageFailedValidation,
    MissingRequiredField,
    IncorrectFieldType,
    IncorrectFieldValue,
    InvalidSubjectName,
    TemplateIdDoesNotExist,
    InvalidFieldValue,
    NonAllowedField,
    FieldNotFound,
    IteratorExhausted,
    InvalidConfigValue,
    UninitializedObject,
    MalformedInput,
    CustomValidationFailed,
}

/// Outcome of a validation or other boundary operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub classification: StatusClass,
    pub code: StatusCode,
    /// Free-form code supplied by custom validators; zero otherwise.
    pub custom_code: i32,
    pub reason: String,
}

impl Status {
    /// A nominal status.
    pub fn ok() -> Self {
        Self {
            classification: StatusClass::NoError,
            code: StatusCode::NoErrorCode,
            custom_code: 0,
            reason: String::new(),
        }
    }

    pub fn error(classification: StatusClass, code: StatusCode, reason: impl Into<String>) -> Self {
        Self {
            classification,
            code,
            custom_code: 0,
            reason: reason.into(),
        }
    }

    /// Convenience for custom validators: a message error with a caller code.
    pub fn custom(reason: impl Into<String>, custom_code: i32) -> Self {
        Self {
            classification: StatusClass::MsgError,
            code: StatusCode::CustomValidationFailed,
            custom_code,
            reason: reason.into(),
        }
    }

    pub fn has_error(&self) -> bool {
        self.classification != StatusClass::NoError
    }

    pub fn is_ok(&self) -> bool {
        !self.has_error()
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::ok()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_error() {
            write!(f, "[{:?},{:?},{}] : {}", self.classification, self.code, self.custom_code, self.reason)
        } else {
            f.write_str("[NoError]")
        }
    }
}

impl From<&C2msError> for Status {
    fn from(err: &C2msError) -> Self {
        let (classification, code) = match err {
            C2msError::Configuration { .. } => (StatusClass::ConfigError, StatusCode::InvalidConfigValue),
            C2msError::UnknownSchema { .. } => {
                (StatusClass::SpecificationError, StatusCode::TemplateIdDoesNotExist)
            }
            C2msError::Compliance { .. } => (StatusClass::MsgError, StatusCode::MessageFailedValidation),
            C2msError::Conversion { .. } => (StatusClass::FieldError, StatusCode::InvalidFieldValue),
            C2msError::FieldNotFound { .. } => (StatusClass::FieldError, StatusCode::FieldNotFound),
            C2msError::IteratorExhausted { .. } => {
                (StatusClass::IteratorError, StatusCode::IteratorExhausted)
            }
            C2msError::InvalidArgument { .. } => {
                (StatusClass::ArgumentError, StatusCode::UninitializedObject)
            }
            C2msError::Parse { .. } => (StatusClass::ParseError, StatusCode::MalformedInput),
        };
        Status::error(classification, code, err.to_string())
    }
}

impl From<C2msError> for Status {
    fn from(err: C2msError) -> Self {
        Status::from(&err)
    }
}
