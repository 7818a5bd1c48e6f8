//! Error types for form building

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Structural failures that abort a form build.
#[derive(Debug, Error)]
pub enum FormError {
    /// Malformed or incomplete schema node
    #[error("Schema error at '{path}': {reason}")]
    Schema { path: String, reason: String },

    /// A schema node references a validator id nobody registered
    #[error("Schema error at '{path}': unknown validator '{id}'")]
    UnknownValidator { path: String, id: String },

    /// Widget id missing from the widget registry
    #[error("Widget not found: '{id}'")]
    WidgetNotFound { id: String },

    /// Operation needs a bound schema
    #[error("No schema has been bound")]
    NoSchema,

    /// Field path that does not parse
    #[error("Invalid property path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

impl FormError {
    /// Whether the error comes from the schema itself rather than configuration.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            FormError::Schema { .. } | FormError::UnknownValidator { .. }
        )
    }
}

/// Result type alias for form operations
pub type FormResult<T> = Result<T, FormError>;

/// One failed check on one field. Carried as data, never thrown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Dotted path of the failing property
    pub path: String,
    /// Machine-readable code, e.g. `REQUIRED`, `MIN_LENGTH`
    pub code: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: String::new(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Attach the failing property's path.
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.code, self.message)
        } else {
            write!(f, "{} ({}): {}", self.path, self.code, self.message)
        }
    }
}
