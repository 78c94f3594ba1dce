//! Error types for document model construction

use thiserror::Error;

/// Structural problems in a generation request
///
/// Validation failures are surfaced to the caller as-is and never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Request body is not a JSON object
    #[error("Request must be a JSON object")]
    NotAnObject,

    /// Request body is not valid JSON
    #[error("Request is not valid JSON: {0}")]
    Json(String),

    /// Title is absent or blank
    #[error("Document title is required")]
    MissingTitle,

    /// A field has the wrong JSON type
    #[error("Field `{field}` must be {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },

    /// A content block declares a type the model does not know
    #[error("Section {section}: unknown content block type `{kind}`")]
    UnknownBlockType { section: usize, kind: String },
}

impl ValidationError {
    /// The request field the error points at, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::MissingTitle => Some("title"),
            ValidationError::InvalidField { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ValidationError>;
