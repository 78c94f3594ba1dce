//! Error types for the generation pipeline

use paperdok_model::ValidationError;
use paperdok_ooxml::OoxmlError;
use paperdok_pdf::AcquisitionError;
use thiserror::Error;

/// Why a generation request failed
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The request payload is malformed
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// The DOCX package could not be written
    #[error("DOCX generation failed: {0}")]
    Docx(#[from] OoxmlError),

    /// Neither the service nor the local converter produced a PDF
    #[error(transparent)]
    Pdf(#[from] AcquisitionError),

    /// The configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GenerationError {
    /// What the caller should do next
    pub fn suggestion(&self) -> String {
        match self {
            GenerationError::Validation(e) => match e.field() {
                Some(field) => format!("Fix the `{}` field in the request", field),
                None => "Send the document as a JSON object with a title".to_string(),
            },
            GenerationError::Docx(_) => "Retry the request".to_string(),
            GenerationError::Pdf(e) => match e.remote_error().and_then(|r| r.retry_after) {
                Some(secs) => format!(
                    "Retry after {} seconds, or download the Word document instead",
                    secs
                ),
                None => format!("PDF is unavailable; {}", e.remediation()),
            },
            GenerationError::Config(_) => {
                format!("Check {} and the PDF_SERVICE_* variables", crate::CONFIG_FILE)
            }
        }
    }
}

/// Result type for generation
pub type Result<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_suggestion_names_field() {
        let err = GenerationError::from(ValidationError::MissingTitle);
        assert_eq!(err.suggestion(), "Fix the `title` field in the request");

        let err = GenerationError::from(ValidationError::InvalidField {
            field: "sections[0].blocks[1].order".to_string(),
            expected: "an integer",
        });
        assert!(err.suggestion().contains("sections[0].blocks[1].order"));
    }

    #[test]
    fn test_config_suggestion() {
        let err = GenerationError::Config("bad".into());
        assert!(err.suggestion().contains("paperdok.toml"));
    }
}
