//! Error types for PDF generation

use paperdok_ooxml::OoxmlError;
use paperdok_service::ConversionError;
use thiserror::Error;

/// Result type for local PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Errors from the local DOCX to PDF path
#[derive(Error, Debug)]
pub enum PdfError {
    /// The DOCX could not be read back
    #[error("Cannot read DOCX: {0}")]
    Docx(#[from] OoxmlError),

    /// Typst compilation error
    #[error("Typst compilation failed: {0}")]
    Compilation(String),

    /// Font loading error
    #[error("Font error: {0}")]
    Font(String),

    /// The converter produced something other than a PDF
    #[error("Converter output is not a PDF")]
    NotPdf,
}

/// Text shown with every exhausted fallback
pub const REMEDIATION: &str = "try downloading the Word document instead";

/// Errors from [`PdfAcquirer`](crate::PdfAcquirer)
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// Neither the service nor the local converter produced a PDF
    #[error("PDF generation failed: {local}; {remediation}")]
    FallbackExhausted {
        /// Last service error, when the service was tried
        remote: Option<ConversionError>,
        local: PdfError,
        remediation: &'static str,
    },
}

impl AcquisitionError {
    pub(crate) fn exhausted(remote: Option<ConversionError>, local: PdfError) -> Self {
        AcquisitionError::FallbackExhausted {
            remote,
            local,
            remediation: REMEDIATION,
        }
    }

    /// The service error, if the service was tried
    pub fn remote_error(&self) -> Option<&ConversionError> {
        match self {
            AcquisitionError::FallbackExhausted { remote, .. } => remote.as_ref(),
        }
    }

    pub fn remediation(&self) -> &'static str {
        match self {
            AcquisitionError::FallbackExhausted { remediation, .. } => remediation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperdok_service::ErrorCode;

    #[test]
    fn test_exhausted_message() {
        let err = AcquisitionError::exhausted(
            Some(ConversionError::new(ErrorCode::Timeout, "slow")),
            PdfError::Compilation("no fonts".into()),
        );
        let message = err.to_string();
        assert!(message.contains("no fonts"));
        assert!(message.ends_with("try downloading the Word document instead"));
        assert_eq!(err.remote_error().unwrap().code, ErrorCode::Timeout);
    }
}
