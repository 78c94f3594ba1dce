//! PDF acquisition with remote to local fallback
//!
//! ```text
//!            remote enabled
//!   Init ──────────────────▶ TryRemote ── ok ──▶ Done
//!     │                          │
//!     │ disabled             any error
//!     ▼                          ▼
//!   TryLocal ◀───────────────────┘
//!     │ ok ──▶ Done
//!     └ err ─▶ Failed
//! ```
//!
//! DOCX generation never depends on this module: it only consumes bytes
//! that already exist.

use std::fmt;
use std::path::PathBuf;

use paperdok_model::{Layout, LAYOUT};
use paperdok_ooxml::DocxContent;
use paperdok_service::{
    ConversionClient, ConversionError, ConversionResult, ErrorCode, ServiceConfig, Transport,
};

use crate::compiler::Compiler;
use crate::error::{AcquisitionError, PdfError};
use crate::transpiler::Transpiler;

/// Conversion method when the local path runs after a failed remote attempt
pub const METHOD_LOCAL_FALLBACK: &str = "direct_docx2pdf_fallback";

/// Conversion method when the remote path was never tried
pub const METHOD_LOCAL_DIRECT: &str = "direct_docx2pdf";

/// Prefix for methods reported by the conversion service
pub const METHOD_SERVICE_PREFIX: &str = "pdf_service_";

/// Where the acquisition state machine is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcquisitionState {
    Init,
    TryRemote,
    TryLocal,
    Done,
    Failed,
}

impl fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AcquisitionState::Init => "init",
            AcquisitionState::TryRemote => "try_remote",
            AcquisitionState::TryLocal => "try_local",
            AcquisitionState::Done => "done",
            AcquisitionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A converter behind the network
pub trait RemoteConverter {
    /// Name used in logs
    fn name(&self) -> &str;

    fn convert(&self, docx: &[u8]) -> Result<ConversionResult, ConversionError>;
}

impl<T: Transport> RemoteConverter for ConversionClient<T> {
    fn name(&self) -> &str {
        self.base_url()
    }

    fn convert(&self, docx: &[u8]) -> Result<ConversionResult, ConversionError> {
        self.convert_with_retry(docx, self.max_attempts())
    }
}

/// A converter running in-process
pub trait LocalConverter {
    fn convert(&self, docx: &[u8]) -> Result<Vec<u8>, PdfError>;
}

/// Local conversion through Typst
///
/// Reads the DOCX back into its flow, transpiles it and compiles the
/// result.
#[derive(Debug, Clone)]
pub struct TypstConverter {
    compiler: Compiler,
    layout: &'static Layout,
}

impl Default for TypstConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl TypstConverter {
    pub fn new() -> Self {
        Self {
            compiler: Compiler::new(),
            layout: &LAYOUT,
        }
    }

    /// Converter that loads extra font files
    pub fn with_fonts(font_paths: &[PathBuf]) -> Self {
        Self {
            compiler: Compiler::with_fonts(font_paths),
            layout: &LAYOUT,
        }
    }

    /// The Typst source that [`convert`](LocalConverter::convert) compiles
    pub fn markup(&self, docx: &[u8]) -> Result<String, PdfError> {
        let content = DocxContent::from_bytes(docx)?;
        Ok(Transpiler::new(self.layout).transpile(&content))
    }
}

impl LocalConverter for TypstConverter {
    fn convert(&self, docx: &[u8]) -> Result<Vec<u8>, PdfError> {
        let markup = self.markup(docx)?;
        self.compiler.compile(&markup)
    }
}

/// A PDF and how it was obtained
#[derive(Debug, Clone)]
pub struct PdfOutput {
    /// PDF bytes, always starting with `%PDF`
    pub pdf: Vec<u8>,
    pub conversion_method: String,
    /// States in the order they were entered
    pub visited: Vec<AcquisitionState>,
    /// Service error that caused the fallback, if any
    pub remote_error: Option<ConversionError>,
}

/// Internal step carrying the data each state hands to the next
enum Step {
    Init,
    TryRemote,
    TryLocal,
    Done { pdf: Vec<u8>, method: String },
    Failed(PdfError),
}

impl Step {
    fn state(&self) -> AcquisitionState {
        match self {
            Step::Init => AcquisitionState::Init,
            Step::TryRemote => AcquisitionState::TryRemote,
            Step::TryLocal => AcquisitionState::TryLocal,
            Step::Done { .. } => AcquisitionState::Done,
            Step::Failed(_) => AcquisitionState::Failed,
        }
    }
}

/// Obtains a PDF for a DOCX, remote first, local on any remote failure
pub struct PdfAcquirer {
    remote: Option<Box<dyn RemoteConverter>>,
    local: Box<dyn LocalConverter>,
    remote_enabled: bool,
}

impl fmt::Debug for PdfAcquirer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfAcquirer")
            .field("remote", &self.remote.as_ref().map(|r| r.name().to_string()))
            .field("remote_enabled", &self.remote_enabled)
            .finish()
    }
}

impl PdfAcquirer {
    /// Local conversion only
    pub fn new(local: impl LocalConverter + 'static) -> Self {
        Self {
            remote: None,
            local: Box::new(local),
            remote_enabled: false,
        }
    }

    /// Add a remote converter, enabling the remote path
    pub fn with_remote(mut self, remote: impl RemoteConverter + 'static) -> Self {
        self.remote = Some(Box::new(remote));
        self.remote_enabled = true;
        self
    }

    /// Turn the remote path on or off without dropping the converter
    pub fn remote_enabled(mut self, enabled: bool) -> Self {
        self.remote_enabled = enabled;
        self
    }

    /// Acquirer for a service configuration
    ///
    /// A client that cannot be built leaves only the local path.
    pub fn from_config(config: &ServiceConfig, local: impl LocalConverter + 'static) -> Self {
        let acquirer = Self::new(local);
        if !config.enabled {
            log::debug!("PDF service disabled, local conversion only");
            return acquirer;
        }
        match ConversionClient::from_config(config) {
            Ok(client) => acquirer.with_remote(client),
            Err(e) => {
                log::warn!("PDF service client unavailable: {}", e);
                acquirer
            }
        }
    }

    /// Whether acquisition will try the remote converter first
    pub fn uses_remote(&self) -> bool {
        self.remote_enabled && self.remote.is_some()
    }

    /// Convert DOCX bytes to PDF
    pub fn acquire(&self, docx: &[u8]) -> Result<PdfOutput, AcquisitionError> {
        let mut visited = Vec::new();
        let mut remote_error: Option<ConversionError> = None;
        let mut step = Step::Init;

        loop {
            let state = step.state();
            log::debug!("PDF acquisition: {}", state);
            visited.push(state);

            step = match step {
                Step::Init => {
                    if self.uses_remote() {
                        Step::TryRemote
                    } else {
                        Step::TryLocal
                    }
                }
                Step::TryRemote => match self.try_remote(docx) {
                    Ok(result) => Step::Done {
                        pdf: result.pdf_data,
                        method: format!("{}{}", METHOD_SERVICE_PREFIX, result.conversion_method),
                    },
                    Err(e) => {
                        log::warn!("PDF service failed, falling back to local conversion: {}", e);
                        remote_error = Some(e);
                        Step::TryLocal
                    }
                },
                Step::TryLocal => match self.try_local(docx) {
                    Ok(pdf) => {
                        let method = if remote_error.is_some() {
                            METHOD_LOCAL_FALLBACK
                        } else {
                            METHOD_LOCAL_DIRECT
                        };
                        Step::Done {
                            pdf,
                            method: method.to_string(),
                        }
                    }
                    Err(e) => {
                        log::warn!("Local PDF conversion failed: {}", e);
                        Step::Failed(e)
                    }
                },
                Step::Done { pdf, method } => {
                    log::info!("PDF acquired via {} ({} bytes)", method, pdf.len());
                    return Ok(PdfOutput {
                        pdf,
                        conversion_method: method,
                        visited,
                        remote_error,
                    });
                }
                Step::Failed(local) => {
                    return Err(AcquisitionError::exhausted(remote_error, local));
                }
            };
        }
    }

    fn try_remote(&self, docx: &[u8]) -> Result<ConversionResult, ConversionError> {
        let Some(remote) = self.remote.as_ref() else {
            return Err(ConversionError::new(
                ErrorCode::ConnectionError,
                "no PDF service configured",
            ));
        };
        log::debug!("Requesting PDF from {}", remote.name());
        let result = remote.convert(docx)?;
        if !result.pdf_data.starts_with(b"%PDF") {
            return Err(ConversionError::new(
                ErrorCode::UnknownError,
                "service returned data that is not a PDF",
            ));
        }
        Ok(result)
    }

    fn try_local(&self, docx: &[u8]) -> Result<Vec<u8>, PdfError> {
        let pdf = self.local.convert(docx)?;
        if !pdf.starts_with(b"%PDF") {
            return Err(PdfError::NotPdf);
        }
        Ok(pdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FixedRemote(Result<&'static [u8], ErrorCode>);

    impl RemoteConverter for FixedRemote {
        fn name(&self) -> &str {
            "fixed"
        }

        fn convert(&self, _docx: &[u8]) -> Result<ConversionResult, ConversionError> {
            match &self.0 {
                Ok(pdf) => Ok(ConversionResult {
                    pdf_data: pdf.to_vec(),
                    size: pdf.len(),
                    conversion_method: "docx2pdf_exact".to_string(),
                    processing_time_ms: 1,
                }),
                Err(code) => Err(ConversionError::new(*code, "scripted")),
            }
        }
    }

    #[derive(Default)]
    struct CountingLocal {
        calls: Cell<usize>,
        fail: bool,
    }

    impl LocalConverter for std::rc::Rc<CountingLocal> {
        fn convert(&self, _docx: &[u8]) -> Result<Vec<u8>, PdfError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                Err(PdfError::Compilation("scripted".into()))
            } else {
                Ok(b"%PDF-1.7 local".to_vec())
            }
        }
    }

    fn local(fail: bool) -> std::rc::Rc<CountingLocal> {
        std::rc::Rc::new(CountingLocal {
            calls: Cell::new(0),
            fail,
        })
    }

    #[test]
    fn test_remote_success() {
        let local = local(false);
        let acquirer =
            PdfAcquirer::new(local.clone()).with_remote(FixedRemote(Ok(&b"%PDF-1.4 remote"[..])));
        let out = acquirer.acquire(b"docx").unwrap();
        assert_eq!(out.conversion_method, "pdf_service_docx2pdf_exact");
        assert_eq!(
            out.visited,
            vec![
                AcquisitionState::Init,
                AcquisitionState::TryRemote,
                AcquisitionState::Done
            ]
        );
        assert_eq!(local.calls.get(), 0);
    }

    #[test]
    fn test_remote_failure_falls_back() {
        let acquirer = PdfAcquirer::new(local(false))
            .with_remote(FixedRemote(Err(ErrorCode::ServiceUnavailable)));
        let out = acquirer.acquire(b"docx").unwrap();
        assert!(out.pdf.starts_with(b"%PDF"));
        assert_eq!(out.conversion_method, METHOD_LOCAL_FALLBACK);
        assert_eq!(
            out.remote_error.unwrap().code,
            ErrorCode::ServiceUnavailable
        );
    }

    #[test]
    fn test_non_pdf_from_remote_falls_back() {
        let acquirer =
            PdfAcquirer::new(local(false)).with_remote(FixedRemote(Ok(&b"<html>oops</html>"[..])));
        let out = acquirer.acquire(b"docx").unwrap();
        assert_eq!(out.conversion_method, METHOD_LOCAL_FALLBACK);
        assert_eq!(out.remote_error.unwrap().code, ErrorCode::UnknownError);
    }

    #[test]
    fn test_disabled_remote_goes_direct() {
        let acquirer = PdfAcquirer::new(local(false))
            .with_remote(FixedRemote(Ok(&b"%PDF"[..])))
            .remote_enabled(false);
        let out = acquirer.acquire(b"docx").unwrap();
        assert_eq!(out.conversion_method, METHOD_LOCAL_DIRECT);
        assert_eq!(
            out.visited,
            vec![
                AcquisitionState::Init,
                AcquisitionState::TryLocal,
                AcquisitionState::Done
            ]
        );
    }

    #[test]
    fn test_both_paths_fail() {
        let acquirer =
            PdfAcquirer::new(local(true)).with_remote(FixedRemote(Err(ErrorCode::Timeout)));
        let err = acquirer.acquire(b"docx").unwrap_err();
        assert_eq!(err.remote_error().unwrap().code, ErrorCode::Timeout);
        assert!(err.to_string().contains("Word document"));
    }

    #[test]
    fn test_disabled_config_has_no_remote() {
        let config = ServiceConfig {
            enabled: false,
            ..ServiceConfig::default()
        };
        let acquirer = PdfAcquirer::from_config(&config, local(false));
        assert!(!acquirer.uses_remote());
    }
}
