//! paperdok-pdf - PDF acquisition
//!
//! Turns DOCX bytes into a PDF, preferring the remote conversion service
//! and falling back to local conversion through Typst.
//!
//! # Architecture
//!
//! The local path has two stages:
//!
//! 1. **Transpiler** - reads the DOCX flow back and emits Typst markup
//! 2. **Compiler** - compiles Typst markup to PDF bytes
//!
//! [`PdfAcquirer`] drives the remote to local state machine around them.
//!
//! # Example
//!
//! ```ignore
//! use paperdok_pdf::{PdfAcquirer, TypstConverter};
//! use paperdok_service::ServiceConfig;
//!
//! let acquirer = PdfAcquirer::from_config(&ServiceConfig::from_env(), TypstConverter::new());
//! let output = acquirer.acquire(&docx_bytes)?;
//! println!("{} via {}", output.pdf.len(), output.conversion_method);
//! ```

mod acquisition;
mod compiler;
mod error;
mod transpiler;

pub use acquisition::{
    AcquisitionState, LocalConverter, PdfAcquirer, PdfOutput, RemoteConverter, TypstConverter,
    METHOD_LOCAL_DIRECT, METHOD_LOCAL_FALLBACK, METHOD_SERVICE_PREFIX,
};
pub use compiler::Compiler;
pub use error::{AcquisitionError, PdfError, Result, REMEDIATION};
pub use transpiler::Transpiler;
