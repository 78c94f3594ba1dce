//! paperdok-core - generation facade
//!
//! Ties the model builder, the DOCX and HTML renderers and PDF
//! acquisition together behind a single [`Generator`].
//!
//! # Example
//!
//! ```
//! use paperdok_core::{Generator, OutputFormat, PaperdokConfig};
//! use serde_json::json;
//!
//! let generator = Generator::new(&PaperdokConfig::default());
//! let file = generator.generate(&json!({"title": "On Twips"}), OutputFormat::Html)?;
//! assert_eq!(file.conversion_method, "html_markup");
//! # Ok::<(), paperdok_core::GenerationError>(())
//! ```

pub mod config;
pub mod error;
pub mod generator;

pub use config::{PaperdokConfig, PdfSettings, CONFIG_FILE};
pub use error::{GenerationError, Result};
pub use generator::{
    GeneratedFile, Generator, OutputFormat, METHOD_HTML_MARKUP, METHOD_NATIVE_DOCX,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
