//! One call per generation request: build, render, acquire

use std::fmt;
use std::str::FromStr;

use paperdok_html::HtmlRenderer;
use paperdok_model::{Document, DocumentBuilder, RenderReport};
use paperdok_ooxml::DocxRenderer;
use paperdok_pdf::{PdfAcquirer, TypstConverter};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::PaperdokConfig;
use crate::error::Result;

/// Conversion method of DOCX output
pub const METHOD_NATIVE_DOCX: &str = "native_docx";

/// Conversion method of HTML output
pub const METHOD_HTML_MARKUP: &str = "html_markup";

/// Requested output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Docx,
    Html,
    Pdf,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Html => "html",
            OutputFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            OutputFormat::Html => "text/html; charset=utf-8",
            OutputFormat::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "docx" | "word" => Ok(OutputFormat::Docx),
            "html" | "htm" => Ok(OutputFormat::Html),
            "pdf" => Ok(OutputFormat::Pdf),
            other => Err(format!("unknown output format `{}` (expected docx, html or pdf)", other)),
        }
    }
}

/// A generated document
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub file_data: Vec<u8>,
    pub file_type: OutputFormat,
    pub file_size: usize,
    /// How the bytes were produced, e.g. `native_docx` or `pdf_service_docx2pdf_exact`
    pub conversion_method: String,
    pub report: RenderReport,
}

impl GeneratedFile {
    fn new(data: Vec<u8>, file_type: OutputFormat, method: &str, report: RenderReport) -> Self {
        Self {
            file_size: data.len(),
            file_data: data,
            file_type,
            conversion_method: method.to_string(),
            report,
        }
    }

    /// Whether any table content was synthesized
    pub fn synthesized(&self) -> bool {
        self.report.synthesized()
    }

    /// `{stem}.{extension}`
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.file_type.extension())
    }
}

/// The generation pipeline
#[derive(Debug)]
pub struct Generator {
    acquirer: PdfAcquirer,
}

impl Generator {
    /// Pipeline for a configuration
    ///
    /// Nothing here touches the network; the service is first contacted
    /// by a PDF request.
    pub fn new(config: &PaperdokConfig) -> Self {
        let local = TypstConverter::with_fonts(&config.pdf.font_paths);
        Self {
            acquirer: PdfAcquirer::from_config(&config.service, local),
        }
    }

    /// Pipeline with a custom PDF acquirer
    pub fn with_acquirer(acquirer: PdfAcquirer) -> Self {
        Self { acquirer }
    }

    /// Build the model from a request payload and render it
    pub fn generate(&self, payload: &Value, format: OutputFormat) -> Result<GeneratedFile> {
        let doc = DocumentBuilder::from_value(payload)?;
        self.generate_document(&doc, format)
    }

    /// Render an already-built document
    pub fn generate_document(&self, doc: &Document, format: OutputFormat) -> Result<GeneratedFile> {
        log::debug!("Generating {} for \"{}\"", format, doc.title);
        let file = match format {
            OutputFormat::Docx => {
                let docx = DocxRenderer::new().render(doc)?;
                GeneratedFile::new(docx.output, format, METHOD_NATIVE_DOCX, docx.report)
            }
            OutputFormat::Html => {
                let html = HtmlRenderer::new().render(doc);
                GeneratedFile::new(
                    html.output.into_bytes(),
                    format,
                    METHOD_HTML_MARKUP,
                    html.report,
                )
            }
            OutputFormat::Pdf => {
                let docx = DocxRenderer::new().render(doc)?;
                let pdf = self.acquirer.acquire(&docx.output)?;
                GeneratedFile::new(pdf.pdf, format, &pdf.conversion_method, docx.report)
            }
        };

        if file.synthesized() {
            log::warn!(
                "Generated {} with placeholder tables: {:?}",
                format,
                file.report.synthesized_tables()
            );
        }
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperdok_service::ServiceConfig;
    use serde_json::json;

    fn offline() -> Generator {
        Generator::new(&PaperdokConfig {
            service: ServiceConfig {
                enabled: false,
                ..ServiceConfig::default()
            },
            ..PaperdokConfig::default()
        })
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("DOCX".parse::<OutputFormat>(), Ok(OutputFormat::Docx));
        assert_eq!("htm".parse::<OutputFormat>(), Ok(OutputFormat::Html));
        assert!("odt".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Pdf.to_string(), "pdf");
    }

    #[test]
    fn test_docx_output() {
        let file = offline()
            .generate(&json!({"title": "T"}), OutputFormat::Docx)
            .unwrap();
        assert!(file.file_data.starts_with(b"PK"));
        assert_eq!(file.file_size, file.file_data.len());
        assert_eq!(file.conversion_method, "native_docx");
        assert_eq!(file.file_name("paper"), "paper.docx");
    }

    #[test]
    fn test_html_output() {
        let file = offline()
            .generate(&json!({"title": "T"}), OutputFormat::Html)
            .unwrap();
        assert!(file.file_data.starts_with(b"<!DOCTYPE html>"));
        assert_eq!(file.conversion_method, "html_markup");
    }

    #[test]
    fn test_synthesized_flag_is_reported() {
        let payload = json!({
            "title": "T",
            "sections": [{"title": "S", "contentBlocks": [{"type": "table"}]}]
        });
        let file = offline().generate(&payload, OutputFormat::Docx).unwrap();
        assert!(file.synthesized());
    }

    #[test]
    fn test_validation_error_surfaces() {
        let err = offline()
            .generate(&json!({"sections": []}), OutputFormat::Docx)
            .unwrap_err();
        assert!(matches!(err, crate::GenerationError::Validation(_)));
        assert!(err.suggestion().contains("title"));
    }
}
