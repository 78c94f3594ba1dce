//! Typst to PDF compiler

use std::path::{Path, PathBuf};

use typst_as_lib::TypstEngine;

use crate::error::{PdfError, Result};

/// Compiles Typst markup to PDF bytes
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    font_paths: Vec<PathBuf>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiler that loads the given font files
    pub fn with_fonts<P: AsRef<Path>>(font_paths: &[P]) -> Self {
        Self {
            font_paths: font_paths.iter().map(|p| p.as_ref().to_path_buf()).collect(),
        }
    }

    pub fn font_paths(&self) -> &[PathBuf] {
        &self.font_paths
    }

    /// Compile Typst markup to PDF bytes
    pub fn compile(&self, markup: &str) -> Result<Vec<u8>> {
        let mut fonts = Vec::with_capacity(self.font_paths.len());
        for path in &self.font_paths {
            let bytes = std::fs::read(path).map_err(|e| {
                PdfError::Font(format!("Failed to read font {}: {}", path.display(), e))
            })?;
            fonts.push(bytes);
        }

        let mut builder = TypstEngine::builder().main_file(markup.to_string());
        if !fonts.is_empty() {
            builder = builder.fonts(fonts);
        }
        let engine = builder.build();

        // Warned<Result<Document, _>>; warnings are dropped
        let compiled = engine.compile();
        let document = compiled
            .output
            .map_err(|e| PdfError::Compilation(format!("{:?}", e)))?;

        let options = typst_pdf::PdfOptions::default();
        let pdf = typst_pdf::pdf(&document, &options)
            .map_err(|e| PdfError::Compilation(format!("PDF generation failed: {:?}", e)))?;

        let pdf: Vec<u8> = pdf.into();
        if !pdf.starts_with(b"%PDF") {
            return Err(PdfError::NotPdf);
        }
        log::debug!("Compiled {} bytes of Typst into {} bytes of PDF", markup.len(), pdf.len());
        Ok(pdf)
    }
}
