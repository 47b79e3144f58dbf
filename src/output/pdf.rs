//! PDF writer.

use super::{DocumentWriter, SaveOptions};
use crate::error::Result;
use crate::model::Document;
use crate::pdf::render_pdf;

/// Renders documents to PDF with the fonts from [`SaveOptions::pdf`].
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    _private: (),
}

impl PdfWriter {
    /// Create a new PDF writer.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentWriter for PdfWriter {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn write_bytes(&self, doc: &Document, options: &SaveOptions) -> Result<Vec<u8>> {
        render_pdf(doc, &options.pdf)
    }
}
