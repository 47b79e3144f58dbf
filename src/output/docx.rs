//! DOCX writer.

use super::{DocumentWriter, SaveOptions};
use crate::docx::write_docx;
use crate::error::Result;
use crate::model::Document;

/// Writes word-processor packages.
///
/// Documents loaded from a `.docx` keep their untouched parts; fresh ones get
/// a minimal package with styles and an optional footer.
#[derive(Debug, Clone, Default)]
pub struct DocxWriter {
    _private: (),
}

impl DocxWriter {
    /// Create a new DOCX writer.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentWriter for DocxWriter {
    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }

    fn name(&self) -> &str {
        "docx"
    }

    fn write_bytes(&self, doc: &Document, _options: &SaveOptions) -> Result<Vec<u8>> {
        write_docx(doc)
    }
}
