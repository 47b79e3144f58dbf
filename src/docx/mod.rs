//! Word-processor (`.docx`) collaborator.
//!
//! A narrow codec over the package format: it reads paragraphs, runs,
//! tables and core properties into the document model and writes them back.
//! Parts it does not understand are carried through untouched.

mod reader;
mod writer;
mod xml;

pub use reader::read_docx;
pub use writer::write_docx;

use crate::error::{Error, Result};
use crate::model::{Color, Document, Table, TableCell};
use std::path::Path;

/// Main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";
/// Core properties part.
pub const CORE_PART: &str = "docProps/core.xml";

/// Table properties held in the markup before the first row.
fn table_head(table: &Table) -> (&Option<String>, &Option<Vec<f32>>) {
    (&table.style_id, &table.column_widths)
}

/// Cell properties held in the markup before the first paragraph.
fn cell_head(cell: &TableCell) -> (u8, Option<Color>) {
    (cell.colspan, cell.shading)
}

/// Read a `.docx` file.
pub fn open_docx<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::from_open(e, path))?;
    read_docx(&data)
}
