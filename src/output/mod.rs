//! Output writers with dispatch by file extension.
//!
//! # Example
//!
//! ```no_run
//! use offerdoc::output::{SaveOptions, WriterRegistry};
//! use offerdoc::Document;
//! use std::path::Path;
//!
//! fn main() -> offerdoc::Result<()> {
//!     let registry = WriterRegistry::with_defaults();
//!     let doc = Document::new();
//!     registry.save(&doc, Path::new("Commercial_Proposal_v1.pdf"), &SaveOptions::default())?;
//!     Ok(())
//! }
//! ```

mod docx;
mod pdf;

pub use docx::DocxWriter;
pub use pdf::PdfWriter;

use crate::error::{Error, Result};
use crate::model::Document;
use crate::pdf::PdfOptions;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::sync::Arc;

/// Options for saving a document.
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Replace an existing output file
    pub overwrite: bool,

    /// PDF rendering options
    pub pdf: PdfOptions,
}

impl SaveOptions {
    /// Create new save options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow replacing an existing file.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Set PDF rendering options.
    pub fn with_pdf_options(mut self, pdf: PdfOptions) -> Self {
        self.pdf = pdf;
        self
    }
}

/// Trait for document writers.
///
/// Implement this trait to add support for a new output format.
pub trait DocumentWriter: Send + Sync {
    /// Get the supported file extensions for this writer.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["pdf"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this writer.
    fn name(&self) -> &str;

    /// Serialize the whole document in memory.
    fn write_bytes(&self, doc: &Document, options: &SaveOptions) -> Result<Vec<u8>>;

    /// Check if this writer supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry of writers keyed by extension and name.
pub struct WriterRegistry {
    writers: HashMap<String, Arc<dyn DocumentWriter>>,
    by_name: HashMap<String, Arc<dyn DocumentWriter>>,
}

impl WriterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            writers: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the DOCX and PDF writers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DocxWriter::new()));
        registry.register(Arc::new(PdfWriter::new()));
        registry
    }

    /// Register a writer for all its supported extensions.
    pub fn register(&mut self, writer: Arc<dyn DocumentWriter>) {
        for ext in writer.supported_extensions() {
            self.writers.insert(ext.to_lowercase(), writer.clone());
        }
        self.by_name.insert(writer.name().to_lowercase(), writer);
    }

    /// Get a writer by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentWriter>> {
        self.writers.get(&ext.to_lowercase()).cloned()
    }

    /// Get a writer by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentWriter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.writers.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions.
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.writers.keys().map(|s| s.as_str()).collect()
    }

    /// Writer for the extension of `path`.
    pub fn writer_for(&self, path: &Path) -> Result<Arc<dyn DocumentWriter>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                Error::UnsupportedOutput(format!("{} has no extension", path.display()))
            })?;
        self.get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedOutput(format!("no writer for .{}", ext)))
    }

    /// Serialize `doc` and save it to `path`.
    ///
    /// The document is rendered completely before the file is created, so a
    /// failure leaves no partial output behind.
    pub fn save(&self, doc: &Document, path: &Path, options: &SaveOptions) -> Result<()> {
        let writer = self.writer_for(path)?;
        let bytes = writer.write_bytes(doc, options)?;
        write_file(path, &bytes, options.overwrite)?;
        log::info!("Document saved to {}", path.display());
        Ok(())
    }
}

impl Default for WriterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Write bytes to a new file; an existing file is an error unless
/// `overwrite` is set.
pub fn write_file(path: &Path, bytes: &[u8], overwrite: bool) -> Result<()> {
    let mut open = OpenOptions::new();
    open.write(true);
    if overwrite {
        open.create(true).truncate(true);
    } else {
        open.create_new(true);
    }
    let mut file = open.open(path).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => Error::OutputExists(path.to_path_buf()),
        _ => Error::Io(e),
    })?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}
