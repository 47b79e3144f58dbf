//! PDF collaborator.
//!
//! Rendering lays the document model out on A4 pages and embeds TrueType
//! fonts as Type0/Identity-H so any Unicode text (Cyrillic included) is
//! drawn and stays extractable. Reading extracts text lines and the info
//! dictionary, which is all the verifier and the inspection commands need.

mod extract;
mod fonts;
mod layout;
mod writer;

pub use extract::read_pdf;
pub use fonts::FontSet;
pub use writer::render_pdf;

use crate::error::{Error, Result};
use crate::model::Document;
use std::path::{Path, PathBuf};

/// A4 width in points.
pub const PAGE_WIDTH: f32 = 595.28;
/// A4 height in points.
pub const PAGE_HEIGHT: f32 = 841.89;

/// Page margins in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    /// Top margin
    pub top: f32,
    /// Bottom margin
    pub bottom: f32,
    /// Left margin
    pub left: f32,
    /// Right margin
    pub right: f32,
}

impl Margins {
    /// Same margin on every side.
    pub fn uniform(points: f32) -> Self {
        Self {
            top: points,
            bottom: points,
            left: points,
            right: points,
        }
    }
}

impl Default for Margins {
    /// 20 mm all around.
    fn default() -> Self {
        Self::uniform(56.7)
    }
}

/// Options for PDF rendering.
#[derive(Debug, Clone)]
pub struct PdfOptions {
    /// Font files
    pub fonts: FontSet,

    /// Running header text drawn on every page
    pub header: Option<String>,

    /// Use "title | subject" from the metadata when `header` is unset
    pub header_from_metadata: bool,

    /// Page margins
    pub margins: Margins,

    /// Deflate content streams and embedded fonts
    pub compress: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            fonts: FontSet::default(),
            header: None,
            header_from_metadata: false,
            margins: Margins::default(),
            compress: true,
        }
    }
}

impl PdfOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font files.
    pub fn with_fonts(mut self, fonts: FontSet) -> Self {
        self.fonts = fonts;
        self
    }

    /// Use fonts from a directory holding the DejaVu Sans files.
    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fonts = FontSet::from_dir(dir.into());
        self
    }

    /// Set a fixed running header.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Derive the running header from document metadata.
    pub fn with_metadata_header(mut self, enabled: bool) -> Self {
        self.header_from_metadata = enabled;
        self
    }

    /// Set page margins.
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Enable or disable stream compression.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

/// Read text and metadata from a PDF file.
pub fn open_pdf<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::from_open(e, path))?;
    read_pdf(&data)
}
