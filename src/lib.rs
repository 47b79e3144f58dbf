//! # offerdoc
//!
//! Build and edit versioned commercial-proposal documents.
//!
//! A proposal is created from a script of sections, or loaded from a prior
//! `.docx`/`.pdf` version. It is then edited in place by literal text match
//! and saved under the next version name.
//!
//! ## Quick Start
//!
//! ```no_run
//! use offerdoc::edit::{Editor, RowSelector};
//! use offerdoc::output::SaveOptions;
//!
//! fn main() -> offerdoc::Result<()> {
//!     let input = std::path::Path::new("Commercial_Proposal_v9.docx");
//!     let mut doc = offerdoc::open(input)?;
//!
//!     Editor::new()
//!         .replace("MES5324", "MES2300-24")
//!         .overwrite_cell(RowSelector::containing("MES2300-24"), "2", "1")
//!         .verify("MES2300-24")
//!         .apply(&mut doc)?;
//!
//!     let output = offerdoc::version::next_after(input)?;
//!     offerdoc::save(&mut doc, &output, &SaveOptions::default())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Builder**: title, headings, bullets and priced item tables with a
//!   derived total
//! - **Mutations**: text replacement, row deletion, exact cell overwrite,
//!   explicit total recalculation
//! - **Verification**: short-circuit marker search with context echo
//! - **Formats**: DOCX in and out, PDF out with embedded Unicode fonts, PDF
//!   text extraction for verification
//! - **Versioning**: `<stem>_v<N>.<ext>` names and no-clobber saves

pub mod builder;
pub mod detect;
pub mod docx;
pub mod edit;
pub mod error;
pub mod model;
pub mod output;
pub mod pdf;
pub mod render;
pub mod verify;
pub mod version;

// Re-export commonly used types
pub use builder::{ProposalSpec, Section, StyleSheet};
pub use detect::{detect_format_from_bytes, detect_format_from_path, DocumentFormat};
pub use edit::{EditPlan, EditReport, Editor, RowSelector};
pub use error::{Error, Result};
pub use model::{
    Alignment, Block, Document, InlineContent, ItemTable, LineItem, Metadata, Money, Paragraph,
    ParagraphStyle, Table, TableCell, TableRow, TextRun, TextStyle,
};
pub use output::{DocumentWriter, SaveOptions, WriterRegistry};
pub use pdf::{FontSet, PdfOptions};
pub use verify::{verify, Verification};

use std::path::Path;

/// Open a DOCX or PDF file; the format is detected from its first bytes.
///
/// # Example
///
/// ```no_run
/// let doc = offerdoc::open("Commercial_Proposal_v12.docx").unwrap();
/// println!("{} tables", doc.tables().count());
/// ```
pub fn open<P: AsRef<Path>>(path: P) -> Result<Document> {
    detect::open(path)
}

/// Parse DOCX or PDF bytes.
pub fn open_bytes(data: &[u8]) -> Result<Document> {
    detect::read_bytes(data)
}

/// Save a document; the format follows the extension of `path`.
///
/// A versioned name (`Offer_v13.pdf`) is recorded as the document revision
/// before writing. Existing files are kept unless
/// [`SaveOptions::overwrite`] is set.
pub fn save<P: AsRef<Path>>(doc: &mut Document, path: P, options: &SaveOptions) -> Result<()> {
    let path = path.as_ref();
    version::stamp_revision(doc, path);
    WriterRegistry::with_defaults().save(doc, path, options)
}

/// Build a proposal from a TOML script and save it.
///
/// # Example
///
/// ```no_run
/// use offerdoc::SaveOptions;
///
/// offerdoc::generate("proposal.toml", "Commercial_Proposal_v1.docx", &SaveOptions::default())
///     .unwrap();
/// ```
pub fn generate<P: AsRef<Path>, Q: AsRef<Path>>(
    spec: P,
    output: Q,
    options: &SaveOptions,
) -> Result<Document> {
    let mut doc = ProposalSpec::from_file(spec)?.build();
    save(&mut doc, output, options)?;
    Ok(doc)
}

/// Check whether a file contains `marker` in a body paragraph.
pub fn verify_file<P: AsRef<Path>>(path: P, marker: &str, echo: usize) -> Result<Verification> {
    let doc = open(path)?;
    verify(&doc, marker, echo)
}

/// Extract plain text from a DOCX or PDF file.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = open(path)?;
    render::to_text(&doc, &render::TextOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_bytes_empty_data() {
        assert!(matches!(open_bytes(&[]), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_open_bytes_unknown_magic() {
        let data = [0xFF, 0xFE, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05];
        assert!(matches!(open_bytes(&data), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_open_bytes_truncated_zip() {
        assert!(open_bytes(b"PK\x03\x04").is_err());
    }

    #[test]
    fn test_save_stamps_revision() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("Commercial_Proposal_v4.docx");
        let mut doc = Document::new();
        doc.push(Paragraph::with_text("Section X"));

        save(&mut doc, &path, &SaveOptions::default()).unwrap();
        assert_eq!(doc.metadata.revision, Some(4));

        let back = open(&path).unwrap();
        assert_eq!(back.metadata.revision, Some(4));
        assert!(verify_file(&path, "Section X", 0).unwrap().found);
        assert!(!verify_file(&path, "Section Z", 0).unwrap().found);
    }
}
