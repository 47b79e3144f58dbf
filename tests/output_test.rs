//! Saving, writer dispatch and version naming.

use offerdoc::model::Paragraph;
use offerdoc::output::{DocumentWriter, SaveOptions, WriterRegistry};
use offerdoc::version::{latest_version, next_after, next_path};
use offerdoc::{Document, Error, Result};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

/// Writer that emits the plain text of the document.
struct TextWriter;

impl DocumentWriter for TextWriter {
    fn supported_extensions(&self) -> &[&str] {
        &["txt"]
    }

    fn name(&self) -> &str {
        "text"
    }

    fn write_bytes(&self, doc: &Document, _options: &SaveOptions) -> Result<Vec<u8>> {
        Ok(doc.plain_text().into_bytes())
    }
}

fn sample() -> Document {
    let mut doc = Document::new();
    doc.push(Paragraph::with_text("Section X"));
    doc
}

#[test]
fn test_custom_writer_registration() {
    let dir = TempDir::new().unwrap();
    let mut registry = WriterRegistry::new();
    registry.register(Arc::new(TextWriter));

    assert!(registry.supports("TXT"));
    assert!(!registry.supports("docx"));
    assert_eq!(registry.supported_extensions(), vec!["txt"]);

    let path = dir.path().join("Offer_v1.txt");
    registry
        .save(&sample(), &path, &SaveOptions::default())
        .unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "Section X");
}

#[test]
fn test_save_never_clobbers_by_default() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Commercial_Proposal_v12.docx");
    fs::write(&path, b"previous version").unwrap();

    let err = offerdoc::save(&mut sample(), &path, &SaveOptions::default()).unwrap_err();
    assert!(matches!(err, Error::OutputExists(_)));
    assert_eq!(fs::read(&path).unwrap(), b"previous version");

    offerdoc::save(&mut sample(), &path, &SaveOptions::new().with_overwrite(true)).unwrap();
    assert!(offerdoc::open(&path).is_ok());
}

#[test]
fn test_version_chain() {
    let dir = TempDir::new().unwrap();
    let first = next_path(dir.path(), "Commercial_Proposal", "docx").unwrap();
    assert_eq!(first.file_name().unwrap(), "Commercial_Proposal_v1.docx");

    let mut doc = sample();
    let mut current = first;
    for _ in 0..3 {
        offerdoc::save(&mut doc, &current, &SaveOptions::default()).unwrap();
        current = next_after(&current).unwrap();
    }
    assert_eq!(current.file_name().unwrap(), "Commercial_Proposal_v4.docx");
    assert_eq!(doc.metadata.revision, Some(3));
    assert_eq!(
        latest_version(dir.path(), "Commercial_Proposal", "docx").unwrap(),
        Some(3)
    );
}

#[test]
fn test_next_after_skips_existing_versions() {
    let dir = TempDir::new().unwrap();
    for name in ["Offer_v2.docx", "Offer_v10.docx", "Offer_v3.pdf"] {
        fs::write(dir.path().join(name), b"").unwrap();
    }
    let next = next_after(&dir.path().join("Offer_v2.docx")).unwrap();
    assert_eq!(next, dir.path().join("Offer_v11.docx"));

    let pdf = next_after(&dir.path().join("Offer_v3.pdf")).unwrap();
    assert_eq!(pdf, dir.path().join("Offer_v4.pdf"));
}

#[test]
fn test_unknown_extension_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Offer_v1.odt");
    let err = offerdoc::save(&mut sample(), &path, &SaveOptions::default()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedOutput(_)));
    assert!(!path.exists());
}
