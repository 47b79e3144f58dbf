//! Input format detection by magic bytes.

use crate::error::{Error, Result};
use crate::model::Document;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// ZIP local file header: `PK\x03\x04`
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
/// PDF magic bytes: `%PDF-`
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// Word-processor package
    Docx,
    /// Portable Document Format
    Pdf,
}

impl DocumentFormat {
    /// Canonical file extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pdf => "pdf",
        }
    }

    /// Format implied by a path's extension.
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "docx" => Some(DocumentFormat::Docx),
            "pdf" => Some(DocumentFormat::Pdf),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFormat::Docx => write!(f, "DOCX"),
            DocumentFormat::Pdf => write!(f, "PDF"),
        }
    }
}

/// Detect the format of a file from its first bytes.
///
/// # Example
/// ```no_run
/// use offerdoc::detect::{detect_format_from_path, DocumentFormat};
///
/// let format = detect_format_from_path("Commercial_Proposal_v12.docx").unwrap();
/// assert_eq!(format, DocumentFormat::Docx);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<DocumentFormat> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| Error::from_open(e, path))?;
    let mut header = [0u8; 8];
    let n = file.read(&mut header)?;
    detect_format_from_bytes(&header[..n])
}

/// Detect the format from a byte prefix.
///
/// Any ZIP container is taken as DOCX; the package reader reports a missing
/// main part if it is not one.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocumentFormat> {
    if data.starts_with(ZIP_MAGIC) {
        Ok(DocumentFormat::Docx)
    } else if data.starts_with(PDF_MAGIC) {
        Ok(DocumentFormat::Pdf)
    } else {
        Err(Error::UnknownFormat)
    }
}

/// Parse document bytes of either format.
pub fn read_bytes(data: &[u8]) -> Result<Document> {
    match detect_format_from_bytes(data)? {
        DocumentFormat::Docx => crate::docx::read_docx(data),
        DocumentFormat::Pdf => crate::pdf::read_pdf(data),
    }
}

/// Open a document file of either format.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::from_open(e, path))?;
    let doc = read_bytes(&data)?;
    log::info!("Loaded {} ({} blocks)", path.display(), doc.blocks.len());
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_pdf() {
        let data = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3";
        assert_eq!(detect_format_from_bytes(data).unwrap(), DocumentFormat::Pdf);
    }

    #[test]
    fn test_detect_docx() {
        let data = b"PK\x03\x04\x14\x00\x06\x00";
        assert_eq!(detect_format_from_bytes(data).unwrap(), DocumentFormat::Docx);
    }

    #[test]
    fn test_detect_invalid_format() {
        assert!(matches!(
            detect_format_from_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(detect_format_from_bytes(b"%PD"), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DocumentFormat::from_extension("out/Offer_v3.PDF"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(DocumentFormat::from_extension("offer.doc"), None);
        assert_eq!(DocumentFormat::Docx.extension(), "docx");
    }

    #[test]
    fn test_open_missing_file() {
        assert!(matches!(
            open("/nonexistent/offer.docx"),
            Err(Error::ResourceMissing(_))
        ));
    }
}
