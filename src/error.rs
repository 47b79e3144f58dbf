//! Error types for offerdoc library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for offerdoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building, editing or saving documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A required external file (input document, font) cannot be opened.
    #[error("Required resource is missing: {}", .0.display())]
    ResourceMissing(PathBuf),

    /// The file format is not recognized as DOCX or PDF.
    #[error("Unknown file format: expected DOCX or PDF")]
    UnknownFormat,

    /// No writer is registered for the requested output.
    #[error("Unsupported output format: {0}")]
    UnsupportedOutput(String),

    /// A selector that must match exactly one row matched zero or several.
    #[error("Selector {selector} matched {matches} rows, expected exactly one")]
    MalformedTarget {
        /// Human-readable selector description
        selector: String,
        /// Number of rows that matched
        matches: usize,
    },

    /// A marker or replacement source is empty.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// A required verification step did not find its marker.
    #[error("Verification failed: marker not found: {0}")]
    VerificationFailed(String),

    /// The output path already exists and overwriting was not requested.
    #[error("Output already exists: {}", .0.display())]
    OutputExists(PathBuf),

    /// A required part is absent from the DOCX package.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// Error reading or writing the ZIP container.
    #[error("ZIP container error: {0}")]
    Zip(String),

    /// Error parsing or writing XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// Error producing or reading PDF structure.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Error decoding font data.
    #[error("Font error: {0}")]
    Font(String),

    /// An amount does not fit the money range.
    #[error("Amount out of range: {0}")]
    AmountOverflow(String),

    /// Error in a proposal spec or edit plan file.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error during rendering (text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::Zip(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Pdf(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Render(format!("JSON serialization error: {}", err))
    }
}

impl Error {
    /// Map a "not found" I/O error on `path` to [`Error::ResourceMissing`].
    pub(crate) fn from_open(err: io::Error, path: impl Into<PathBuf>) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Error::ResourceMissing(path.into())
        } else {
            Error::Io(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MalformedTarget {
            selector: "[\"MES5324\"]".to_string(),
            matches: 2,
        };
        assert_eq!(
            err.to_string(),
            "Selector [\"MES5324\"] matched 2 rows, expected exactly one"
        );

        let err = Error::ResourceMissing(PathBuf::from("/fonts/DejaVuSans.ttf"));
        assert_eq!(
            err.to_string(),
            "Required resource is missing: /fonts/DejaVuSans.ttf"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_not_found_becomes_resource_missing() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = Error::from_open(io_err, "v9.docx");
        assert!(matches!(err, Error::ResourceMissing(p) if p == PathBuf::from("v9.docx")));
    }
}
