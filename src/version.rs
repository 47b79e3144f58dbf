//! Versioned file names: `<stem>_v<N>.<ext>`.

use crate::error::Result;
use crate::model::Document;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<stem>.+)_v(?P<version>\d+)\.(?P<ext>[^.]+)$").expect("valid pattern")
    })
}

/// A parsed versioned file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedName {
    /// Name before `_v`
    pub stem: String,
    /// Version number
    pub version: u32,
    /// Extension without the dot
    pub extension: String,
}

impl VersionedName {
    /// Create a name.
    pub fn new(stem: impl Into<String>, version: u32, extension: impl Into<String>) -> Self {
        Self {
            stem: stem.into(),
            version,
            extension: extension.into(),
        }
    }

    /// Parse a bare file name such as `Commercial_Proposal_v12.docx`.
    pub fn parse(file_name: &str) -> Option<Self> {
        let caps = pattern().captures(file_name)?;
        Some(Self {
            stem: caps["stem"].to_string(),
            version: caps["version"].parse().ok()?,
            extension: caps["ext"].to_string(),
        })
    }

    /// Parse the file-name component of a path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(Self::parse)
    }

    /// The following version.
    pub fn next(&self) -> Self {
        Self {
            version: self.version + 1,
            ..self.clone()
        }
    }

    /// Same name and version with another extension.
    pub fn with_extension(&self, extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            ..self.clone()
        }
    }

    /// Formatted file name.
    pub fn file_name(&self) -> String {
        format!("{}_v{}.{}", self.stem, self.version, self.extension)
    }
}

/// Highest version of `<stem>_v<N>.<ext>` in `dir`, compared numerically.
pub fn latest_version(dir: &Path, stem: &str, extension: &str) -> Result<Option<u32>> {
    let mut latest = None;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(parsed) = name.to_str().and_then(VersionedName::parse) else {
            continue;
        };
        if parsed.stem == stem && parsed.extension == extension {
            latest = latest.max(Some(parsed.version));
        }
    }
    Ok(latest)
}

/// Path of the version after the latest one in `dir`, or v1 when none exists.
pub fn next_path(dir: &Path, stem: &str, extension: &str) -> Result<PathBuf> {
    let version = latest_version(dir, stem, extension)?.map_or(1, |v| v + 1);
    let name = VersionedName::new(stem, version, extension);
    log::debug!("next version in {}: {}", dir.display(), name.file_name());
    Ok(dir.join(name.file_name()))
}

/// Next free version for a versioned input path; other names get `_v1`.
///
/// The directory is scanned, so the result is never an existing version
/// even when the input is not the latest one.
pub fn next_after(input: &Path) -> Result<PathBuf> {
    let dir = match input.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let (stem, extension) = match VersionedName::from_path(input) {
        Some(v) => (v.stem, v.extension),
        None => {
            let stem = input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("document")
                .to_string();
            let ext = input
                .extension()
                .and_then(|s| s.to_str())
                .unwrap_or("docx")
                .to_string();
            (stem, ext)
        }
    };
    next_path(&dir, &stem, &extension)
}

/// Record the version in `path` as the document revision and bump the
/// modification time. Returns the revision when the name is versioned.
pub fn stamp_revision(doc: &mut Document, path: &Path) -> Option<u32> {
    doc.metadata.modified = Some(chrono::Utc::now());
    let version = VersionedName::from_path(path)?.version;
    doc.metadata.revision = Some(version);
    Some(version)
}
