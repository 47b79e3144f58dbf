//! Marker presence checks.

use crate::error::{Error, Result};
use crate::model::Document;
use serde::Serialize;

/// Characters kept per echoed paragraph.
pub const ECHO_WIDTH: usize = 50;

/// Outcome of a presence check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    /// The literal searched for
    pub marker: String,

    /// Whether it was found
    pub found: bool,

    /// Index of the first body paragraph containing it
    pub paragraph_index: Option<usize>,

    /// Paragraphs from the match on, each truncated
    pub context: Vec<String>,
}

/// Scan body paragraphs in order and stop at the first one containing
/// `marker`.
///
/// When found, up to `echo` paragraphs starting at the match are returned in
/// [`Verification::context`], each cut to [`ECHO_WIDTH`] characters.
pub fn verify(doc: &Document, marker: &str, echo: usize) -> Result<Verification> {
    if marker.is_empty() {
        return Err(Error::InvalidSelector("verification marker is empty".into()));
    }

    let index = doc.paragraphs().position(|p| p.plain_text().contains(marker));

    let context = match index {
        Some(i) => doc
            .paragraphs()
            .skip(i)
            .take(echo)
            .map(|p| truncate(&p.plain_text(), ECHO_WIDTH))
            .collect(),
        None => Vec::new(),
    };

    match index {
        Some(i) => log::info!("found {:?} in paragraph {}", marker, i + 1),
        None => log::info!("{:?} not found", marker),
    }

    Ok(Verification {
        marker: marker.to_string(),
        found: index.is_some(),
        paragraph_index: index,
        context,
    })
}

fn truncate(text: &str, width: usize) -> String {
    match text.char_indices().nth(width) {
        Some((pos, _)) => text[..pos].to_string(),
        None => text.to_string(),
    }
}
