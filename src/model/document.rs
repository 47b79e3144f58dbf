//! Document-level types.

use super::{Block, Paragraph, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A proposal document: an ordered sequence of body blocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (title, author, revision, etc.)
    pub metadata: Metadata,

    /// Body blocks in reading order
    pub blocks: Vec<Block>,

    /// Page footer; `InlineContent::PageNumber` is filled in per page
    pub footer: Option<Paragraph>,

    /// Package parts carried over from a loaded file
    #[serde(skip)]
    pub source: Option<SourcePackage>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block.
    pub fn push(&mut self, block: impl Into<Block>) {
        self.blocks.push(block.into());
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Body paragraphs in document order (table cells excluded).
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Body tables in document order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Mutable body tables in document order.
    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.blocks.iter_mut().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.plain_text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,

    /// Version counter of the proposal, stored alongside the document
    pub revision: Option<u32>,
}

impl Metadata {
    /// Create metadata with a title.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

/// Raw parts of a loaded word-processor package.
///
/// Parts other than the body are written back unchanged on save.
#[derive(Debug, Clone, Default)]
pub struct SourcePackage {
    /// Part name → bytes, excluding the main document part
    pub parts: BTreeMap<String, Vec<u8>>,

    /// Original opening tag of the document root, with its namespaces
    pub root_tag: Option<String>,

    /// Original body-level section properties, verbatim
    pub section_properties: Option<String>,
}

impl SourcePackage {
    /// Check whether a part exists.
    pub fn has_part(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableRow;

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.paragraphs().count(), 0);
    }

    #[test]
    fn test_document_traversal() {
        let mut doc = Document::new();
        doc.push(Paragraph::with_text("1. ОПИСАНИЕ ПРОЕКТА"));
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["ИБП", "1"]));
        doc.push(table);
        doc.push(Block::PageBreak);
        doc.push(Paragraph::with_text("2. ПЛАН"));

        assert_eq!(doc.paragraphs().count(), 2);
        assert_eq!(doc.tables().count(), 1);
        assert_eq!(
            doc.plain_text(),
            "1. ОПИСАНИЕ ПРОЕКТА\n\nИБП\t1\n\n2. ПЛАН"
        );
    }
}
