//! Document model types for proposal content.
//!
//! This module defines the in-memory representation shared by the builder,
//! the mutators and the DOCX/PDF collaborators. Content has no stable node
//! identifiers; it is addressed by its text and, optionally, by table and
//! column position.

mod block;
mod document;
mod items;
mod markup;
mod money;
mod paragraph;
mod table;

pub use block::Block;
pub use document::{Document, Metadata, SourcePackage};
pub use items::{ItemTable, LineItem, TotalPlacement};
pub use markup::SourceMarkup;
pub use money::Money;
pub use paragraph::{
    Alignment, Color, InlineContent, Paragraph, ParagraphStyle, TextRun, TextStyle,
};
pub use table::{Table, TableCell, TableRow};
