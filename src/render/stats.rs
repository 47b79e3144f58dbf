//! Document statistics for inspection output.

use crate::edit::TotalsSpec;
use crate::model::{Block, Document, Money, Paragraph};
use serde::{Deserialize, Serialize};

/// Counts collected from a document tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Body paragraphs
    pub paragraph_count: u32,

    /// Body paragraphs with a heading level
    pub heading_count: u32,

    /// Tables
    pub table_count: u32,

    /// Table rows across all tables
    pub row_count: u32,

    /// Rows whose text carries a total label (`ИТОГО`, `Итого`, `TOTAL`)
    pub total_row_count: u32,

    /// Hard page breaks
    pub page_break_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl DocumentStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk the document once and count everything.
    pub fn collect(doc: &Document) -> Self {
        let mut stats = Self::new();
        let totals = TotalsSpec::default();
        for block in &doc.blocks {
            match block {
                Block::Paragraph(p) if p.is_page_break() => stats.page_break_count += 1,
                Block::Paragraph(p) => stats.add_paragraph(p),
                Block::Table(table) => {
                    stats.table_count += 1;
                    for row in &table.rows {
                        stats.row_count += 1;
                        if totals.is_total_row(row) {
                            stats.total_row_count += 1;
                        }
                        stats.count_text(&row.plain_text());
                    }
                }
                Block::PageBreak => stats.page_break_count += 1,
            }
        }
        stats
    }

    fn add_paragraph(&mut self, p: &Paragraph) {
        self.paragraph_count += 1;
        if p.is_heading() {
            self.heading_count += 1;
        }
        self.count_text(&p.plain_text());
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }
}

/// Amounts of every total row with a parsable amount cell, in order.
pub fn total_amounts(doc: &Document) -> Vec<Money> {
    let totals = TotalsSpec::default();
    doc.tables()
        .flat_map(|t| t.rows.iter())
        .filter(|row| totals.is_total_row(row))
        .filter_map(|row| totals.amount(row))
        .collect()
}
