//! Plain text rendering.

use crate::error::Result;
use crate::model::{Block, Document, Table};

/// Options for plain text output.
#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    /// Prefix paragraphs and rows with the indexes selectors use
    /// (`[p3]`, `[t0 r2]`)
    pub show_indices: bool,
}

impl TextOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable index prefixes.
    pub fn with_indices(mut self, show: bool) -> Self {
        self.show_indices = show;
        self
    }
}

/// Convert a document to plain text.
///
/// Table rows are written one per line with cells separated by ` | `.
pub fn to_text(doc: &Document, options: &TextOptions) -> Result<String> {
    let mut output = String::new();
    let mut paragraph_index = 0;
    let mut table_index = 0;

    for block in &doc.blocks {
        match block {
            Block::Paragraph(p) => {
                if options.show_indices {
                    output.push_str(&format!("[p{}] ", paragraph_index));
                }
                if let Some(level) = p.heading_level() {
                    output.push_str(&"#".repeat(level as usize));
                    output.push(' ');
                }
                output.push_str(&p.plain_text());
                output.push('\n');
                paragraph_index += 1;
            }
            Block::Table(table) => {
                render_table(&mut output, table, table_index, options);
                table_index += 1;
            }
            Block::PageBreak => output.push_str("\n\u{000C}\n"),
        }
    }

    Ok(output.trim().to_string())
}

fn render_table(output: &mut String, table: &Table, index: usize, options: &TextOptions) {
    output.push('\n');
    for (r, row) in table.rows.iter().enumerate() {
        if options.show_indices {
            output.push_str(&format!("[t{} r{}] ", index, r));
        }
        let cells: Vec<String> = row
            .cells
            .iter()
            .map(|c| c.plain_text().replace('\n', " ").trim().to_string())
            .collect();
        output.push_str(&cells.join(" | "));
        output.push('\n');
    }
    output.push('\n');
}
