//! Table types.

use super::{Alignment, Color, Paragraph, SourceMarkup, TextRun};
use serde::{Deserialize, Serialize};

/// A table structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table
    pub rows: Vec<TableRow>,

    /// Relative column widths (optional)
    pub column_widths: Option<Vec<f32>>,

    /// Named table style id (e.g. "TableGrid")
    pub style_id: Option<String>,

    /// Markup this table was read from
    #[serde(skip)]
    pub markup: Option<SourceMarkup>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            column_widths: None,
            style_id: None,
            markup: None,
        }
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of grid columns (widest row, spans included).
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.cells.iter().map(|c| c.colspan.max(1) as usize).sum())
            .max()
            .unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of leading header rows.
    pub fn header_rows(&self) -> usize {
        self.rows.iter().take_while(|r| r.is_header).count()
    }

    /// Get header rows.
    pub fn header(&self) -> &[TableRow] {
        &self.rows[..self.header_rows()]
    }

    /// Get body rows (non-header).
    pub fn body(&self) -> &[TableRow] {
        &self.rows[self.header_rows()..]
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if the table has merged cells.
    pub fn has_merged_cells(&self) -> bool {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .any(|c| c.colspan > 1)
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

/// A table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row
    pub cells: Vec<TableCell>,

    /// Whether this is a header row (repeated on page breaks)
    pub is_header: bool,

    /// Markup this row was read from
    #[serde(skip)]
    pub markup: Option<SourceMarkup>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            is_header: false,
            markup: None,
        }
    }

    /// Create a header row.
    pub fn header(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            is_header: true,
            markup: None,
        }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.plain_text())
            .collect::<Vec<_>>()
            .join("\t")
    }

    /// Text of each cell.
    pub fn cell_texts(&self) -> Vec<String> {
        self.cells.iter().map(|c| c.plain_text()).collect()
    }
}

/// A table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell content (paragraphs)
    pub content: Vec<Paragraph>,

    /// Number of grid columns this cell spans
    pub colspan: u8,

    /// Cell background
    pub shading: Option<Color>,

    /// Markup this cell was read from
    #[serde(skip)]
    pub markup: Option<SourceMarkup>,
}

impl TableCell {
    /// Create a new cell with text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_content(vec![Paragraph::with_text(text)])
    }

    /// Create a cell holding a single styled run.
    pub fn run(run: TextRun) -> Self {
        let mut p = Paragraph::new();
        p.add_run(run);
        Self::with_content(vec![p])
    }

    /// Create an empty cell.
    pub fn empty() -> Self {
        Self::with_content(Vec::new())
    }

    /// Create a cell with multiple paragraphs.
    pub fn with_content(content: Vec<Paragraph>) -> Self {
        Self {
            content,
            colspan: 1,
            shading: None,
            markup: None,
        }
    }

    /// Set colspan and return self.
    pub fn colspan(mut self, span: u8) -> Self {
        self.colspan = span;
        self
    }

    /// Set alignment of every paragraph and return self.
    pub fn align(mut self, alignment: Alignment) -> Self {
        for p in &mut self.content {
            p.style.alignment = alignment;
        }
        self
    }

    /// Set background color and return self.
    pub fn shade(mut self, color: Color) -> Self {
        self.shading = Some(color);
        self
    }

    /// Get plain text content; paragraphs are joined by newlines.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|p| p.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace the cell text, collapsing it to one paragraph with one run.
    ///
    /// The first paragraph's style (alignment, spacing) is kept.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let mut first = if self.content.is_empty() {
            Paragraph::new()
        } else {
            self.content.swap_remove(0)
        };
        first.set_text(text);
        self.content = vec![first];
    }

    /// Check if the cell is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() || self.plain_text().trim().is_empty()
    }

    /// Check if this cell spans multiple columns.
    pub fn is_merged(&self) -> bool {
        self.colspan > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_new() {
        let table = Table::new();
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_table_with_data() {
        let mut table = Table::new();
        table.add_row(TableRow::header(vec![
            TableCell::text("Наименование"),
            TableCell::text("Кол-во"),
        ]));
        table.add_row(TableRow::from_strings(["ИБП Ippon", "1"]));
        table.add_row(TableRow::from_strings(["Шкаф 42U", "1"]));

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.header().len(), 1);
        assert_eq!(table.body().len(), 2);
    }

    #[test]
    fn test_merged_cells() {
        let mut table = Table::new();
        table.add_row(TableRow::new(vec![
            TableCell::text("ИТОГО:").colspan(3),
            TableCell::text("1 000"),
        ]));

        assert!(table.has_merged_cells());
        assert_eq!(table.column_count(), 4);
    }

    #[test]
    fn test_cell_text_joins_paragraphs() {
        let cell = TableCell::with_content(vec![
            Paragraph::with_text("Сервер YADRO"),
            Paragraph::with_text("512GB RAM"),
        ]);
        assert_eq!(cell.plain_text(), "Сервер YADRO\n512GB RAM");
    }

    #[test]
    fn test_cell_set_text_keeps_alignment() {
        let mut cell = TableCell::with_content(vec![
            Paragraph::with_text("998 000"),
            Paragraph::with_text("с НДС"),
        ])
        .align(Alignment::Right);

        cell.set_text("499 000");
        assert_eq!(cell.content.len(), 1);
        assert_eq!(cell.plain_text(), "499 000");
        assert_eq!(cell.content[0].style.alignment, Alignment::Right);
    }
}
