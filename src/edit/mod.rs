//! In-place mutations of a loaded document.
//!
//! Content is located by literal text match. Every mutation visits the whole
//! document; a pass that matches nothing is not an error and is only recorded
//! as [`Change::NoMatch`] in the returned [`EditReport`].
//!
//! # Example
//!
//! ```
//! use offerdoc::edit::{self, RowSelector};
//! use offerdoc::model::{Document, Table, TableRow};
//!
//! let mut table = Table::new();
//! table.add_row(TableRow::from_strings(["Switch MES5324", "2", "499 000", "998 000"]));
//! let mut doc = Document::new();
//! doc.push(table);
//!
//! edit::replace_text(&mut doc, "MES5324", "MES2300-24").unwrap();
//! edit::overwrite_cells(&mut doc, &RowSelector::containing("MES2300-24"), "2", "1").unwrap();
//! assert_eq!(doc.tables().next().unwrap().rows[0].cell_texts()[1], "1");
//! ```

mod cells;
pub mod plan;
mod replace;
mod rows;
mod selector;
mod totals;

pub use cells::{overwrite_cells, CellOverwrite};
pub use plan::{EditPlan, EditStep, Editor, PlanReport};
pub use replace::{replace_all, replace_in_rows, replace_text, Replacement};
pub use rows::delete_rows;
pub use selector::{Marker, RowRef, RowSelector};
pub use totals::{recalculate_totals, TotalsSpec};

use serde::Serialize;
use std::fmt;

/// Where a paragraph was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "in", rename_all = "snake_case")]
pub enum Location {
    /// Body paragraph (index among body paragraphs)
    Body {
        /// Paragraph index
        paragraph: usize,
    },
    /// Paragraph inside a table cell
    Cell {
        /// Body table index
        table: usize,
        /// Row index
        row: usize,
        /// Cell index within the row
        cell: usize,
    },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Body { .. } => f.write_str("paragraph"),
            Location::Cell { table, row, cell } => {
                write!(f, "table {}, row {}, cell {}", table + 1, row + 1, cell + 1)
            }
        }
    }
}

/// One applied change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum Change {
    /// Paragraph text replaced
    Replaced {
        /// Where
        location: Location,
        /// Text before
        before: String,
        /// Text after
        after: String,
    },
    /// Table row removed
    RowDeleted {
        /// Body table index
        table: usize,
        /// Row index before removal
        row: usize,
        /// Row text (cells joined by tabs)
        text: String,
    },
    /// Cell text overwritten
    CellOverwritten {
        /// Cell position
        location: Location,
        /// Text before
        before: String,
        /// Text after
        after: String,
    },
    /// Total cell rewritten
    TotalRecalculated {
        /// Body table index
        table: usize,
        /// Total row index
        row: usize,
        /// Text before
        before: String,
        /// Text after
        after: String,
    },
    /// A pass found nothing to change
    NoMatch {
        /// Description of the pass
        operation: String,
    },
}

impl Change {
    /// Whether this entry records an actual modification.
    pub fn is_modification(&self) -> bool {
        !matches!(self, Change::NoMatch { .. })
    }

    fn log(&self) {
        log::info!("{}", self);
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Replaced {
                location,
                before,
                after,
            } => write!(f, "Replaced in {}: {} -> {}", location, before, after),
            Change::RowDeleted { table, row, text } => write!(
                f,
                "Deleted row {} of table {}: {}",
                row + 1,
                table + 1,
                text.replace('\t', " | ")
            ),
            Change::CellOverwritten {
                location,
                before,
                after,
            } => write!(f, "Overwrote {}: {} -> {}", location, before, after),
            Change::TotalRecalculated {
                table,
                before,
                after,
                ..
            } => write!(f, "Recalculated total of table {}: {} -> {}", table + 1, before, after),
            Change::NoMatch { operation } => write!(f, "No match: {}", operation),
        }
    }
}

/// Changes made by one or more passes, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditReport {
    /// Change log
    pub changes: Vec<Change>,
}

impl EditReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log a change.
    pub fn record(&mut self, change: Change) {
        change.log();
        self.changes.push(change);
    }

    /// Record a no-match entry unless the pass changed something.
    pub(crate) fn finish(mut self, operation: impl FnOnce() -> String) -> Self {
        if self.changes.is_empty() {
            self.record(Change::NoMatch {
                operation: operation(),
            });
        }
        self
    }

    /// Append another report.
    pub fn merge(&mut self, other: EditReport) {
        self.changes.extend(other.changes);
    }

    /// Number of actual modifications.
    pub fn modifications(&self) -> usize {
        self.changes.iter().filter(|c| c.is_modification()).count()
    }

    /// Whether nothing was modified.
    pub fn is_unchanged(&self) -> bool {
        self.modifications() == 0
    }
}
