//! Exact cell overwrite.

use super::{Change, EditReport, Location, RowRef, RowSelector};
use crate::error::{Error, Result};
use crate::model::Document;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Overwrite cells whose whole text equals a literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellOverwrite {
    /// Rows to look in
    pub rows: RowSelector,
    /// Exact (trimmed) cell text to replace
    pub equals: String,
    /// New cell text
    pub replacement: String,
}

impl CellOverwrite {
    /// Create an overwrite.
    pub fn new(
        rows: RowSelector,
        equals: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            rows,
            equals: equals.into(),
            replacement: replacement.into(),
        }
    }

    /// Apply to `doc`.
    pub fn apply(&self, doc: &mut Document) -> Result<EditReport> {
        overwrite_cells(doc, &self.rows, &self.equals, &self.replacement)
    }
}

/// In every row picked by `rows`, overwrite cells whose trimmed text is
/// exactly `equals`.
///
/// A cell containing `equals` only as a substring is untouched. A rewritten
/// cell collapses to one paragraph with one run.
pub fn overwrite_cells(
    doc: &mut Document,
    rows: &RowSelector,
    equals: &str,
    replacement: &str,
) -> Result<EditReport> {
    let target = equals.trim();
    if target.is_empty() {
        return Err(Error::InvalidSelector("cell overwrite target is empty".into()));
    }
    let selected: BTreeSet<RowRef> = rows.select(doc)?.into_iter().collect();

    let mut report = EditReport::new();
    for (t, table) in doc.tables_mut().enumerate() {
        for (r, row) in table.rows.iter_mut().enumerate() {
            if !selected.contains(&RowRef { table: t, row: r }) {
                continue;
            }
            for c in rows.scoped_indexes(row) {
                let cell = &mut row.cells[c];
                let before = cell.plain_text();
                if before.trim() != target {
                    continue;
                }
                cell.set_text(replacement);
                report.record(Change::CellOverwritten {
                    location: Location::Cell {
                        table: t,
                        row: r,
                        cell: c,
                    },
                    before,
                    after: replacement.to_string(),
                });
            }
        }
    }

    Ok(report.finish(|| format!("overwrite {:?} in rows {}", equals, rows)))
}
