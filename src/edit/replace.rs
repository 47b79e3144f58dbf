//! Literal text replacement.

use super::{Change, EditReport, Location, RowRef, RowSelector};
use crate::error::{Error, Result};
use crate::model::{Block, Document, Paragraph};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One `from → to` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    /// Literal to find
    pub from: String,
    /// Replacement text
    pub to: String,
}

impl Replacement {
    /// Create a pair.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

fn check_source(old: &str) -> Result<()> {
    if old.is_empty() {
        return Err(Error::InvalidSelector(
            "replacement source text is empty".into(),
        ));
    }
    Ok(())
}

/// Rewrite `p` if it contains `old`; returns the texts before and after.
fn replace_in_paragraph(p: &mut Paragraph, old: &str, new: &str) -> Option<(String, String)> {
    let before = p.plain_text();
    if !before.contains(old) {
        return None;
    }
    let after = before.replace(old, new);
    p.set_text(after.clone());
    Some((before, after))
}

/// Replace every occurrence of `old` in body and table-cell paragraphs.
///
/// A paragraph that contains `old` is collapsed to a single run; formatting
/// that covered only part of it is lost.
pub fn replace_text(doc: &mut Document, old: &str, new: &str) -> Result<EditReport> {
    check_source(old)?;

    let mut report = EditReport::new();
    let mut paragraph_idx = 0;
    let mut table_idx = 0;

    for block in &mut doc.blocks {
        match block {
            Block::Paragraph(p) => {
                if let Some((before, after)) = replace_in_paragraph(p, old, new) {
                    report.record(Change::Replaced {
                        location: Location::Body {
                            paragraph: paragraph_idx,
                        },
                        before,
                        after,
                    });
                }
                paragraph_idx += 1;
            }
            Block::Table(table) => {
                for (r, row) in table.rows.iter_mut().enumerate() {
                    for (c, cell) in row.cells.iter_mut().enumerate() {
                        for p in &mut cell.content {
                            if let Some((before, after)) = replace_in_paragraph(p, old, new) {
                                report.record(Change::Replaced {
                                    location: Location::Cell {
                                        table: table_idx,
                                        row: r,
                                        cell: c,
                                    },
                                    before,
                                    after,
                                });
                            }
                        }
                    }
                }
                table_idx += 1;
            }
            Block::PageBreak => {}
        }
    }

    Ok(report.finish(|| format!("replace {:?}", old)))
}

/// Apply several pairs in order, each scanning the whole document.
pub fn replace_all(doc: &mut Document, pairs: &[Replacement]) -> Result<EditReport> {
    pairs.iter().try_for_each(|p| check_source(&p.from))?;

    let mut report = EditReport::new();
    for pair in pairs {
        report.merge(replace_text(doc, &pair.from, &pair.to)?);
    }
    Ok(report)
}

/// Replace `old` only inside cells of rows picked by `rows`.
///
/// When the selector has a column scope, only cells covering that column are
/// rewritten.
pub fn replace_in_rows(
    doc: &mut Document,
    rows: &RowSelector,
    old: &str,
    new: &str,
) -> Result<EditReport> {
    check_source(old)?;
    let selected: BTreeSet<_> = rows.select(doc)?.into_iter().collect();

    let mut report = EditReport::new();
    for (t, table) in doc.tables_mut().enumerate() {
        for (r, row) in table.rows.iter_mut().enumerate() {
            if !selected.contains(&RowRef { table: t, row: r }) {
                continue;
            }
            let scope = rows.scoped_indexes(row);
            for c in scope {
                for p in &mut row.cells[c].content {
                    if let Some((before, after)) = replace_in_paragraph(p, old, new) {
                        report.record(Change::Replaced {
                            location: Location::Cell {
                                table: t,
                                row: r,
                                cell: c,
                            },
                            before,
                            after,
                        });
                    }
                }
            }
        }
    }

    Ok(report.finish(|| format!("replace {:?} in rows {}", old, rows)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Table, TableRow, TextRun};

    fn doc() -> Document {
        let mut doc = Document::new();
        let mut p = Paragraph::new();
        p.add_run(TextRun::bold("Коммутатор: "));
        p.add_text("Eltex MES5324");
        doc.push(p);
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["Switch MES5324", "2", "499 000", "998 000"]));
        table.add_row(TableRow::from_strings(["ИБП Ippon", "1", "120 000", "120 000"]));
        doc.push(table);
        doc
    }

    #[test]
    fn test_replace_body_and_cells() {
        let mut doc = doc();
        let report = replace_text(&mut doc, "MES5324", "MES2300-24").unwrap();
        assert_eq!(report.modifications(), 2);

        let p = doc.paragraphs().next().unwrap();
        assert_eq!(p.plain_text(), "Коммутатор: Eltex MES2300-24");
        assert_eq!(p.content.len(), 1);
        assert_eq!(
            doc.tables().next().unwrap().rows[0].cell_texts()[0],
            "Switch MES2300-24"
        );
    }

    #[test]
    fn test_replace_is_idempotent_once_gone() {
        let mut doc = doc();
        replace_text(&mut doc, "MES5324", "MES2300-24").unwrap();
        let snapshot = doc.plain_text();
        let report = replace_text(&mut doc, "MES5324", "MES2300-24").unwrap();
        assert!(report.is_unchanged());
        assert_eq!(doc.plain_text(), snapshot);
    }

    #[test]
    fn test_no_match_is_not_an_error() {
        let mut doc = doc();
        let report = replace_text(&mut doc, "Huawei", "Eltex").unwrap();
        assert!(matches!(report.changes[0], Change::NoMatch { .. }));
    }

    #[test]
    fn test_empty_source_rejected() {
        let mut doc = doc();
        assert!(matches!(
            replace_text(&mut doc, "", "x"),
            Err(Error::InvalidSelector(_))
        ));
        let pairs = [Replacement::new("MES5324", "X"), Replacement::new("", "y")];
        assert!(replace_all(&mut doc, &pairs).is_err());
        // validation happens before any pair is applied
        assert!(doc.plain_text().contains("MES5324"));
    }

    #[test]
    fn test_replace_all_in_order() {
        let mut doc = doc();
        let pairs = [
            Replacement::new("MES5324", "MES2300-24"),
            Replacement::new("MES2300-24", "MES2324"),
        ];
        replace_all(&mut doc, &pairs).unwrap();
        assert!(doc.plain_text().contains("Switch MES2324"));
    }

    #[test]
    fn test_replace_in_rows_only_touches_selected_rows() {
        let mut doc = doc();
        doc.tables_mut().next().unwrap().add_row(TableRow::from_strings([
            "Коммутатор доступа",
            "1",
            "998 000",
            "998 000",
        ]));
        let rows = RowSelector::containing("Switch");
        let report = replace_in_rows(&mut doc, &rows, "998 000", "499 000").unwrap();
        assert_eq!(report.modifications(), 1);

        let table = doc.tables().next().unwrap();
        assert_eq!(table.rows[0].cell_texts()[3], "499 000");
        assert_eq!(table.rows[2].cell_texts()[2], "998 000");
    }
}
