//! Structural row deletion.

use super::{Change, EditReport, RowRef, RowSelector};
use crate::error::Result;
use crate::model::Document;
use std::collections::BTreeSet;

/// Remove every table row picked by `rows`.
///
/// All rows are marked first and removed afterwards, so a row matching
/// several markers is deleted once and survivors keep their order. Totals
/// are left as they are; see [`super::recalculate_totals`].
pub fn delete_rows(doc: &mut Document, rows: &RowSelector) -> Result<EditReport> {
    let marked: BTreeSet<RowRef> = rows.select(doc)?.into_iter().collect();

    let mut report = EditReport::new();
    for (t, table) in doc.tables_mut().enumerate() {
        let mut r = 0;
        table.rows.retain(|row| {
            let here = RowRef { table: t, row: r };
            r += 1;
            if marked.contains(&here) {
                report.record(Change::RowDeleted {
                    table: t,
                    row: here.row,
                    text: row.plain_text(),
                });
                false
            } else {
                true
            }
        });
    }

    Ok(report.finish(|| format!("delete rows {}", rows)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{Table, TableRow};

    fn storage_table() -> Document {
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["Сервер YADRO", "1"]));
        table.add_row(TableRow::from_strings(["СХД с ПО Raidix", "1"]));
        table.add_row(TableRow::from_strings(["Коммутатор Eltex", "1"]));
        table.add_row(TableRow::from_strings(["ИБП Ippon", "1"]));
        let mut doc = Document::new();
        doc.push(table);
        doc
    }

    fn names(doc: &Document) -> Vec<String> {
        doc.tables()
            .next()
            .unwrap()
            .rows
            .iter()
            .map(|r| r.cell_texts()[0].clone())
            .collect()
    }

    #[test]
    fn test_delete_preserves_order() {
        let mut doc = storage_table();
        let report = delete_rows(&mut doc, &RowSelector::all_of(["СХД", "Raidix"])).unwrap();
        assert_eq!(report.modifications(), 1);
        assert_eq!(
            names(&doc),
            vec!["Сервер YADRO", "Коммутатор Eltex", "ИБП Ippon"]
        );
    }

    #[test]
    fn test_row_matching_several_markers_deleted_once() {
        let mut doc = storage_table();
        let sel = RowSelector::containing("СХД").or("Raidix").or("ИБП");
        let report = delete_rows(&mut doc, &sel).unwrap();
        assert_eq!(report.modifications(), 2);
        assert_eq!(names(&doc), vec!["Сервер YADRO", "Коммутатор Eltex"]);
    }

    #[test]
    fn test_no_match_keeps_rows() {
        let mut doc = storage_table();
        let report = delete_rows(&mut doc, &RowSelector::containing("Huawei")).unwrap();
        assert!(report.is_unchanged());
        assert_eq!(names(&doc).len(), 4);
    }

    #[test]
    fn test_unique_failure_leaves_document_untouched() {
        let mut doc = storage_table();
        let sel = RowSelector::containing("1").unique();
        assert!(matches!(
            delete_rows(&mut doc, &sel),
            Err(Error::MalformedTarget { matches: 4, .. })
        ));
        assert_eq!(names(&doc).len(), 4);
    }
}
