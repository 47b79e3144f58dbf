//! Explicit total recalculation for loaded tables.

use super::{Change, EditReport};
use crate::error::{Error, Result};
use crate::model::{Document, Money, TableRow};
use serde::{Deserialize, Serialize};

/// How total rows are recognized and summed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotalsSpec {
    /// A row is a total row when a non-amount cell starts with one of these
    /// as a whole word (`ИТОГО:`, `Итого с НДС`)
    pub labels: Vec<String>,

    /// Grid column holding amounts; the last cell of each row when unset
    pub column: Option<usize>,

    /// Only recalculate this body table
    pub table: Option<usize>,
}

impl Default for TotalsSpec {
    fn default() -> Self {
        Self {
            labels: vec!["ИТОГО".into(), "Итого".into(), "TOTAL".into()],
            column: None,
            table: None,
        }
    }
}

impl TotalsSpec {
    /// Index of the amount cell in `row`.
    fn amount_cell(&self, row: &TableRow) -> Option<usize> {
        match self.column {
            None => row.cells.len().checked_sub(1),
            Some(col) => {
                let mut start = 0;
                row.cells.iter().position(|c| {
                    let span = c.colspan.max(1) as usize;
                    let hit = col >= start && col < start + span;
                    start += span;
                    hit
                })
            }
        }
    }

    pub(crate) fn is_total_row(&self, row: &TableRow) -> bool {
        let amount = self.amount_cell(row);
        row.cells.iter().enumerate().any(|(i, cell)| {
            if Some(i) == amount {
                return false;
            }
            let text = cell.plain_text();
            self.labels.iter().any(|l| starts_with_label(&text, l))
        })
    }

    pub(crate) fn amount(&self, row: &TableRow) -> Option<Money> {
        let idx = self.amount_cell(row)?;
        Money::parse_grouped(&row.cells[idx].plain_text())
    }
}

/// `text` begins with `label` followed by a non-letter or the end of text.
fn starts_with_label(text: &str, label: &str) -> bool {
    let Some(rest) = text.trim_start().strip_prefix(label) else {
        return false;
    };
    !label.is_empty() && rest.chars().next().map_or(true, |c| !c.is_alphanumeric())
}

/// Text after the last digit, e.g. `" ₽"` in `"3 800 000 ₽"`.
fn amount_suffix(text: &str) -> &str {
    match text.rfind(|c: char| c.is_ascii_digit()) {
        Some(pos) => &text[pos + 1..],
        None => "",
    }
}

/// Re-sum amount columns into their total rows.
///
/// For each total row, the parsable amounts of the body rows between the
/// previous total row (or the header) and it are summed. The total cell is
/// rewritten keeping its currency suffix. This never runs implicitly.
pub fn recalculate_totals(doc: &mut Document, spec: &TotalsSpec) -> Result<EditReport> {
    let mut report = EditReport::new();

    for (t, table) in doc.tables_mut().enumerate() {
        if spec.table.is_some_and(|only| only != t) {
            continue;
        }
        let mut sum = Money::ZERO;
        let start = table.header_rows();

        for r in start..table.rows.len() {
            if !spec.is_total_row(&table.rows[r]) {
                if let Some(amount) = spec.amount(&table.rows[r]) {
                    sum = sum.checked_add(amount).ok_or_else(|| {
                        Error::AmountOverflow(format!("total of table {}, row {}", t + 1, r + 1))
                    })?;
                }
                continue;
            }

            let Some(idx) = spec.amount_cell(&table.rows[r]) else {
                continue;
            };
            let cell = &mut table.rows[r].cells[idx];
            let before = cell.plain_text();
            let trimmed = before.trim();
            let after = format!("{}{}", sum.format_grouped(), amount_suffix(trimmed));
            if after != trimmed {
                cell.set_text(after.clone());
                report.record(Change::TotalRecalculated {
                    table: t,
                    row: r,
                    before,
                    after,
                });
            }
            sum = Money::ZERO;
        }
    }

    Ok(report.finish(|| "recalculate totals".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Table, TableCell, TableRow};

    fn doc() -> Document {
        let mut table = Table::new();
        table.add_row(TableRow::header(vec![
            TableCell::text("Наименование"),
            TableCell::text("Сумма"),
        ]));
        table.add_row(TableRow::from_strings(["Switch MES2300-24", "499 000 ₽"]));
        table.add_row(TableRow::from_strings(["ИБП Ippon", "120 000 ₽"]));
        table.add_row(TableRow::from_strings(["Монтаж", "по запросу"]));
        table.add_row(TableRow::from_strings(["ИТОГО:", "1 117 000 ₽"]));
        let mut doc = Document::new();
        doc.push(table);
        doc
    }

    #[test]
    fn test_recalculate_keeps_suffix() {
        let mut doc = doc();
        let report = recalculate_totals(&mut doc, &TotalsSpec::default()).unwrap();
        assert_eq!(report.modifications(), 1);
        let table = doc.tables().next().unwrap();
        assert_eq!(table.rows[4].cell_texts()[1], "619 000 ₽");
    }

    #[test]
    fn test_recalculate_is_stable() {
        let mut doc = doc();
        recalculate_totals(&mut doc, &TotalsSpec::default()).unwrap();
        let report = recalculate_totals(&mut doc, &TotalsSpec::default()).unwrap();
        assert!(report.is_unchanged());
    }

    #[test]
    fn test_merged_label_and_explicit_column() {
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["A", "1", "100", "100"]));
        table.add_row(TableRow::from_strings(["B", "2", "50", "100"]));
        table.add_row(TableRow::new(vec![
            TableCell::text("ИТОГО:").colspan(3),
            TableCell::text("0"),
        ]));
        let mut doc = Document::new();
        doc.push(table);

        let spec = TotalsSpec {
            column: Some(3),
            ..Default::default()
        };
        recalculate_totals(&mut doc, &spec).unwrap();
        assert_eq!(doc.tables().next().unwrap().rows[2].cell_texts()[1], "200");
    }

    #[test]
    fn test_label_must_be_a_whole_word() {
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["Сервер", "100 000"]));
        table.add_row(TableRow::from_strings(["Итоговый отчёт по внедрению", "50 000"]));
        table.add_row(TableRow::from_strings(["ИТОГО:", "0"]));
        let mut doc = Document::new();
        doc.push(table);

        recalculate_totals(&mut doc, &TotalsSpec::default()).unwrap();
        let table = doc.tables().next().unwrap();
        assert_eq!(table.rows[1].cell_texts()[1], "50 000");
        assert_eq!(table.rows[2].cell_texts()[1], "150 000");
    }

    #[test]
    fn test_label_matching() {
        assert!(starts_with_label("ИТОГО:", "ИТОГО"));
        assert!(starts_with_label(" Итого с НДС", "Итого"));
        assert!(starts_with_label("TOTAL", "TOTAL"));
        assert!(!starts_with_label("Итоговый отчёт", "Итого"));
        assert!(!starts_with_label("Сумма ИТОГО", "ИТОГО"));
    }

    #[test]
    fn test_overflowing_sum_is_an_error() {
        let huge = Money::from_minor(i64::MAX).format_grouped();
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["A", huge.as_str()]));
        table.add_row(TableRow::from_strings(["B", huge.as_str()]));
        table.add_row(TableRow::from_strings(["ИТОГО:", "0"]));
        let mut doc = Document::new();
        doc.push(table);

        let err = recalculate_totals(&mut doc, &TotalsSpec::default()).unwrap_err();
        assert!(matches!(err, Error::AmountOverflow(_)));
        assert_eq!(doc.tables().next().unwrap().rows[2].cell_texts()[1], "0");
    }

    #[test]
    fn test_suffix() {
        assert_eq!(amount_suffix("3 800 000 ₽"), " ₽");
        assert_eq!(amount_suffix("499 000"), "");
        assert_eq!(amount_suffix("—"), "");
    }
}
