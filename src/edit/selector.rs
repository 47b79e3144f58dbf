//! Text-match selectors for table rows.

use crate::error::{Error, Result};
use crate::model::{Document, TableCell, TableRow};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal fragments that must all occur in the same cell.
///
/// A single-fragment marker is a plain substring match. Matching is literal
/// and case-sensitive; no whitespace or Unicode normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MarkerRepr", into = "Vec<String>")]
pub struct Marker(Vec<String>);

impl Marker {
    /// Marker from one literal.
    pub fn text(fragment: impl Into<String>) -> Self {
        Marker(vec![fragment.into()])
    }

    /// Marker from several literals, all required in the same cell.
    pub fn all_of<S: Into<String>>(fragments: impl IntoIterator<Item = S>) -> Self {
        Marker(fragments.into_iter().map(Into::into).collect())
    }

    /// Parse the command-line form `A&B`; `\&` stands for a literal `&`.
    pub fn parse(s: &str) -> Self {
        let mut fragments = Vec::new();
        let mut current = String::new();
        let mut chars = s.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\\' if chars.peek() == Some(&'&') => {
                    chars.next();
                    current.push('&');
                }
                '&' => fragments.push(std::mem::take(&mut current)),
                _ => current.push(ch),
            }
        }
        fragments.push(current);
        Marker(fragments)
    }

    /// Fragments of this marker.
    pub fn fragments(&self) -> &[String] {
        &self.0
    }

    /// Reject markers that would match everything.
    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() || self.0.iter().any(|f| f.is_empty()) {
            return Err(Error::InvalidSelector(format!(
                "marker {} has an empty fragment",
                self
            )));
        }
        Ok(())
    }

    /// Whether `text` contains every fragment.
    pub fn matches(&self, text: &str) -> bool {
        self.0.iter().all(|f| text.contains(f.as_str()))
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0.join(" & "))
    }
}

impl From<&str> for Marker {
    fn from(s: &str) -> Self {
        Marker::text(s)
    }
}

impl From<Marker> for Vec<String> {
    fn from(m: Marker) -> Self {
        m.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MarkerRepr {
    One(String),
    All(Vec<String>),
}

impl TryFrom<MarkerRepr> for Marker {
    type Error = String;

    fn try_from(repr: MarkerRepr) -> std::result::Result<Self, Self::Error> {
        let marker = match repr {
            MarkerRepr::One(s) => Marker::text(s),
            MarkerRepr::All(v) => Marker(v),
        };
        marker.validate().map_err(|e| e.to_string())?;
        Ok(marker)
    }
}

/// Position of a selected row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowRef {
    /// Body table index (0-based)
    pub table: usize,
    /// Row index within the table
    pub row: usize,
}

/// Selects table rows by cell text.
///
/// A row is selected when any of its cells satisfies any marker. The match
/// can be narrowed to one table and to one grid column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSelector {
    /// Alternatives; one matching marker is enough
    pub markers: Vec<Marker>,

    /// Only consider this body table (0-based)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<usize>,

    /// Only consider cells covering this grid column (0-based)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,

    /// Require exactly one matching row
    #[serde(default)]
    pub unique: bool,
}

impl RowSelector {
    /// Rows with a cell containing `text`.
    pub fn containing(text: impl Into<String>) -> Self {
        Self::any_of(vec![Marker::text(text)])
    }

    /// Rows with a cell containing every fragment.
    pub fn all_of<S: Into<String>>(fragments: impl IntoIterator<Item = S>) -> Self {
        Self::any_of(vec![Marker::all_of(fragments)])
    }

    /// Rows matching any of the markers.
    pub fn any_of(markers: Vec<Marker>) -> Self {
        Self {
            markers,
            table: None,
            column: None,
            unique: false,
        }
    }

    /// Add an alternative marker and return self.
    pub fn or(mut self, marker: impl Into<Marker>) -> Self {
        self.markers.push(marker.into());
        self
    }

    /// Restrict to one body table and return self.
    pub fn in_table(mut self, table: usize) -> Self {
        self.table = Some(table);
        self
    }

    /// Restrict to one grid column and return self.
    pub fn in_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    /// Require exactly one match and return self.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Reject selectors that would match every row.
    pub fn validate(&self) -> Result<()> {
        if self.markers.is_empty() {
            return Err(Error::InvalidSelector("row selector has no markers".into()));
        }
        self.markers.iter().try_for_each(Marker::validate)
    }

    /// Whether the row satisfies any marker.
    pub fn matches_row(&self, row: &TableRow) -> bool {
        self.scoped_cells(row).any(|(_, cell)| {
            let text = cell.plain_text();
            self.markers.iter().any(|m| m.matches(&text))
        })
    }

    /// Cells of `row` inside the column scope, with their cell index.
    pub fn scoped_cells<'a>(
        &'a self,
        row: &'a TableRow,
    ) -> impl Iterator<Item = (usize, &'a TableCell)> + 'a {
        let spans = grid_spans(row);
        row.cells
            .iter()
            .enumerate()
            .filter(move |(i, _)| self.covers(spans[*i]))
    }

    /// Cell indexes of `row` inside the column scope.
    pub fn scoped_indexes(&self, row: &TableRow) -> Vec<usize> {
        self.scoped_cells(row).map(|(i, _)| i).collect()
    }

    fn covers(&self, (start, span): (usize, usize)) -> bool {
        match self.column {
            Some(col) => col >= start && col < start + span,
            None => true,
        }
    }

    /// Locate every matching row in document order.
    ///
    /// Fails with [`Error::MalformedTarget`] when `unique` is set and the
    /// number of matches is not exactly one.
    pub fn select(&self, doc: &Document) -> Result<Vec<RowRef>> {
        self.validate()?;

        let mut found = Vec::new();
        for (t, table) in doc.tables().enumerate() {
            if self.table.is_some_and(|only| only != t) {
                continue;
            }
            for (r, row) in table.rows.iter().enumerate() {
                if self.matches_row(row) {
                    found.push(RowRef { table: t, row: r });
                }
            }
        }

        if self.unique && found.len() != 1 {
            return Err(Error::MalformedTarget {
                selector: self.to_string(),
                matches: found.len(),
            });
        }
        if found.len() > 1 {
            log::warn!("selector {} matched {} rows", self, found.len());
        }
        Ok(found)
    }
}

impl fmt::Display for RowSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, m) in self.markers.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", m)?;
        }
        if let Some(t) = self.table {
            write!(f, " in table {}", t + 1)?;
        }
        if let Some(c) = self.column {
            write!(f, " column {}", c + 1)?;
        }
        Ok(())
    }
}

/// `(first grid column, span)` for each cell of a row.
fn grid_spans(row: &TableRow) -> Vec<(usize, usize)> {
    let mut start = 0;
    row.cells
        .iter()
        .map(|c| {
            let span = c.colspan.max(1) as usize;
            let pos = (start, span);
            start += span;
            pos
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Table, TableCell};

    fn doc() -> Document {
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["Наименование", "Кол-во", "Сумма"]));
        table.add_row(TableRow::from_strings(["СХД Аэродиск", "1", "3 800 000"]));
        table.add_row(TableRow::from_strings(["ПО Raidix для СХД", "1", "1 200 000"]));
        table.add_row(TableRow::new(vec![
            TableCell::text("ИТОГО:").colspan(2),
            TableCell::text("5 000 000"),
        ]));
        let mut doc = Document::new();
        doc.push(table);
        doc
    }

    #[test]
    fn test_all_fragments_in_same_cell() {
        let sel = RowSelector::all_of(["СХД", "Raidix"]);
        let rows = sel.select(&doc()).unwrap();
        assert_eq!(rows, vec![RowRef { table: 0, row: 2 }]);
    }

    #[test]
    fn test_any_marker() {
        let sel = RowSelector::containing("Аэродиск").or("Raidix");
        assert_eq!(sel.select(&doc()).unwrap().len(), 2);
    }

    #[test]
    fn test_column_scope_uses_grid_columns() {
        let doc = doc();
        let sel = RowSelector::containing("000").in_column(2);
        assert_eq!(sel.select(&doc).unwrap().len(), 3);

        // the merged label cell covers columns 0 and 1
        let sel = RowSelector::containing("ИТОГО").in_column(1);
        assert_eq!(sel.select(&doc).unwrap(), vec![RowRef { table: 0, row: 3 }]);
    }

    #[test]
    fn test_unique_rejects_ambiguity() {
        let err = RowSelector::containing("СХД")
            .unique()
            .select(&doc())
            .unwrap_err();
        assert!(matches!(err, Error::MalformedTarget { matches: 2, .. }));

        let err = RowSelector::containing("Huawei")
            .unique()
            .select(&doc())
            .unwrap_err();
        assert!(matches!(err, Error::MalformedTarget { matches: 0, .. }));
    }

    #[test]
    fn test_empty_marker_rejected() {
        let err = RowSelector::containing("").select(&doc()).unwrap_err();
        assert!(matches!(err, Error::InvalidSelector(_)));
        let err = RowSelector::any_of(vec![]).select(&doc()).unwrap_err();
        assert!(matches!(err, Error::InvalidSelector(_)));
        assert!(Marker::parse("СХД&").validate().is_err());
    }

    #[test]
    fn test_parse_command_line_marker() {
        assert_eq!(Marker::parse("СХД&Raidix"), Marker::all_of(["СХД", "Raidix"]));
        assert_eq!(Marker::parse(r"R\&D"), Marker::text("R&D"));
        assert_eq!(
            Marker::parse(r"R\&D&Лицензия"),
            Marker::all_of(["R&D", "Лицензия"])
        );
        assert_eq!(Marker::parse(r"C:\drivers"), Marker::text(r"C:\drivers"));
    }

    #[test]
    fn test_marker_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            rows: RowSelector,
        }
        let w: Wrapper = toml::from_str(
            r#"rows = { markers = ["Switch", ["СХД", "Raidix"]], table = 1, unique = true }"#,
        )
        .unwrap();
        assert_eq!(w.rows.markers[1], Marker::all_of(["СХД", "Raidix"]));
        assert_eq!(w.rows.table, Some(1));
        assert!(w.rows.unique);
    }
}
