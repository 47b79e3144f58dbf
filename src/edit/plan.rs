//! Ordered edit plans.
//!
//! A plan is a list of mutation and verification steps applied in one
//! linear pass over the in-memory document. Plans are usually read from TOML:
//!
//! ```toml
//! input = "Commercial_Proposal_v9.docx"
//! next_version = true
//!
//! [[step]]
//! op = "replace"
//! pairs = [{ from = "MES5324", to = "MES2300-24" }]
//!
//! [[step]]
//! op = "overwrite_cell"
//! rows = { markers = ["MES2300-24"], unique = true }
//! equals = "2"
//! replacement = "1"
//!
//! [[step]]
//! op = "verify"
//! marker = "MES2300-24"
//! ```

use super::{
    delete_rows, recalculate_totals, replace_all, replace_in_rows, CellOverwrite, EditReport,
    Replacement, RowSelector, TotalsSpec,
};
use crate::error::{Error, Result};
use crate::model::Document;
use crate::verify::{verify, Verification};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One plan step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditStep {
    /// Document-wide literal replacement
    Replace {
        /// Pairs applied in order
        pairs: Vec<Replacement>,
    },
    /// Replacement limited to selected rows
    ReplaceInRows {
        /// Row selector
        rows: RowSelector,
        /// Literal to find
        from: String,
        /// Replacement text
        to: String,
    },
    /// Row deletion
    DeleteRows {
        /// Row selector
        rows: RowSelector,
    },
    /// Exact cell overwrite
    OverwriteCell(CellOverwrite),
    /// Total recalculation
    RecalculateTotals(TotalsSpec),
    /// Presence check
    Verify {
        /// Literal to look for
        marker: String,
        /// Abort the plan when missing
        #[serde(default = "default_required")]
        required: bool,
        /// Paragraphs to echo from the match
        #[serde(default)]
        echo: usize,
    },
}

fn default_required() -> bool {
    true
}

impl EditStep {
    /// Short description for progress output.
    pub fn describe(&self) -> String {
        match self {
            EditStep::Replace { pairs } => match pairs.as_slice() {
                [one] => format!("replace {:?} -> {:?}", one.from, one.to),
                _ => format!("replace {} pairs", pairs.len()),
            },
            EditStep::ReplaceInRows { rows, from, to } => {
                format!("replace {:?} -> {:?} in rows {}", from, to, rows)
            }
            EditStep::DeleteRows { rows } => format!("delete rows {}", rows),
            EditStep::OverwriteCell(op) => format!(
                "overwrite {:?} -> {:?} in rows {}",
                op.equals, op.replacement, op.rows
            ),
            EditStep::RecalculateTotals(_) => "recalculate totals".to_string(),
            EditStep::Verify { marker, .. } => format!("verify {:?}", marker),
        }
    }
}

/// What a plan did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanReport {
    /// All mutations in order
    pub edits: EditReport,

    /// Verification outcomes in order
    pub verifications: Vec<Verification>,
}

/// An ordered list of steps plus optional file locations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditPlan {
    /// Document to load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,

    /// Where to save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Save as the next version of the input name
    #[serde(default)]
    pub next_version: bool,

    /// Replace an existing output
    #[serde(default)]
    pub overwrite: bool,

    /// Steps in order
    #[serde(default, rename = "step")]
    pub steps: Vec<EditStep>,
}

impl EditPlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a plan from a TOML file.
    ///
    /// Relative `input` and `output` paths are resolved against the plan's
    /// directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::from_open(e, path))?;
        let mut plan = Self::from_toml(&text)?;
        if let Some(base) = path.parent() {
            plan.input = plan.input.map(|p| base.join(p));
            plan.output = plan.output.map(|p| base.join(p));
        }
        Ok(plan)
    }

    /// Parse a plan from TOML text.
    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Where the result goes: `output` when set, otherwise the next free
    /// version of `input` when `next_version` is set.
    pub fn output_path(&self) -> Result<PathBuf> {
        if let Some(output) = &self.output {
            return Ok(output.clone());
        }
        match (&self.input, self.next_version) {
            (Some(input), true) => crate::version::next_after(input),
            _ => Err(Error::Config(
                "plan names neither an output nor next_version with an input".into(),
            )),
        }
    }

    /// Apply all steps in order.
    pub fn apply(&self, doc: &mut Document) -> Result<PlanReport> {
        self.apply_with(doc, |_, _| {})
    }

    /// Apply all steps, calling `on_step` before each one.
    ///
    /// The first failing step aborts the plan; the document keeps whatever
    /// earlier steps did.
    pub fn apply_with<F>(&self, doc: &mut Document, mut on_step: F) -> Result<PlanReport>
    where
        F: FnMut(usize, &EditStep),
    {
        let mut report = PlanReport::default();
        for (i, step) in self.steps.iter().enumerate() {
            on_step(i, step);
            log::debug!("step {}: {}", i + 1, step.describe());
            apply_step(doc, step, &mut report)?;
        }
        Ok(report)
    }
}

fn apply_step(doc: &mut Document, step: &EditStep, report: &mut PlanReport) -> Result<()> {
    match step {
        EditStep::Replace { pairs } => report.edits.merge(replace_all(doc, pairs)?),
        EditStep::ReplaceInRows { rows, from, to } => {
            report.edits.merge(replace_in_rows(doc, rows, from, to)?)
        }
        EditStep::DeleteRows { rows } => report.edits.merge(delete_rows(doc, rows)?),
        EditStep::OverwriteCell(op) => report.edits.merge(op.apply(doc)?),
        EditStep::RecalculateTotals(spec) => report.edits.merge(recalculate_totals(doc, spec)?),
        EditStep::Verify {
            marker,
            required,
            echo,
        } => {
            let outcome = verify(doc, marker, *echo)?;
            if *required && !outcome.found {
                return Err(Error::VerificationFailed(marker.clone()));
            }
            report.verifications.push(outcome);
        }
    }
    Ok(())
}

/// Programmatic plan builder.
///
/// ```
/// use offerdoc::edit::{Editor, RowSelector};
/// use offerdoc::model::{Document, Paragraph};
///
/// let mut doc = Document::new();
/// doc.push(Paragraph::with_text("Коммутатор Eltex MES5324"));
///
/// let report = Editor::new()
///     .replace("MES5324", "MES2300-24")
///     .verify("MES2300-24")
///     .apply(&mut doc)
///     .unwrap();
/// assert_eq!(report.edits.modifications(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Editor {
    plan: EditPlan,
}

impl Editor {
    /// Start an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    fn step(mut self, step: EditStep) -> Self {
        self.plan.steps.push(step);
        self
    }

    /// Add a document-wide replacement.
    pub fn replace(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.step(EditStep::Replace {
            pairs: vec![Replacement::new(from, to)],
        })
    }

    /// Add a row-scoped replacement.
    pub fn replace_in_rows(
        self,
        rows: RowSelector,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.step(EditStep::ReplaceInRows {
            rows,
            from: from.into(),
            to: to.into(),
        })
    }

    /// Add a row deletion.
    pub fn delete_rows(self, rows: RowSelector) -> Self {
        self.step(EditStep::DeleteRows { rows })
    }

    /// Add an exact cell overwrite.
    pub fn overwrite_cell(
        self,
        rows: RowSelector,
        equals: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        self.step(EditStep::OverwriteCell(CellOverwrite::new(
            rows,
            equals,
            replacement,
        )))
    }

    /// Add a total recalculation with default labels.
    pub fn recalculate_totals(self) -> Self {
        self.step(EditStep::RecalculateTotals(TotalsSpec::default()))
    }

    /// Add a required presence check.
    pub fn verify(self, marker: impl Into<String>) -> Self {
        self.step(EditStep::Verify {
            marker: marker.into(),
            required: true,
            echo: 0,
        })
    }

    /// Apply the steps to `doc`.
    pub fn apply(&self, doc: &mut Document) -> Result<PlanReport> {
        self.plan.apply(doc)
    }

    /// The assembled plan.
    pub fn into_plan(self) -> EditPlan {
        self.plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Paragraph, Table, TableRow};

    const PLAN: &str = r#"
        input = "Commercial_Proposal_v9.docx"
        next_version = true

        [[step]]
        op = "replace"
        pairs = [{ from = "MES5324", to = "MES2300-24" }]

        [[step]]
        op = "overwrite_cell"
        rows = { markers = ["MES2300-24"], unique = true }
        equals = "2"
        replacement = "1"

        [[step]]
        op = "replace_in_rows"
        rows = { markers = ["MES2300-24"] }
        from = "998 000"
        to = "499 000"

        [[step]]
        op = "delete_rows"
        rows = { markers = [["СХД", "Raidix"]] }

        [[step]]
        op = "recalculate_totals"

        [[step]]
        op = "verify"
        marker = "MES2300-24"
        echo = 1
    "#;

    fn doc() -> Document {
        let mut doc = Document::new();
        doc.push(Paragraph::with_text("Коммутатор Eltex MES5324"));
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["Switch MES5324", "2", "499 000", "998 000"]));
        table.add_row(TableRow::from_strings(["СХД с ПО Raidix", "1", "3 800 000", "3 800 000"]));
        table.add_row(TableRow::from_strings(["ИТОГО:", "", "", "4 798 000"]));
        doc.push(table);
        doc
    }

    #[test]
    fn test_parse_plan() {
        let plan = EditPlan::from_toml(PLAN).unwrap();
        assert!(plan.next_version);
        assert_eq!(plan.steps.len(), 6);
        assert_eq!(
            plan.steps[4],
            EditStep::RecalculateTotals(TotalsSpec::default())
        );
        assert_eq!(plan.steps[1].describe(), "overwrite \"2\" -> \"1\" in rows \"MES2300-24\"");
    }

    #[test]
    fn test_apply_plan() {
        let plan = EditPlan::from_toml(PLAN).unwrap();
        let mut doc = doc();
        let mut seen = Vec::new();
        let report = plan.apply_with(&mut doc, |i, _| seen.push(i)).unwrap();

        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
        let table = doc.tables().next().unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.rows[0].cell_texts(),
            vec!["Switch MES2300-24", "1", "499 000", "499 000"]
        );
        assert_eq!(table.rows[1].cell_texts()[3], "499 000");
        assert_eq!(report.verifications.len(), 1);
        assert_eq!(report.verifications[0].context, vec!["Коммутатор Eltex MES2300-24"]);
    }

    #[test]
    fn test_required_verification_aborts() {
        let mut doc = doc();
        let err = Editor::new()
            .verify("Section Z")
            .replace("MES5324", "X")
            .apply(&mut doc)
            .unwrap_err();
        assert!(matches!(err, Error::VerificationFailed(m) if m == "Section Z"));
        assert!(doc.plain_text().contains("MES5324"));
    }

    #[test]
    fn test_optional_verification_records_miss() {
        let mut plan = Editor::new().into_plan();
        plan.steps.push(EditStep::Verify {
            marker: "Section Z".into(),
            required: false,
            echo: 0,
        });
        let report = plan.apply(&mut doc()).unwrap();
        assert!(!report.verifications[0].found);
    }

    #[test]
    fn test_output_path() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("Commercial_Proposal_v9.docx"), b"").unwrap();
        let plan_path = dir.path().join("plan.toml");
        std::fs::write(&plan_path, PLAN).unwrap();

        let plan = EditPlan::from_file(&plan_path).unwrap();
        assert_eq!(
            plan.output_path().unwrap(),
            dir.path().join("Commercial_Proposal_v10.docx")
        );
        assert!(matches!(EditPlan::new().output_path(), Err(Error::Config(_))));
    }
}
