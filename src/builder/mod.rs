//! Proposal builder.
//!
//! Turns a fixed script of section descriptions into a styled [`Document`].
//!
//! # Example
//!
//! ```
//! use offerdoc::builder::{ProposalSpec, Section};
//! use offerdoc::model::{ItemTable, LineItem, Money};
//!
//! let spec = ProposalSpec::new()
//!     .section(Section::title("КОММЕРЧЕСКОЕ ПРЕДЛОЖЕНИЕ"))
//!     .section(Section::heading("2. СПЕЦИФИКАЦИЯ ОБОРУДОВАНИЯ", 1))
//!     .section(Section::items(ItemTable::new(vec![LineItem::new(
//!         "Коммутатор Eltex MES2300-24",
//!         1,
//!         Money::from_major(139_000),
//!     )])));
//!
//! let doc = spec.build();
//! assert_eq!(doc.tables().count(), 1);
//! ```

mod style;

pub use style::{BlockStyle, BulletStyle, StyleSheet, TableStyle, DARK_BLUE, DARK_GREY};

use crate::error::Result;
use crate::model::{
    Alignment, Block, Document, ItemTable, Metadata, Money, Paragraph, Table, TableCell, TableRow,
    TextRun, TotalPlacement,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One section description in a proposal script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    /// Centered large bold title
    Title {
        /// Title text
        text: String,
    },
    /// Centered subtitle
    Subtitle {
        /// Subtitle text
        text: String,
    },
    /// Heading with a level (1 = top)
    Heading {
        /// Heading text
        text: String,
        /// Heading level
        #[serde(default = "default_level")]
        level: u8,
    },
    /// Body paragraph
    Paragraph {
        /// Paragraph text
        text: String,
    },
    /// Bullet item with an optional bold lead-in
    Bullet {
        /// Bold lead-in, rendered as `title: `
        #[serde(default)]
        title: Option<String>,
        /// Item text
        text: String,
    },
    /// Priced item table
    Items {
        /// Line items and total placement
        #[serde(flatten)]
        table: ItemTable,
    },
    /// Hard page break
    PageBreak,
}

fn default_level() -> u8 {
    1
}

impl Section {
    /// Title section.
    pub fn title(text: impl Into<String>) -> Self {
        Section::Title { text: text.into() }
    }

    /// Subtitle section.
    pub fn subtitle(text: impl Into<String>) -> Self {
        Section::Subtitle { text: text.into() }
    }

    /// Heading section.
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Section::Heading {
            text: text.into(),
            level,
        }
    }

    /// Body paragraph section.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Section::Paragraph { text: text.into() }
    }

    /// Plain bullet section.
    pub fn bullet(text: impl Into<String>) -> Self {
        Section::Bullet {
            title: None,
            text: text.into(),
        }
    }

    /// Bullet with a bold lead-in.
    pub fn titled_bullet(title: impl Into<String>, text: impl Into<String>) -> Self {
        Section::Bullet {
            title: Some(title.into()),
            text: text.into(),
        }
    }

    /// Item table section.
    pub fn items(table: ItemTable) -> Self {
        Section::Items { table }
    }
}

/// Footer with an optional page number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooterSpec {
    /// Text before the page number
    pub text: String,

    /// Append the current page number
    #[serde(default = "default_true")]
    pub page_number: bool,

    /// Footer alignment
    #[serde(default = "default_footer_alignment")]
    pub alignment: Alignment,
}

fn default_true() -> bool {
    true
}

fn default_footer_alignment() -> Alignment {
    Alignment::Right
}

impl Default for FooterSpec {
    fn default() -> Self {
        Self {
            text: "Страница ".to_string(),
            page_number: true,
            alignment: Alignment::Right,
        }
    }
}

impl FooterSpec {
    fn to_paragraph(&self) -> Paragraph {
        let mut p = Paragraph::new().align(self.alignment);
        if !self.text.is_empty() {
            p.add_text(self.text.clone());
        }
        if self.page_number {
            p.add_page_number();
        }
        p
    }
}

/// A complete proposal script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalSpec {
    /// Document metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Page footer
    #[serde(default)]
    pub footer: Option<FooterSpec>,

    /// Style overrides
    #[serde(default)]
    pub styles: StyleSheet,

    /// Sections in order
    #[serde(default, rename = "section")]
    pub sections: Vec<Section>,
}

impl ProposalSpec {
    /// Create an empty script with default styles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a script from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::from_open(e, path))?;
        Self::from_toml(&text)
    }

    /// Parse a script from TOML text.
    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Append a section and return self.
    pub fn section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Set the footer and return self.
    pub fn with_footer(mut self, footer: FooterSpec) -> Self {
        self.footer = Some(footer);
        self
    }

    /// Set metadata and return self.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Build the document.
    pub fn build(&self) -> Document {
        let mut doc = Document::new();
        doc.metadata = self.metadata.clone();
        doc.footer = self.footer.as_ref().map(FooterSpec::to_paragraph);

        for section in &self.sections {
            append_section(&mut doc, section, &self.styles);
        }

        log::debug!("built proposal with {} blocks", doc.blocks.len());
        doc
    }
}

fn append_section(doc: &mut Document, section: &Section, styles: &StyleSheet) {
    match section {
        Section::Title { text } => doc.push(styles.title.paragraph(text.clone())),
        Section::Subtitle { text } => doc.push(styles.subtitle.paragraph(text.clone())),
        Section::Heading { text, level } => {
            let mut p = styles.heading(*level).paragraph(text.clone());
            p.style.heading_level = Some((*level).clamp(1, 6));
            doc.push(p);
        }
        Section::Paragraph { text } => doc.push(styles.body.paragraph(text.clone())),
        Section::Bullet { title, text } => {
            doc.push(bullet_paragraph(title.as_deref(), text, styles))
        }
        Section::Items { table } => {
            let (built, total) = build_item_table(table, styles);
            doc.push(built);
            if let TotalPlacement::Paragraph { label } = &table.total {
                let line = format!("{} {}", label, table.format_amount(total));
                doc.push(styles.body.paragraph(line));
            }
        }
        Section::PageBreak => doc.push(Block::PageBreak),
    }
}

fn bullet_paragraph(title: Option<&str>, text: &str, styles: &StyleSheet) -> Paragraph {
    let bullet = &styles.bullet;
    let mut base = styles.body.text_style();
    base.font_size = Some(bullet.font_size);

    let mut p = Paragraph::new();
    p.style.left_indent = Some(bullet.left_indent);
    p.style.first_line_indent = Some(bullet.first_line_indent);
    p.style.space_after = Some(4.0);

    p.add_run(TextRun::styled(bullet.glyph.clone(), base.clone()));
    if let Some(title) = title {
        let mut bold = base.clone();
        bold.bold = true;
        p.add_run(TextRun::styled(format!("{}: ", title), bold));
    }
    p.add_run(TextRun::styled(text, base));
    p
}

/// Build the table for an [`ItemTable`], returning it with the running total.
///
/// The total is accumulated row by row as each line item is appended.
pub fn build_item_table(items: &ItemTable, styles: &StyleSheet) -> (Table, Money) {
    let table_style = &styles.table;
    let mut table = Table::new();
    table.column_widths = Some(items.column_widths.to_vec());
    table.style_id = table_style.style_id.clone();

    let header_cells = items
        .columns
        .iter()
        .enumerate()
        .map(|(i, caption)| {
            let mut run = TextRun::bold(caption.clone());
            run.style.color = table_style.header_text;
            let mut cell = TableCell::run(run).align(column_alignment(i));
            cell.shading = table_style.header_fill;
            cell
        })
        .collect();
    table.add_row(TableRow::header(header_cells));

    let mut running = Money::ZERO;
    for (n, item) in items.items.iter().enumerate() {
        if !item.is_consistent() {
            log::warn!(
                "line total for {:?} ({}) differs from {} x {}",
                item.name,
                item.line_total(),
                item.quantity,
                item.unit_price
            );
        }
        if item.line_total.is_none() && item.checked_total().is_none() {
            log::warn!(
                "{} x {} for {:?} is out of range, capped at {}",
                item.quantity,
                item.unit_price,
                item.name,
                item.line_total()
            );
        }
        let line_total = item.line_total();
        running = running.checked_add(line_total).unwrap_or_else(|| {
            log::warn!("item table total is out of range, capped");
            running + line_total
        });

        let values = [
            item.name.clone(),
            item.quantity.to_string(),
            items.format_amount(item.unit_price),
            items.format_amount(line_total),
        ];
        let cells = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let mut cell = TableCell::text(v).align(column_alignment(i));
                if n % 2 == 1 {
                    cell.shading = table_style.stripe_fill;
                }
                cell
            })
            .collect();
        table.add_row(TableRow::new(cells));
    }

    if let TotalPlacement::Row { label } = &items.total {
        let span = (items.columns.len() - 1) as u8;
        table.add_row(TableRow::new(vec![
            TableCell::run(TextRun::bold(label.clone()))
                .colspan(span)
                .align(Alignment::Right),
            TableCell::run(TextRun::bold(items.format_amount(running))).align(Alignment::Right),
        ]));
    }

    (table, running)
}

fn column_alignment(index: usize) -> Alignment {
    match index {
        0 => Alignment::Left,
        1 => Alignment::Center,
        _ => Alignment::Right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LineItem, Money};

    fn optimal() -> ItemTable {
        ItemTable::new(vec![
            LineItem::new("Сервер YADRO G4208P G3", 1, Money::from_major(32_151_159)),
            LineItem::new("Коммутатор Eltex MES2300-24", 1, Money::from_major(139_000)),
            LineItem::new("ОС Альт Линукс СПТ", 2, Money::from_major(15_000)),
        ])
    }

    #[test]
    fn test_item_table_rows() {
        let (table, total) = build_item_table(&optimal(), &StyleSheet::default());
        assert_eq!(table.row_count(), 5);
        assert_eq!(table.header().len(), 1);
        assert_eq!(
            table.rows[3].cell_texts(),
            vec!["ОС Альт Линукс СПТ", "2", "15 000", "30 000"]
        );
        assert_eq!(total, Money::from_major(32_320_159));
        assert_eq!(table.rows[4].cell_texts(), vec!["ИТОГО:", "32 320 159"]);
        assert_eq!(table.rows[4].cells[0].colspan, 3);
    }

    #[test]
    fn test_total_row_matches_sum_of_quantity_times_price() {
        let items = optimal();
        let (table, _) = build_item_table(&items, &StyleSheet::default());
        let expected: Money = items
            .items
            .iter()
            .map(|i| i.unit_price * i.quantity)
            .sum();
        let last = table.rows.last().unwrap();
        assert_eq!(
            Money::parse_grouped(&last.cells[1].plain_text()),
            Some(expected)
        );
    }

    #[test]
    fn test_out_of_range_items_are_capped() {
        let items = ItemTable::new(vec![
            LineItem::new("Лицензия", 4_000_000, Money::from_major(50_000_000_000)),
            LineItem::new("Поддержка", 1, Money::from_major(1_000)),
        ]);
        let (table, total) = build_item_table(&items, &StyleSheet::default());
        assert_eq!(total, Money::from_minor(i64::MAX));
        assert_eq!(table.row_count(), 4);
        assert_eq!(
            Money::parse_grouped(&table.rows[3].cells[1].plain_text()).map(Money::whole),
            Some(total.whole())
        );
    }

    #[test]
    fn test_total_as_paragraph() {
        let spec = ProposalSpec::new().section(Section::items(
            optimal()
                .with_total(TotalPlacement::Paragraph {
                    label: "Итого оборудование:".to_string(),
                })
                .with_currency_suffix(" ₽"),
        ));
        let doc = spec.build();
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.tables().next().unwrap().row_count(), 4);
        assert_eq!(
            doc.paragraphs().next().unwrap().plain_text(),
            "Итого оборудование: 32 320 159 ₽"
        );
    }

    #[test]
    fn test_sections_in_order() {
        let doc = ProposalSpec::new()
            .section(Section::title("КОММЕРЧЕСКОЕ ПРЕДЛОЖЕНИЕ"))
            .section(Section::PageBreak)
            .section(Section::heading("1. ОПИСАНИЕ ПРОЕКТА", 1))
            .section(Section::titled_bullet("REST API", "OData и HTTP-сервисы"))
            .with_footer(FooterSpec::default())
            .build();

        assert_eq!(doc.blocks.len(), 4);
        assert!(matches!(doc.blocks[1], Block::PageBreak));
        let bullet = doc.paragraphs().nth(2).unwrap();
        assert_eq!(bullet.plain_text(), "• REST API: OData и HTTP-сервисы");
        assert_eq!(bullet.style.left_indent, Some(18.0));
        assert_eq!(bullet.style.first_line_indent, Some(-18.0));
        assert_eq!(doc.footer.as_ref().unwrap().plain_text(), "Страница ");
    }

    #[test]
    fn test_spec_from_toml() {
        let spec = ProposalSpec::from_toml(
            r#"
            [metadata]
            title = "Коммерческое предложение"
            revision = 12

            [footer]
            text = "Страница "

            [[section]]
            kind = "title"
            text = "КОММЕРЧЕСКОЕ ПРЕДЛОЖЕНИЕ"

            [[section]]
            kind = "heading"
            text = "Базовый вариант"
            level = 2

            [[section]]
            kind = "items"
            [[section.items]]
            name = "Шкаф настенный 12U"
            quantity = 1
            unit_price = 25000
            "#,
        )
        .unwrap();

        assert_eq!(spec.metadata.revision, Some(12));
        assert_eq!(spec.sections.len(), 3);
        let doc = spec.build();
        let table = doc.tables().next().unwrap();
        assert_eq!(table.rows.last().unwrap().cell_texts()[1], "25 000");
    }
}
