//! DOCX write/read behavior on generated proposals.

use offerdoc::builder::{FooterSpec, ProposalSpec, Section};
use offerdoc::docx::{read_docx, write_docx};
use offerdoc::model::{Block, ItemTable, LineItem, Metadata, Money, TotalPlacement};
use offerdoc::render::{to_json, to_text, JsonFormat, TextOptions};
use offerdoc::{detect_format_from_bytes, DocumentFormat};

const SCRIPT: &str = r#"
[metadata]
title = "Коммерческое предложение"
subject = "Поставка серверного оборудования"
author = "Отдел продаж"

[footer]
text = "Страница "

[[section]]
kind = "title"
text = "КОММЕРЧЕСКОЕ ПРЕДЛОЖЕНИЕ"

[[section]]
kind = "heading"
text = "1. ОБЩИЕ СВЕДЕНИЯ"

[[section]]
kind = "bullet"
title = "Заказчик"
text = "ООО «Ромашка»"

[[section]]
kind = "page_break"

[[section]]
kind = "items"
currency_suffix = " ₽"
items = [
    { name = "Сервер YADRO G4208P G3", quantity = 1, unit_price = 32151159 },
    { name = "Коммутатор Eltex MES2300-24", quantity = 1, unit_price = 139000 },
]
"#;

#[test]
fn test_script_survives_docx_round_trip() {
    let doc = ProposalSpec::from_toml(SCRIPT).unwrap().build();
    let bytes = write_docx(&doc).unwrap();
    assert_eq!(
        detect_format_from_bytes(&bytes).unwrap(),
        DocumentFormat::Docx
    );

    let back = read_docx(&bytes).unwrap();
    assert_eq!(
        back.metadata.title.as_deref(),
        Some("Коммерческое предложение")
    );
    assert_eq!(back.metadata.author.as_deref(), Some("Отдел продаж"));

    let headings: Vec<String> = back
        .paragraphs()
        .filter(|p| p.is_heading())
        .map(|p| p.plain_text())
        .collect();
    assert_eq!(headings, vec!["1. ОБЩИЕ СВЕДЕНИЯ"]);

    let bullet = back
        .paragraphs()
        .find(|p| p.plain_text().contains("Заказчик"))
        .unwrap();
    assert!(bullet.plain_text().ends_with("Заказчик: ООО «Ромашка»"));
    assert!(bullet.runs().any(|r| r.style.bold));

    let table = back.tables().next().unwrap();
    assert_eq!(table.header_rows(), 1);
    assert_eq!(
        table.rows.last().unwrap().cell_texts(),
        vec!["ИТОГО:", "32 290 159 ₽"]
    );
    assert_eq!(table.rows.last().unwrap().cells[0].colspan, 3);
}

#[test]
fn test_page_break_position_is_kept() {
    let doc = ProposalSpec::from_toml(SCRIPT).unwrap().build();
    let back = read_docx(&write_docx(&doc).unwrap()).unwrap();

    let text = to_text(&back, &TextOptions::default()).unwrap();
    let before = text.find("Заказчик").unwrap();
    let brk = text.find('\u{c}').unwrap();
    let after = text.find("Сервер").unwrap();
    assert!(before < brk && brk < after);
}

#[test]
fn test_resave_of_loaded_document_is_stable() {
    let doc = ProposalSpec::from_toml(SCRIPT).unwrap().build();
    let first = read_docx(&write_docx(&doc).unwrap()).unwrap();
    let second = read_docx(&write_docx(&first).unwrap()).unwrap();

    assert_eq!(first.plain_text(), second.plain_text());
    assert_eq!(first.blocks.len(), second.blocks.len());
    let json = to_json(&second, JsonFormat::Compact).unwrap();
    assert!(json.contains("MES2300-24"));
}

#[test]
fn test_total_paragraph_variant() {
    let items = ItemTable::new(vec![
        LineItem::new("Лицензия Raidix", 2, Money::from_major(100_000)),
        LineItem::new("Поддержка", 1, Money::from_major(50_000)),
    ])
    .with_total(TotalPlacement::Paragraph {
        label: "Итого оборудование:".into(),
    });
    let doc = ProposalSpec::new()
        .with_metadata(Metadata::with_title("КП"))
        .with_footer(FooterSpec::default())
        .section(Section::items(items))
        .build();

    let back = read_docx(&write_docx(&doc).unwrap()).unwrap();
    assert!(matches!(back.blocks[0], Block::Table(_)));
    assert_eq!(back.tables().next().unwrap().row_count(), 3);
    assert_eq!(
        back.paragraphs().last().unwrap().plain_text(),
        "Итого оборудование: 250 000"
    );
}
