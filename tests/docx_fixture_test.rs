//! Editing a word-processor file written by another program.
//!
//! The package is assembled by hand so that it carries markup the model
//! does not understand: list numbering, line spacing, highlights, borders,
//! vertical merges and a drawing.

use std::io::{Cursor, Read, Write};

use offerdoc::docx::write_docx;
use offerdoc::edit::{delete_rows, overwrite_cells, recalculate_totals, replace_text, TotalsSpec};
use offerdoc::RowSelector;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const ROOT: &str = concat!(
    r#"<w:document"#,
    r#" xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#,
    r#" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing""#,
    r#" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">"#,
);

const HEADING: &str = concat!(
    r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr>"#,
    r#"<w:r><w:t>1. Спецификация</w:t></w:r></w:p>"#,
);

const DELIVERY: &str = concat!(
    r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="3"/></w:numPr>"#,
    r#"<w:spacing w:line="360" w:lineRule="auto"/></w:pPr>"#,
    r#"<w:r><w:t xml:space="preserve">Поставка </w:t></w:r>"#,
    r#"<w:r><w:rPr><w:highlight w:val="yellow"/></w:rPr><w:t>в течение 30 дней</w:t></w:r></w:p>"#,
);

const SWITCH: &str = concat!(
    r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="3"/></w:numPr></w:pPr>"#,
    r#"<w:r><w:rPr><w:b/><w:highlight w:val="cyan"/></w:rPr>"#,
    r#"<w:t xml:space="preserve">Коммутатор MES5324</w:t></w:r></w:p>"#,
);

const LOGO: &str = concat!(
    r#"<w:p><w:r><w:drawing><wp:inline distT="0" distB="0">"#,
    r#"<wp:extent cx="914400" cy="457200"/><a:graphic/></wp:inline></w:drawing></w:r></w:p>"#,
);

const TABLE_HEAD: &str = concat!(
    r#"<w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblW w:w="0" w:type="auto"/></w:tblPr>"#,
    r#"<w:tblGrid><w:gridCol w:w="4000"/><w:gridCol w:w="1000"/><w:gridCol w:w="2000"/>"#,
    r#"</w:tblGrid>"#,
);

const HEADER_ROW: &str = concat!(
    r#"<w:tr><w:trPr><w:tblHeader/></w:trPr>"#,
    r#"<w:tc><w:tcPr><w:shd w:val="clear" w:color="auto" w:fill="D9E2F3"/></w:tcPr>"#,
    r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Наименование</w:t></w:r></w:p></w:tc>"#,
    r#"<w:tc><w:tcPr><w:shd w:val="clear" w:color="auto" w:fill="D9E2F3"/></w:tcPr>"#,
    r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Кол-во</w:t></w:r></w:p></w:tc>"#,
    r#"<w:tc><w:tcPr><w:shd w:val="clear" w:color="auto" w:fill="D9E2F3"/></w:tcPr>"#,
    r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Сумма</w:t></w:r></w:p></w:tc></w:tr>"#,
);

const SWITCH_ROW: &str = concat!(
    r#"<w:tr><w:tc><w:tcPr><w:tcW w:w="4000" w:type="dxa"/><w:vMerge w:val="restart"/></w:tcPr>"#,
    r#"<w:p><w:r><w:t xml:space="preserve">Коммутатор Eltex MES5324</w:t></w:r></w:p></w:tc>"#,
    r#"<w:tc><w:tcPr><w:tcBorders><w:top w:val="double" w:sz="4" w:space="0" w:color="auto"/>"#,
    r#"</w:tcBorders></w:tcPr><w:p><w:pPr><w:jc w:val="center"/></w:pPr>"#,
    r#"<w:r><w:t xml:space="preserve">2</w:t></w:r></w:p></w:tc>"#,
    r#"<w:tc><w:p><w:pPr><w:jc w:val="right"/></w:pPr><w:r><w:t>998 000</w:t></w:r></w:p></w:tc>"#,
    r#"</w:tr>"#,
);

const CONTINUATION_ROW: &str = concat!(
    r#"<w:tr><w:tc><w:tcPr><w:tcW w:w="4000" w:type="dxa"/><w:vMerge/></w:tcPr><w:p/></w:tc>"#,
    r#"<w:tc><w:p><w:r><w:t>шт.</w:t></w:r></w:p></w:tc><w:tc><w:p/></w:tc></w:tr>"#,
);

const STORAGE_ROW: &str = concat!(
    r#"<w:tr><w:tc><w:p><w:r><w:t>СХД Raidix</w:t></w:r></w:p></w:tc>"#,
    r#"<w:tc><w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>1</w:t></w:r></w:p></w:tc>"#,
    r#"<w:tc><w:p><w:pPr><w:jc w:val="right"/></w:pPr><w:r><w:t>1 500 000</w:t></w:r></w:p>"#,
    r#"</w:tc></w:tr>"#,
);

const TOTAL_ROW: &str = concat!(
    r#"<w:tr><w:tc><w:tcPr><w:gridSpan w:val="2"/></w:tcPr>"#,
    r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>ИТОГО:</w:t></w:r></w:p></w:tc>"#,
    r#"<w:tc><w:p><w:pPr><w:jc w:val="right"/></w:pPr><w:r><w:rPr><w:b/></w:rPr>"#,
    r#"<w:t xml:space="preserve">2 498 000</w:t></w:r></w:p></w:tc></w:tr>"#,
);

const SECTION: &str = concat!(
    r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/>"#,
    r#"<w:pgMar w:top="1134" w:right="850" w:bottom="1134" w:left="1701""#,
    r#" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr>"#,
);

fn document_xml() -> String {
    [
        DECLARATION,
        ROOT,
        "<w:body>",
        HEADING,
        DELIVERY,
        SWITCH,
        LOGO,
        TABLE_HEAD,
        HEADER_ROW,
        SWITCH_ROW,
        CONTINUATION_ROW,
        STORAGE_ROW,
        TOTAL_ROW,
        "</w:tbl>",
        SECTION,
        "</w:body></w:document>",
    ]
    .concat()
}

fn package(document: &str) -> Vec<u8> {
    let parts = [
        (
            "[Content_Types].xml",
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
                r#"<Default Extension="rels" "#,
                r#"ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
                r#"<Default Extension="xml" ContentType="application/xml"/>"#,
                r#"<Override PartName="/word/document.xml" ContentType="application/"#,
                r#"vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
                r#"</Types>"#,
            ),
        ),
        (
            "_rels/.rels",
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
                r#"<Relationship Id="rId1" "#,
                r#"Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" "#,
                r#"Target="word/document.xml"/></Relationships>"#,
            ),
        ),
        ("word/document.xml", document),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn read_part(package: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(package)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

fn resave(edit: impl FnOnce(&mut offerdoc::Document)) -> String {
    let mut doc = offerdoc::open_bytes(&package(&document_xml())).unwrap();
    edit(&mut doc);
    let bytes = write_docx(&doc).unwrap();
    read_part(&bytes, "word/document.xml")
}

fn replace_once(haystack: &str, from: &str, to: &str) -> String {
    assert_eq!(haystack.matches(from).count(), 1, "{:?}", from);
    haystack.replacen(from, to, 1)
}

#[test]
fn test_unedited_document_is_written_back_verbatim() {
    assert_eq!(resave(|_| {}), document_xml());
}

#[test]
fn test_model_reads_through_foreign_markup() {
    let doc = offerdoc::open_bytes(&package(&document_xml())).unwrap();
    assert_eq!(doc.paragraphs().count(), 4);
    assert_eq!(doc.paragraphs().next().unwrap().heading_level(), Some(1));

    let table = doc.tables().next().unwrap();
    assert_eq!(table.header_rows(), 1);
    assert_eq!(table.rows.len(), 5);
    assert_eq!(table.rows[1].cell_texts()[0], "Коммутатор Eltex MES5324");
    assert_eq!(table.rows[4].cells[0].colspan, 2);
}

#[test]
fn test_replace_and_overwrite_keep_untouched_formatting() {
    let xml = resave(|doc| {
        let replaced = replace_text(doc, "MES5324", "MES2300-24").unwrap();
        assert_eq!(replaced.modifications(), 2);
        let rows = RowSelector::all_of(["MES2300-24"]);
        let overwritten = overwrite_cells(doc, &rows, "2", "3").unwrap();
        assert_eq!(overwritten.modifications(), 1);
    });

    let expected = document_xml().replace("MES5324", "MES2300-24");
    let expected = replace_once(
        &expected,
        r#"<w:t xml:space="preserve">2</w:t>"#,
        r#"<w:t xml:space="preserve">3</w:t>"#,
    );
    assert_eq!(xml, expected);

    // the edited paragraph keeps its numbering and its run its highlight
    assert!(xml.contains(
        r#"<w:numId w:val="3"/></w:numPr></w:pPr><w:r><w:rPr><w:b/><w:highlight w:val="cyan"/>"#
    ));
    for kept in [
        r#"<w:spacing w:line="360" w:lineRule="auto"/>"#,
        r#"<w:highlight w:val="yellow"/>"#,
        r#"<w:vMerge w:val="restart"/>"#,
        r#"<w:vMerge/>"#,
        r#"<w:tcBorders>"#,
        r#"<a:graphic/>"#,
        r#"<w:tblW w:w="0" w:type="auto"/>"#,
    ] {
        assert!(xml.contains(kept), "{} lost", kept);
    }
}

#[test]
fn test_row_deletion_and_recalculation_keep_the_rest() {
    let xml = resave(|doc| {
        delete_rows(doc, &RowSelector::all_of(["Raidix"])).unwrap();
        let totals = recalculate_totals(doc, &TotalsSpec::default()).unwrap();
        assert_eq!(totals.modifications(), 1);
    });

    let expected = replace_once(&document_xml(), STORAGE_ROW, "");
    let expected = replace_once(&expected, ">2 498 000</w:t>", ">998 000</w:t>");
    assert_eq!(xml, expected);
}

#[test]
fn test_edited_text_is_read_back() {
    let mut doc = offerdoc::open_bytes(&package(&document_xml())).unwrap();
    replace_text(&mut doc, "MES5324", "MES2300-24").unwrap();
    let back = offerdoc::open_bytes(&write_docx(&doc).unwrap()).unwrap();

    let switch = back.paragraphs().nth(2).unwrap();
    assert_eq!(switch.plain_text(), "Коммутатор MES2300-24");
    assert!(switch.runs().next().unwrap().style.bold);
    let table = back.tables().next().unwrap();
    assert_eq!(table.rows[1].cell_texts()[0], "Коммутатор Eltex MES2300-24");
}
