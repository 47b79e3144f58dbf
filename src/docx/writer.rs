//! WordprocessingML package writer.

use super::xml::XmlOut;
use super::{cell_head, table_head, CORE_PART, DOCUMENT_PART};
use crate::error::Result;
use crate::model::{
    Alignment, Block, Document, InlineContent, Metadata, Paragraph, ParagraphStyle, Table,
    TableCell, TableRow, TextStyle,
};
use chrono::{DateTime, Utc};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// A4 width in twips.
const PAGE_WIDTH: u32 = 11906;
/// A4 height in twips.
const PAGE_HEIGHT: u32 = 16838;
const MARGIN_LEFT: u32 = 1701;
const MARGIN_RIGHT: u32 = 850;
const MARGIN_VERTICAL: u32 = 1134;
/// Usable text width in twips.
const TEXT_WIDTH: u32 = PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;

const FOOTER_PART: &str = "word/footer1.xml";
const FOOTER_REL: &str = "rId2";

/// Serialize `doc` to a `.docx` package in memory.
///
/// A document loaded from a package keeps every other part of that package
/// byte for byte. In the body, blocks that were not edited are written back
/// from their source markup; edited ones are regenerated inside their
/// original properties. Core properties are regenerated when present.
pub fn write_docx(doc: &Document) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    match &doc.source {
        Some(source) => {
            let body = document_xml(
                doc,
                source.root_tag.as_deref(),
                source.section_properties.as_deref(),
            )?;
            // [Content_Types].xml leads the archive
            let mut names: Vec<&String> = source.parts.keys().collect();
            names.sort_by_key(|n| n.as_str() != "[Content_Types].xml");
            for name in names {
                if name == CORE_PART {
                    continue;
                }
                zip.start_file(name.as_str(), options)?;
                zip.write_all(&source.parts[name])?;
            }
            zip.start_file(DOCUMENT_PART, options)?;
            zip.write_all(&body)?;
            if source.has_part(CORE_PART) {
                zip.start_file(CORE_PART, options)?;
                zip.write_all(&core_xml(&doc.metadata)?)?;
            }
        }
        None => {
            let has_footer = doc.footer.is_some();
            let parts: Vec<(&str, Vec<u8>)> = vec![
                ("[Content_Types].xml", content_types_xml(has_footer)?),
                ("_rels/.rels", package_rels_xml()?),
                ("docProps/core.xml", core_xml(&doc.metadata)?),
                ("word/_rels/document.xml.rels", document_rels_xml(has_footer)?),
                ("word/styles.xml", styles_xml()?),
                (DOCUMENT_PART, document_xml(doc, None, None)?),
            ];
            for (name, bytes) in parts {
                zip.start_file(name, options)?;
                zip.write_all(&bytes)?;
            }
            if let Some(footer) = &doc.footer {
                zip.start_file(FOOTER_PART, options)?;
                zip.write_all(&footer_xml(footer)?)?;
            }
        }
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn content_types_xml(has_footer: bool) -> Result<Vec<u8>> {
    const MAIN: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml";
    let mut out = XmlOut::new()?;
    out.start(
        "Types",
        &[("xmlns", "http://schemas.openxmlformats.org/package/2006/content-types")],
    )?;
    out.empty(
        "Default",
        &[
            ("Extension", "rels"),
            ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
        ],
    )?;
    out.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;

    let document = format!("{}.document.main+xml", MAIN);
    let styles = format!("{}.styles+xml", MAIN);
    let footer = format!("{}.footer+xml", MAIN);
    out.empty("Override", &[("PartName", "/word/document.xml"), ("ContentType", &document)])?;
    out.empty("Override", &[("PartName", "/word/styles.xml"), ("ContentType", &styles)])?;
    if has_footer {
        out.empty("Override", &[("PartName", "/word/footer1.xml"), ("ContentType", &footer)])?;
    }
    out.empty(
        "Override",
        &[
            ("PartName", "/docProps/core.xml"),
            ("ContentType", "application/vnd.openxmlformats-package.core-properties+xml"),
        ],
    )?;
    out.end("Types")?;
    Ok(out.finish())
}

fn package_rels_xml() -> Result<Vec<u8>> {
    let mut out = XmlOut::new()?;
    out.start(
        "Relationships",
        &[("xmlns", "http://schemas.openxmlformats.org/package/2006/relationships")],
    )?;
    let office = format!("{}/officeDocument", REL_BASE);
    out.empty(
        "Relationship",
        &[("Id", "rId1"), ("Type", &office), ("Target", "word/document.xml")],
    )?;
    out.empty(
        "Relationship",
        &[
            ("Id", "rId2"),
            (
                "Type",
                "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
            ),
            ("Target", "docProps/core.xml"),
        ],
    )?;
    out.end("Relationships")?;
    Ok(out.finish())
}

fn document_rels_xml(has_footer: bool) -> Result<Vec<u8>> {
    let mut out = XmlOut::new()?;
    out.start(
        "Relationships",
        &[("xmlns", "http://schemas.openxmlformats.org/package/2006/relationships")],
    )?;
    let styles = format!("{}/styles", REL_BASE);
    out.empty("Relationship", &[("Id", "rId1"), ("Type", &styles), ("Target", "styles.xml")])?;
    if has_footer {
        let footer = format!("{}/footer", REL_BASE);
        out.empty(
            "Relationship",
            &[("Id", FOOTER_REL), ("Type", &footer), ("Target", "footer1.xml")],
        )?;
    }
    out.end("Relationships")?;
    Ok(out.finish())
}

fn styles_xml() -> Result<Vec<u8>> {
    let mut out = XmlOut::new()?;
    out.start("w:styles", &[("xmlns:w", NS_W)])?;

    out.start("w:docDefaults", &[])?;
    out.start("w:rPrDefault", &[])?;
    out.start("w:rPr", &[])?;
    out.empty(
        "w:rFonts",
        &[("w:ascii", "Arial"), ("w:hAnsi", "Arial"), ("w:cs", "Arial"), ("w:eastAsia", "Arial")],
    )?;
    out.empty("w:sz", &[("w:val", "22")])?;
    out.empty("w:szCs", &[("w:val", "22")])?;
    out.empty("w:lang", &[("w:val", "ru-RU")])?;
    out.end("w:rPr")?;
    out.end("w:rPrDefault")?;
    out.end("w:docDefaults")?;

    out.start("w:style", &[("w:type", "paragraph"), ("w:default", "1"), ("w:styleId", "Normal")])?;
    out.empty("w:name", &[("w:val", "Normal")])?;
    out.end("w:style")?;

    for level in 1..=6u8 {
        let id = format!("Heading{}", level);
        let name = format!("heading {}", level);
        let outline = (level - 1).to_string();
        out.start("w:style", &[("w:type", "paragraph"), ("w:styleId", &id)])?;
        out.empty("w:name", &[("w:val", &name)])?;
        out.empty("w:basedOn", &[("w:val", "Normal")])?;
        out.empty("w:next", &[("w:val", "Normal")])?;
        out.start("w:pPr", &[])?;
        out.empty("w:keepNext", &[])?;
        out.empty("w:outlineLvl", &[("w:val", &outline)])?;
        out.end("w:pPr")?;
        out.end("w:style")?;
    }

    out.start("w:style", &[("w:type", "table"), ("w:styleId", "TableGrid")])?;
    out.empty("w:name", &[("w:val", "Table Grid")])?;
    out.start("w:tblPr", &[])?;
    write_borders(&mut out, "w:tblBorders")?;
    out.end("w:tblPr")?;
    out.end("w:style")?;

    out.end("w:styles")?;
    Ok(out.finish())
}

fn w3c_date(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn core_xml(meta: &Metadata) -> Result<Vec<u8>> {
    let mut out = XmlOut::new()?;
    out.start(
        "cp:coreProperties",
        &[
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:dcmitype", "http://purl.org/dc/dcmitype/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    if let Some(title) = &meta.title {
        out.text_element("dc:title", &[], title)?;
    }
    if let Some(subject) = &meta.subject {
        out.text_element("dc:subject", &[], subject)?;
    }
    if let Some(author) = &meta.author {
        out.text_element("dc:creator", &[], author)?;
    }
    if let Some(revision) = meta.revision {
        out.text_element("cp:revision", &[], &revision.to_string())?;
    }
    let w3c = [("xsi:type", "dcterms:W3CDTF")];
    if let Some(created) = &meta.created {
        out.text_element("dcterms:created", &w3c, &w3c_date(created))?;
    }
    let modified = meta.modified.unwrap_or_else(Utc::now);
    out.text_element("dcterms:modified", &w3c, &w3c_date(&modified))?;
    out.end("cp:coreProperties")?;
    Ok(out.finish())
}

fn footer_xml(footer: &Paragraph) -> Result<Vec<u8>> {
    let mut out = XmlOut::new()?;
    out.start("w:ftr", &[("xmlns:w", NS_W), ("xmlns:r", NS_R)])?;
    write_paragraph(&mut out, footer)?;
    out.end("w:ftr")?;
    Ok(out.finish())
}

fn document_xml(
    doc: &Document,
    root_tag: Option<&str>,
    section_properties: Option<&str>,
) -> Result<Vec<u8>> {
    let mut out = XmlOut::new()?;
    match root_tag {
        Some(tag) => out.raw(tag),
        None => out.start("w:document", &[("xmlns:w", NS_W), ("xmlns:r", NS_R)])?,
    }
    out.start("w:body", &[])?;

    for block in &doc.blocks {
        match block {
            Block::Paragraph(p) => write_paragraph(&mut out, p)?,
            Block::Table(t) => write_table(&mut out, t)?,
            Block::PageBreak => write_paragraph(&mut out, &Paragraph::page_break())?,
        }
    }

    match section_properties {
        Some(sect) => out.raw(sect),
        None => write_section_properties(&mut out, doc.footer.is_some())?,
    }
    out.end("w:body")?;
    out.end("w:document")?;
    Ok(out.finish())
}

fn write_section_properties(out: &mut XmlOut, has_footer: bool) -> Result<()> {
    out.start("w:sectPr", &[])?;
    if has_footer {
        out.empty("w:footerReference", &[("w:type", "default"), ("r:id", FOOTER_REL)])?;
    }
    let (w, h) = (PAGE_WIDTH.to_string(), PAGE_HEIGHT.to_string());
    out.empty("w:pgSz", &[("w:w", &w), ("w:h", &h)])?;
    let (v, l, r) = (
        MARGIN_VERTICAL.to_string(),
        MARGIN_LEFT.to_string(),
        MARGIN_RIGHT.to_string(),
    );
    out.empty(
        "w:pgMar",
        &[
            ("w:top", &v),
            ("w:right", &r),
            ("w:bottom", &v),
            ("w:left", &l),
            ("w:header", "708"),
            ("w:footer", "708"),
            ("w:gutter", "0"),
        ],
    )?;
    out.end("w:sectPr")
}

fn twips(points: f32) -> String {
    ((points * 20.0).round() as i64).to_string()
}

fn jc_value(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "both",
    }
}

fn write_paragraph(out: &mut XmlOut, p: &Paragraph) -> Result<()> {
    let markup = p.markup.as_ref();
    if let Some(xml) = markup.and_then(|m| m.unchanged(p)) {
        out.raw(xml);
        return Ok(());
    }
    match markup.and_then(|m| m.head_for(&p.style)) {
        Some(head) => out.raw(head),
        None => {
            out.start("w:p", &[])?;
            write_paragraph_properties(out, &p.style)?;
        }
    }

    let raw_props = |style: &TextStyle| markup.and_then(|m| m.run_properties_for(style));
    let mut last_style = TextStyle::default();
    for item in &p.content {
        match item {
            InlineContent::Text(run) => {
                write_run(out, &run.text, &run.style, raw_props(&run.style))?;
                last_style = run.style.clone();
            }
            InlineContent::PageBreak => {
                out.start("w:r", &[])?;
                out.empty("w:br", &[("w:type", "page")])?;
                out.end("w:r")?;
            }
            InlineContent::PageNumber => {
                write_page_field(out, &last_style, raw_props(&last_style))?
            }
        }
    }

    out.end("w:p")
}

fn write_paragraph_properties(out: &mut XmlOut, style: &ParagraphStyle) -> Result<()> {
    let style_id = style
        .style_id
        .clone()
        .or_else(|| style.heading_level.map(|l| format!("Heading{}", l)));
    let has_props = style_id.is_some()
        || style.space_before.is_some()
        || style.space_after.is_some()
        || style.left_indent.is_some()
        || style.first_line_indent.is_some()
        || style.alignment != Alignment::Left;

    if has_props {
        out.start("w:pPr", &[])?;
        if let Some(id) = &style_id {
            out.empty("w:pStyle", &[("w:val", id)])?;
        }
        if style.space_before.is_some() || style.space_after.is_some() {
            let before = twips(style.space_before.unwrap_or(0.0));
            let after = twips(style.space_after.unwrap_or(0.0));
            out.empty("w:spacing", &[("w:before", &before), ("w:after", &after)])?;
        }
        if style.left_indent.is_some() || style.first_line_indent.is_some() {
            let left = twips(style.left_indent.unwrap_or(0.0));
            let first = style.first_line_indent.unwrap_or(0.0);
            let amount = twips(first.abs());
            let key = if first < 0.0 { "w:hanging" } else { "w:firstLine" };
            out.empty("w:ind", &[("w:left", &left), (key, &amount)])?;
        }
        if style.alignment != Alignment::Left {
            out.empty("w:jc", &[("w:val", jc_value(style.alignment))])?;
        }
        out.end("w:pPr")?;
    }
    Ok(())
}

fn write_run_properties(out: &mut XmlOut, style: &TextStyle) -> Result<()> {
    if style == &TextStyle::default() {
        return Ok(());
    }
    out.start("w:rPr", &[])?;
    if let Some(font) = &style.font_name {
        out.empty(
            "w:rFonts",
            &[("w:ascii", font), ("w:hAnsi", font), ("w:cs", font)],
        )?;
    }
    if style.bold {
        out.empty("w:b", &[])?;
        out.empty("w:bCs", &[])?;
    }
    if style.italic {
        out.empty("w:i", &[])?;
        out.empty("w:iCs", &[])?;
    }
    if let Some(color) = style.color {
        out.empty("w:color", &[("w:val", &color.to_hex())])?;
    }
    if let Some(size) = style.font_size {
        let half_points = ((size * 2.0).round() as i64).to_string();
        out.empty("w:sz", &[("w:val", &half_points)])?;
        out.empty("w:szCs", &[("w:val", &half_points)])?;
    }
    if style.underline {
        out.empty("w:u", &[("w:val", "single")])?;
    }
    out.end("w:rPr")
}

/// Write a run; `raw_props` is `<w:rPr>` markup read for the same style.
fn write_run(
    out: &mut XmlOut,
    text: &str,
    style: &TextStyle,
    raw_props: Option<&str>,
) -> Result<()> {
    out.start("w:r", &[])?;
    match raw_props {
        Some(raw) => out.raw(raw),
        None => write_run_properties(out, style)?,
    }

    let mut segment = String::new();
    for ch in text.chars() {
        match ch {
            '\t' | '\n' => {
                if !segment.is_empty() {
                    out.text_element("w:t", &[("xml:space", "preserve")], &segment)?;
                    segment.clear();
                }
                out.empty(if ch == '\t' { "w:tab" } else { "w:br" }, &[])?;
            }
            _ => segment.push(ch),
        }
    }
    if !segment.is_empty() {
        out.text_element("w:t", &[("xml:space", "preserve")], &segment)?;
    }

    out.end("w:r")
}

fn write_page_field(
    out: &mut XmlOut,
    style: &TextStyle,
    raw_props: Option<&str>,
) -> Result<()> {
    let props = |out: &mut XmlOut| -> Result<()> {
        match raw_props {
            Some(raw) => {
                out.raw(raw);
                Ok(())
            }
            None => write_run_properties(out, style),
        }
    };
    let field_run = |out: &mut XmlOut, kind: &str| -> Result<()> {
        out.start("w:r", &[])?;
        props(out)?;
        out.empty("w:fldChar", &[("w:fldCharType", kind)])?;
        out.end("w:r")
    };

    field_run(out, "begin")?;
    out.start("w:r", &[])?;
    props(out)?;
    out.text_element("w:instrText", &[("xml:space", "preserve")], " PAGE ")?;
    out.end("w:r")?;
    field_run(out, "separate")?;
    write_run(out, "1", style, raw_props)?;
    field_run(out, "end")
}

fn write_borders(out: &mut XmlOut, container: &str) -> Result<()> {
    out.start(container, &[])?;
    for side in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
        out.empty(
            side,
            &[("w:val", "single"), ("w:sz", "4"), ("w:space", "0"), ("w:color", "auto")],
        )?;
    }
    out.end(container)
}

/// Column widths in twips scaled to the text width.
fn grid_widths(table: &Table) -> Vec<u32> {
    let columns = table.column_count();
    if columns == 0 {
        return Vec::new();
    }
    let relative: Vec<f32> = match &table.column_widths {
        Some(w) if w.len() == columns && w.iter().all(|x| *x > 0.0) => w.clone(),
        _ => vec![1.0; columns],
    };
    let sum: f32 = relative.iter().sum();
    relative
        .iter()
        .map(|w| (w / sum * TEXT_WIDTH as f32).round() as u32)
        .collect()
}

fn write_table(out: &mut XmlOut, table: &Table) -> Result<()> {
    let markup = table.markup.as_ref();
    if let Some(xml) = markup.and_then(|m| m.unchanged(table)) {
        out.raw(xml);
        return Ok(());
    }

    let grid = grid_widths(table);
    match markup.and_then(|m| m.head_for(&table_head(table))) {
        Some(head) => out.raw(head),
        None => write_table_head(out, table, &grid)?,
    }
    for row in &table.rows {
        write_row(out, row, &grid)?;
    }
    out.end("w:tbl")
}

fn write_table_head(out: &mut XmlOut, table: &Table, grid: &[u32]) -> Result<()> {
    out.start("w:tbl", &[])?;
    out.start("w:tblPr", &[])?;
    if let Some(id) = &table.style_id {
        out.empty("w:tblStyle", &[("w:val", id)])?;
    }
    out.empty("w:tblW", &[("w:w", "5000"), ("w:type", "pct")])?;
    write_borders(out, "w:tblBorders")?;
    out.empty("w:tblLayout", &[("w:type", "fixed")])?;
    out.end("w:tblPr")?;

    out.start("w:tblGrid", &[])?;
    for width in grid {
        out.empty("w:gridCol", &[("w:w", &width.to_string())])?;
    }
    out.end("w:tblGrid")
}

fn write_row(out: &mut XmlOut, row: &TableRow, grid: &[u32]) -> Result<()> {
    let markup = row.markup.as_ref();
    if let Some(xml) = markup.and_then(|m| m.unchanged(row)) {
        out.raw(xml);
        return Ok(());
    }

    match markup.and_then(|m| m.head_for(&row.is_header)) {
        Some(head) => out.raw(head),
        None => {
            out.start("w:tr", &[])?;
            if row.is_header {
                out.start("w:trPr", &[])?;
                out.empty("w:tblHeader", &[])?;
                out.end("w:trPr")?;
            }
        }
    }
    let mut col = 0;
    for cell in &row.cells {
        let span = cell.colspan.max(1) as usize;
        let width: u32 = grid.iter().skip(col).take(span).sum();
        col += span;
        write_cell(out, cell, width)?;
    }
    out.end("w:tr")
}

fn write_cell(out: &mut XmlOut, cell: &TableCell, width: u32) -> Result<()> {
    let markup = cell.markup.as_ref();
    if let Some(xml) = markup.and_then(|m| m.unchanged(cell)) {
        out.raw(xml);
        return Ok(());
    }

    match markup.and_then(|m| m.head_for(&cell_head(cell))) {
        Some(head) => out.raw(head),
        None => write_cell_head(out, cell, width)?,
    }
    // a cell must end with a paragraph
    if cell.content.is_empty() {
        out.empty("w:p", &[])?;
    }
    for p in &cell.content {
        write_paragraph(out, p)?;
    }
    out.end("w:tc")
}

fn write_cell_head(out: &mut XmlOut, cell: &TableCell, width: u32) -> Result<()> {
    out.start("w:tc", &[])?;
    out.start("w:tcPr", &[])?;
    out.empty("w:tcW", &[("w:w", &width.to_string()), ("w:type", "dxa")])?;
    if cell.colspan > 1 {
        out.empty("w:gridSpan", &[("w:val", &cell.colspan.to_string())])?;
    }
    if let Some(fill) = cell.shading {
        out.empty(
            "w:shd",
            &[("w:val", "clear"), ("w:color", "auto"), ("w:fill", &fill.to_hex())],
        )?;
    }
    out.end("w:tcPr")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Color, TableRow, TextRun};
    use std::io::Read;

    fn part(bytes: &[u8], name: &str) -> String {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut s = String::new();
        zip.by_name(name).unwrap().read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn test_fresh_package_parts() {
        let mut doc = Document::new();
        doc.metadata.title = Some("КП".into());
        doc.metadata.revision = Some(12);
        doc.push(Paragraph::heading("1. ОПИСАНИЕ", 1));
        let mut footer = Paragraph::with_text("Страница ").align(Alignment::Right);
        footer.add_page_number();
        doc.footer = Some(footer);

        let bytes = write_docx(&doc).unwrap();
        let body = part(&bytes, "word/document.xml");
        assert!(body.contains("<w:pStyle w:val=\"Heading1\"/>"));
        assert!(body.contains("<w:footerReference w:type=\"default\" r:id=\"rId2\"/>"));

        let footer = part(&bytes, "word/footer1.xml");
        assert!(footer.contains(" PAGE "));
        assert!(footer.contains("<w:jc w:val=\"right\"/>"));

        let core = part(&bytes, "docProps/core.xml");
        assert!(core.contains("<cp:revision>12</cp:revision>"));
        assert!(core.contains("<dc:title>КП</dc:title>"));
    }

    #[test]
    fn test_run_markup() {
        let mut p = Paragraph::new();
        p.add_run(TextRun::styled(
            "ИТОГО:\tвсего",
            TextStyle {
                bold: true,
                font_size: Some(12.0),
                color: Some(Color(0, 51, 102)),
                ..Default::default()
            },
        ));
        let mut out = XmlOut::new().unwrap();
        write_paragraph(&mut out, &p).unwrap();
        let xml = String::from_utf8(out.finish()).unwrap();
        assert!(xml.contains(
            "<w:rPr><w:b/><w:bCs/><w:color w:val=\"003366\"/><w:sz w:val=\"24\"/><w:szCs w:val=\"24\"/></w:rPr>"
        ));
        assert!(xml.contains("ИТОГО:</w:t><w:tab/><w:t xml:space=\"preserve\">всего"));
    }

    #[test]
    fn test_grid_follows_relative_widths() {
        let mut table = Table::new();
        table.column_widths = Some(vec![90.0, 20.0, 40.0, 40.0]);
        table.add_row(TableRow::from_strings(["a", "b", "c", "d"]));
        let grid = grid_widths(&table);
        assert_eq!(grid.len(), 4);
        assert!(grid[0] > grid[2] && grid[2] > grid[1]);
        let total: u32 = grid.iter().sum();
        assert!(total.abs_diff(TEXT_WIDTH) <= 2);
    }
}
