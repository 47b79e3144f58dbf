//! WordprocessingML package reader.

use super::xml::{attr, attr_num, toggle};
use super::{cell_head, table_head, CORE_PART, DOCUMENT_PART};
use crate::error::{Error, Result};
use crate::model::{
    Alignment, Block, Color, Document, InlineContent, Metadata, Paragraph, ParagraphStyle,
    SourceMarkup, SourcePackage, Table, TableCell, TableRow, TextRun, TextStyle,
};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};

/// Parse a `.docx` package.
///
/// Every part other than the main document is kept in
/// [`Document::source`] so that a later save writes it back unchanged.
pub fn read_docx(data: &[u8]) -> Result<Document> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
    let mut parts = BTreeMap::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)?;
        parts.insert(file.name().to_string(), bytes);
    }

    let body = parts
        .remove(DOCUMENT_PART)
        .ok_or_else(|| Error::MissingPart(DOCUMENT_PART.to_string()))?;
    let body = String::from_utf8(body)
        .map_err(|e| Error::Xml(format!("{} is not UTF-8: {}", DOCUMENT_PART, e)))?;

    let mut doc = BodyParser::new(&body).parse()?;
    if let Some(core) = parts.get(CORE_PART) {
        doc.metadata = parse_core(&String::from_utf8_lossy(core));
    }

    log::debug!(
        "read {} blocks, {} passthrough parts",
        doc.blocks.len(),
        parts.len()
    );

    doc.source = Some(SourcePackage {
        parts,
        root_tag: root_tag(&body),
        section_properties: body_section_properties(&body),
    });
    Ok(doc)
}

/// Opening tag of the document root, namespaces included.
fn root_tag(xml: &str) -> Option<String> {
    let start = xml.find("<w:document")?;
    let end = start + xml[start..].find('>')?;
    Some(xml[start..=end].to_string())
}

/// Trailing `<w:sectPr>` of the body.
fn body_section_properties(xml: &str) -> Option<String> {
    let body_end = xml.rfind("</w:body>")?;
    let start = xml[..body_end].rfind("<w:sectPr")?;
    let sect = xml[start..body_end].trim_end();
    // a paragraph-level sectPr is followed by the end of its paragraph
    if sect.contains("</w:p>") || !(sect.ends_with("</w:sectPr>") || sect.ends_with("/>")) {
        return None;
    }
    Some(sect.to_string())
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_core(xml: &str) -> Metadata {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut meta = Metadata::default();
    let mut current: Option<Vec<u8>> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => current = Some(e.name().as_ref().to_vec()),
            Ok(Event::Text(e)) => {
                let text = e.unescape().map(|t| t.trim().to_string()).unwrap_or_default();
                match current.as_deref() {
                    Some(b"dc:title") => meta.title = Some(text),
                    Some(b"dc:subject") => meta.subject = Some(text),
                    Some(b"dc:creator") => meta.author = Some(text),
                    Some(b"cp:revision") => meta.revision = text.parse().ok(),
                    Some(b"dcterms:created") => meta.created = parse_datetime(&text),
                    Some(b"dcterms:modified") => meta.modified = parse_datetime(&text),
                    _ => {}
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    meta
}

fn heading_level(style_id: &str) -> Option<u8> {
    let lower = style_id.to_ascii_lowercase();
    let digits = lower.strip_prefix("heading")?.trim();
    digits.parse::<u8>().ok().filter(|l| (1..=6).contains(l))
}

fn alignment(value: &str) -> Alignment {
    match value {
        "center" => Alignment::Center,
        "right" | "end" => Alignment::Right,
        "both" | "distribute" => Alignment::Justify,
        _ => Alignment::Left,
    }
}

fn points(twips: i64) -> f32 {
    twips as f32 / 20.0
}

/// Field code state inside a paragraph.
#[derive(Debug, Default, PartialEq)]
enum Field {
    #[default]
    None,
    Code(String),
    Result { page: bool },
}

/// Byte range of an open element in the body part.
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    /// End of the opening tag and property block
    head_end: Option<usize>,
}

impl Span {
    fn open(start: usize) -> Self {
        Self {
            start,
            head_end: None,
        }
    }
}

/// Body state machine.
///
/// Only the first table level is kept as a table; paragraphs of nested
/// tables are flattened into the enclosing cell. Every paragraph, table,
/// row and cell keeps the markup it was read from.
#[derive(Default)]
struct BodyParser<'a> {
    xml: &'a str,
    doc: Document,
    in_body: bool,
    skip: usize,

    table_depth: usize,
    table: Option<Table>,
    row: Option<TableRow>,
    cell: Option<TableCell>,
    table_span: Option<Span>,
    row_span: Option<Span>,
    cell_span: Option<Span>,

    paragraph: Option<Paragraph>,
    paragraph_span: Option<Span>,
    in_ppr: bool,

    run: Option<TextRun>,
    in_rpr: bool,
    rpr_start: Option<usize>,
    run_rpr: Option<String>,
    run_properties: Vec<(TextStyle, String)>,
    in_text: bool,
    in_instr: bool,
    field: Field,
}

impl<'a> BodyParser<'a> {
    fn new(xml: &'a str) -> Self {
        Self {
            xml,
            ..Default::default()
        }
    }

    fn parse(mut self) -> Result<Document> {
        let mut reader = Reader::from_str(self.xml);
        // whitespace inside <w:t> is content
        reader.trim_text(false);

        let mut buf = Vec::new();
        loop {
            let from = reader.buffer_position();
            let event = reader.read_event_into(&mut buf)?;
            let to = reader.buffer_position();
            match event {
                Event::Start(e) => self.start(&e, false, from, to),
                Event::Empty(e) => {
                    self.start(&e, true, from, to);
                    self.end(e.name().as_ref(), true, to);
                }
                Event::Text(e) => {
                    if self.skip == 0 && (self.in_text || self.in_instr) {
                        let text = e.unescape()?;
                        self.text(&text);
                    }
                }
                Event::End(e) => self.end(e.name().as_ref(), false, to),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(self.doc)
    }

    fn slice(&self, from: usize, to: usize) -> String {
        self.xml.get(from..to).unwrap_or_default().to_string()
    }

    fn head(&self, span: &Span) -> Option<String> {
        span.head_end.map(|end| self.slice(span.start, end))
    }

    /// Close the head of the enclosing first-level container.
    fn mark_first_child(&mut self, name: &[u8], pos: usize) {
        if self.table_depth != 1 {
            return;
        }
        let span = match name {
            b"w:tr" => self.table_span.as_mut(),
            b"w:tc" => self.row_span.as_mut(),
            b"w:p" | b"w:tbl" => self.cell_span.as_mut(),
            _ => None,
        };
        if let Some(span) = span {
            span.head_end.get_or_insert(pos);
        }
    }

    fn start(&mut self, e: &BytesStart<'_>, empty: bool, from: usize, to: usize) {
        let qname = e.name();
        let name = qname.as_ref();

        if self.skip > 0 {
            if !empty {
                self.skip += 1;
            }
            return;
        }
        if self.in_body {
            self.mark_first_child(name, from);
        }

        match name {
            b"w:body" => self.in_body = true,
            // drawings, legacy shapes and alternate content carry their own paragraphs
            b"w:drawing" | b"w:pict" | b"w:object" | b"mc:Fallback" if !empty => self.skip = 1,
            _ if !self.in_body => {}

            b"w:tbl" => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.table = Some(Table::new());
                    self.table_span = Some(Span::open(from));
                }
            }
            b"w:tblStyle" if self.table_depth == 1 && self.row.is_none() => {
                if let Some(t) = self.table.as_mut() {
                    t.style_id = attr(e, b"w:val");
                }
            }
            b"w:gridCol" if self.table_depth == 1 => {
                if let (Some(t), Some(w)) = (self.table.as_mut(), attr_num::<f32>(e, b"w:w")) {
                    t.column_widths.get_or_insert_with(Vec::new).push(w);
                }
            }
            b"w:tr" if self.table_depth == 1 => {
                self.row = Some(TableRow::new(Vec::new()));
                self.row_span = Some(Span::open(from));
            }
            b"w:tblHeader" if self.table_depth == 1 => {
                if let Some(row) = self.row.as_mut() {
                    row.is_header = toggle(e);
                }
            }
            b"w:tc" if self.table_depth == 1 => {
                self.cell = Some(TableCell::empty());
                self.cell_span = Some(Span::open(from));
            }
            b"w:gridSpan" if self.table_depth == 1 => {
                let span = attr_num::<u8>(e, b"w:val");
                if let (Some(cell), Some(span)) = (self.cell.as_mut(), span) {
                    cell.colspan = span.max(1);
                }
            }
            b"w:shd" if self.table_depth == 1 && self.paragraph.is_none() => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.shading = attr(e, b"w:fill").and_then(|f| Color::from_hex(&f));
                }
            }

            b"w:p" => {
                self.paragraph = Some(Paragraph::new());
                self.paragraph_span = Some(Span {
                    start: from,
                    head_end: (!empty).then_some(to),
                });
                self.run_properties.clear();
                self.field = Field::None;
            }
            b"w:pPr" => self.in_ppr = true,
            b"w:r" if self.paragraph.is_some() => {
                self.run = Some(TextRun::new(String::new()));
                self.run_rpr = None;
            }
            b"w:rPr" if self.run.is_some() => {
                self.in_rpr = true;
                self.rpr_start = Some(from);
            }

            _ if self.in_ppr && self.run.is_none() => self.paragraph_property(name, e),
            _ if self.in_rpr => self.run_property(name, e),

            b"w:t" if self.run.is_some() => self.in_text = !empty,
            b"w:instrText" if self.run.is_some() => self.in_instr = !empty,
            b"w:tab" if self.run.is_some() => self.text("\t"),
            b"w:br" | b"w:cr" if self.run.is_some() => {
                if attr(e, b"w:type").as_deref() == Some("page") {
                    self.flush_run();
                    if let Some(p) = self.paragraph.as_mut() {
                        p.content.push(InlineContent::PageBreak);
                    }
                } else {
                    self.text("\n");
                }
            }
            b"w:fldChar" => self.field_char(attr(e, b"w:fldCharType").as_deref()),
            _ => {}
        }
    }

    fn paragraph_property(&mut self, name: &[u8], e: &BytesStart<'_>) {
        let Some(p) = self.paragraph.as_mut() else {
            return;
        };
        let style = &mut p.style;
        match name {
            b"w:pStyle" => {
                if let Some(id) = attr(e, b"w:val") {
                    style.heading_level = heading_level(&id);
                    style.style_id = Some(id);
                }
            }
            b"w:jc" => {
                if let Some(v) = attr(e, b"w:val") {
                    style.alignment = alignment(&v);
                }
            }
            b"w:spacing" => {
                style.space_before = attr_num::<i64>(e, b"w:before").map(points);
                style.space_after = attr_num::<i64>(e, b"w:after").map(points);
            }
            b"w:ind" => {
                style.left_indent = attr_num::<i64>(e, b"w:left")
                    .or_else(|| attr_num::<i64>(e, b"w:start"))
                    .map(points);
                style.first_line_indent = match (
                    attr_num::<i64>(e, b"w:hanging"),
                    attr_num::<i64>(e, b"w:firstLine"),
                ) {
                    (Some(h), _) => Some(-points(h)),
                    (None, Some(f)) => Some(points(f)),
                    _ => None,
                };
            }
            _ => {}
        }
    }

    fn run_property(&mut self, name: &[u8], e: &BytesStart<'_>) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        let style = &mut run.style;
        match name {
            b"w:b" => style.bold = toggle(e),
            b"w:i" => style.italic = toggle(e),
            b"w:u" => style.underline = toggle(e),
            b"w:color" => style.color = attr(e, b"w:val").and_then(|v| Color::from_hex(&v)),
            b"w:sz" => style.font_size = attr_num::<f32>(e, b"w:val").map(|hp| hp / 2.0),
            b"w:rFonts" => {
                if let Some(font) = attr(e, b"w:ascii").or_else(|| attr(e, b"w:hAnsi")) {
                    style.font_name = Some(font);
                }
            }
            _ => {}
        }
    }

    fn field_char(&mut self, kind: Option<&str>) {
        match kind {
            Some("begin") => self.field = Field::Code(String::new()),
            Some("separate") => {
                let page = match &self.field {
                    Field::Code(code) => code
                        .split_whitespace()
                        .next()
                        .is_some_and(|c| c.eq_ignore_ascii_case("PAGE")),
                    _ => false,
                };
                self.flush_run();
                if page {
                    if let Some(p) = self.paragraph.as_mut() {
                        p.content.push(InlineContent::PageNumber);
                    }
                }
                self.field = Field::Result { page };
            }
            Some("end") => {
                if matches!(self.field, Field::Result { page: true }) {
                    if let Some(run) = self.run.as_mut() {
                        run.text.clear();
                    }
                }
                self.field = Field::None;
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_instr {
            if let Field::Code(code) = &mut self.field {
                code.push_str(text);
            }
            return;
        }
        // cached result of a page field is recomputed on render
        if self.field == (Field::Result { page: true }) {
            return;
        }
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        }
    }

    /// Move the current run's text into the paragraph, keeping its style.
    fn flush_run(&mut self) {
        let (Some(run), Some(p)) = (self.run.as_mut(), self.paragraph.as_mut()) else {
            return;
        };
        if !run.text.is_empty() {
            let text = std::mem::take(&mut run.text);
            p.add_run(TextRun::styled(text, run.style.clone()));
        }
    }

    fn end(&mut self, name: &[u8], empty: bool, to: usize) {
        if self.skip > 0 {
            if !empty {
                self.skip -= 1;
            }
            return;
        }

        match name {
            b"w:body" => self.in_body = false,
            b"w:t" => self.in_text = false,
            b"w:instrText" => self.in_instr = false,
            b"w:rPr" => {
                if let Some(start) = self.rpr_start.take().filter(|_| self.run.is_some()) {
                    self.run_rpr = Some(self.slice(start, to));
                }
                self.in_rpr = false;
            }
            b"w:pPr" => {
                if self.run.is_none() {
                    if let Some(span) = self.paragraph_span.as_mut() {
                        span.head_end = Some(to);
                    }
                }
                self.in_ppr = false;
            }
            b"w:r" => {
                self.flush_run();
                if let Some(run) = self.run.take() {
                    let raw = self.run_rpr.take().unwrap_or_default();
                    self.run_properties.push((run.style, raw));
                }
                self.in_rpr = false;
            }
            b"w:p" => {
                if let Some(mut p) = self.paragraph.take() {
                    if let Some(span) = self.paragraph_span.take() {
                        let markup = SourceMarkup::capture(
                            &p,
                            &p.style,
                            self.slice(span.start, to),
                            self.head(&span),
                        );
                        let run_properties = std::mem::take(&mut self.run_properties);
                        p.markup = Some(markup.with_run_properties(run_properties));
                    }
                    self.finish_paragraph(p);
                }
                self.in_ppr = false;
            }
            b"w:tc" if self.table_depth == 1 => {
                if let (Some(mut cell), Some(span)) = (self.cell.take(), self.cell_span.take()) {
                    let markup = SourceMarkup::capture(
                        &cell,
                        &cell_head(&cell),
                        self.slice(span.start, to),
                        self.head(&span),
                    );
                    cell.markup = Some(markup);
                    if let Some(row) = self.row.as_mut() {
                        row.cells.push(cell);
                    }
                }
            }
            b"w:tr" if self.table_depth == 1 => {
                if let (Some(mut row), Some(span)) = (self.row.take(), self.row_span.take()) {
                    let markup = SourceMarkup::capture(
                        &row,
                        &row.is_header,
                        self.slice(span.start, to),
                        self.head(&span),
                    );
                    row.markup = Some(markup);
                    if let Some(table) = self.table.as_mut() {
                        table.add_row(row);
                    }
                }
            }
            b"w:tbl" if self.table_depth > 0 => {
                self.table_depth -= 1;
                if self.table_depth == 0 {
                    if let (Some(mut table), Some(span)) =
                        (self.table.take(), self.table_span.take())
                    {
                        let markup = SourceMarkup::capture(
                            &table,
                            &table_head(&table),
                            self.slice(span.start, to),
                            self.head(&span),
                        );
                        table.markup = Some(markup);
                        self.doc.push(table);
                    }
                }
            }
            _ => {}
        }
    }

    fn finish_paragraph(&mut self, p: Paragraph) {
        if let Some(cell) = self.cell.as_mut() {
            cell.content.push(p);
            return;
        }
        if self.table_depth > 0 {
            return;
        }
        let page_break_only = p.content.len() == 1
            && matches!(p.content[0], InlineContent::PageBreak)
            && p.style == ParagraphStyle::default();
        if page_break_only {
            self.doc.push(Block::PageBreak);
        } else {
            self.doc.push(p);
        }
    }
}
