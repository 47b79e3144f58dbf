//! Text extraction from PDF files.
//!
//! Produces a flat document: one paragraph per text line, pages separated by
//! [`Block::PageBreak`]. Good enough for verification and inspection; tables
//! and styling are not reconstructed.

use crate::error::{Error, Result};
use crate::model::{Block, Document, Metadata, Paragraph};
use lopdf::content::Content;
use lopdf::{Dictionary, Object};

/// Baselines closer than this are the same line.
const LINE_TOLERANCE: f32 = 2.0;

#[derive(Debug, Clone)]
struct Span {
    x: f32,
    y: f32,
    text: String,
}

/// Extract text and metadata from PDF bytes.
pub fn read_pdf(data: &[u8]) -> Result<Document> {
    let pdf = lopdf::Document::load_mem(data)?;
    if pdf.is_encrypted() {
        return Err(Error::Pdf("encrypted PDF files are not supported".to_string()));
    }

    let mut doc = Document::new();
    doc.metadata = extract_metadata(&pdf);

    let pages = pdf.get_pages();
    for (i, (page_num, page_id)) in pages.iter().enumerate() {
        if i > 0 {
            doc.push(Block::PageBreak);
        }
        let spans = match page_spans(&pdf, *page_id) {
            Ok(spans) => spans,
            Err(e) => {
                log::warn!("skipping text of page {}: {}", page_num, e);
                continue;
            }
        };
        for line in group_lines(spans) {
            doc.push(Paragraph::with_text(line));
        }
    }
    log::debug!("extracted {} block(s) from {} page(s)", doc.blocks.len(), pages.len());
    Ok(doc)
}

fn extract_metadata(pdf: &lopdf::Document) -> Metadata {
    let mut metadata = Metadata::default();
    let info = pdf
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .and_then(|id| pdf.get_dictionary(id));
    if let Ok(info) = info {
        metadata.title = get_string_from_dict(info, b"Title");
        metadata.subject = get_string_from_dict(info, b"Subject");
        metadata.author = get_string_from_dict(info, b"Author");
        metadata.created = get_string_from_dict(info, b"CreationDate")
            .and_then(|s| parse_pdf_date(&s));
        metadata.modified =
            get_string_from_dict(info, b"ModDate").and_then(|s| parse_pdf_date(&s));
        metadata.revision = match info.get(b"Revision") {
            Ok(Object::Integer(n)) => u32::try_from(*n).ok(),
            _ => get_string_from_dict(info, b"Revision").and_then(|s| s.parse().ok()),
        };
    }
    metadata
}

/// Positioned text spans of one page, decoded through each font's encoding.
fn page_spans(pdf: &lopdf::Document, page_id: lopdf::ObjectId) -> Result<Vec<Span>> {
    let data = pdf.get_page_content(page_id)?;
    let content = Content::decode(&data)?;
    let fonts = pdf.get_page_fonts(page_id).unwrap_or_default();

    let mut spans = Vec::new();
    let mut font_name: Vec<u8> = Vec::new();
    let (mut x, mut y) = (0.0f32, 0.0f32);

    let decode = |font_name: &[u8], bytes: &[u8]| -> String {
        fonts
            .get(font_name)
            .and_then(|f| f.get_font_encoding(pdf).ok())
            .and_then(|enc| lopdf::Document::decode_text(&enc, bytes).ok())
            .unwrap_or_else(|| decode_text_simple(bytes))
    };

    for op in &content.operations {
        match op.operator.as_str() {
            "BT" => {
                x = 0.0;
                y = 0.0;
            }
            "Tf" => {
                if let Some(Ok(name)) = op.operands.first().map(Object::as_name) {
                    font_name = name.to_vec();
                }
            }
            "Tm" if op.operands.len() == 6 => {
                x = number(&op.operands[4]).unwrap_or(x);
                y = number(&op.operands[5]).unwrap_or(y);
            }
            "Td" | "TD" if op.operands.len() == 2 => {
                x += number(&op.operands[0]).unwrap_or(0.0);
                y += number(&op.operands[1]).unwrap_or(0.0);
            }
            "Tj" | "'" | "\"" => {
                if let Some(Object::String(bytes, _)) = op.operands.last() {
                    spans.push(Span {
                        x,
                        y,
                        text: decode(&font_name, bytes),
                    });
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    let text = items
                        .iter()
                        .filter_map(|item| match item {
                            Object::String(bytes, _) => Some(decode(&font_name, bytes)),
                            _ => None,
                        })
                        .collect();
                    spans.push(Span { x, y, text });
                }
            }
            _ => {}
        }
    }
    Ok(spans)
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Order spans top to bottom, left to right, and join each line.
fn group_lines(mut spans: Vec<Span>) -> Vec<String> {
    spans.retain(|s| !s.text.trim().is_empty());
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<(f32, Vec<Span>)> = Vec::new();
    for span in spans {
        match lines.last_mut() {
            Some((y, line)) if (*y - span.y).abs() <= LINE_TOLERANCE => line.push(span),
            _ => lines.push((span.y, vec![span])),
        }
    }

    lines
        .into_iter()
        .map(|(_, mut line)| {
            line.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
            let mut text = String::new();
            for span in line {
                let glue = !text.is_empty()
                    && !text.ends_with(char::is_whitespace)
                    && !span.text.starts_with(char::is_whitespace);
                if glue {
                    text.push(' ');
                }
                text.push_str(&span.text);
            }
            text.trim_end().to_string()
        })
        .collect()
}

/// Best-effort decoding for strings without a usable font encoding.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        return decode_utf16be(&bytes[2..]).unwrap_or_default();
    }
    String::from_utf8(bytes.to_vec()).unwrap_or_else(|_| bytes.iter().map(|&b| b as char).collect())
}

fn decode_utf16be(bytes: &[u8]) -> Option<String> {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16(&units).ok()
}

/// Text value of an info dictionary entry.
fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_text_simple(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Parse a PDF date string (`D:YYYYMMDDHHmmSS...`), ignoring the offset.
fn parse_pdf_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let s = s.strip_prefix("D:")?;
    let year: i32 = s.get(0..4)?.parse().ok()?;
    let field = |range: std::ops::Range<usize>, default: u32| {
        s.get(range).and_then(|v| v.parse().ok()).unwrap_or(default)
    };

    chrono::NaiveDate::from_ymd_opt(year, field(4..6, 1), field(6..8, 1))
        .and_then(|date| date.and_hms_opt(field(8..10, 0), field(10..12, 0), field(12..14, 0)))
        .map(|dt| chrono::DateTime::from_naive_utc_and_offset(dt, chrono::Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn span(x: f32, y: f32, text: &str) -> Span {
        Span {
            x,
            y,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_group_lines_orders_and_joins() {
        let lines = group_lines(vec![
            span(300.0, 700.0, "499 000"),
            span(60.0, 700.5, "Switch MES2300-24"),
            span(60.0, 720.0, "2. СПЕЦИФИКАЦИЯ"),
            span(60.0, 680.0, "   "),
        ]);
        assert_eq!(lines, vec!["2. СПЕЦИФИКАЦИЯ", "Switch MES2300-24 499 000"]);
    }

    #[test]
    fn test_group_lines_keeps_existing_spaces() {
        let lines = group_lines(vec![span(60.0, 500.0, "Итого: "), span(90.0, 500.0, "32")]);
        assert_eq!(lines, vec!["Итого: 32"]);
    }

    #[test]
    fn test_parse_pdf_date() {
        let date = parse_pdf_date("D:20240115103045Z").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 1, 15));
        assert_eq!(date.hour(), 10);
        let minimal = parse_pdf_date("D:2024").unwrap();
        assert_eq!((minimal.month(), minimal.day()), (1, 1));
        assert!(parse_pdf_date("2024").is_none());
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x04, 0x2F]), "Я");
        assert_eq!(decode_text_simple(&[0xE9]), "é");
    }

    #[test]
    fn test_read_garbage_is_pdf_error() {
        assert!(matches!(read_pdf(b"%PDF-1.5 garbage"), Err(Error::Pdf(_))));
    }
}
