//! PDF serialization with lopdf.

use super::fonts::{Face, Fonts, LoadedFont};
use super::layout::{DrawOp, LayoutEngine, PageLayout};
use super::{PdfOptions, PAGE_HEIGHT, PAGE_WIDTH};
use crate::error::Result;
use crate::model::{Color, Document, Metadata};
use chrono::{DateTime, Utc};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Object, ObjectId, Stream, StringFormat};
use std::io::Write;

/// Bfchar entries per block; the CMap format caps a block at 100.
const CMAP_CHUNK: usize = 100;

/// Render a document to PDF bytes.
///
/// Fonts are loaded first, so a missing font file fails before any layout
/// work and nothing is returned.
pub fn render_pdf(doc: &Document, options: &PdfOptions) -> Result<Vec<u8>> {
    let mut fonts = Fonts::load(&options.fonts)?;
    let header = options.header.clone().or_else(|| {
        options
            .header_from_metadata
            .then(|| running_header(&doc.metadata))
            .flatten()
    });
    let pages = LayoutEngine::new(&fonts, PAGE_WIDTH, PAGE_HEIGHT, options.margins)
        .run(doc, header.as_deref());

    let contents = pages
        .iter()
        .map(|page| encode_page(page, &mut fonts))
        .collect::<Result<Vec<_>>>()?;

    let mut pdf = lopdf::Document::with_version("1.5");
    let pages_id = pdf.new_object_id();

    let regular_id = embed_font(&mut pdf, &fonts.regular, options.compress)?;
    let bold_id = embed_font(&mut pdf, &fonts.bold, options.compress)?;
    let resources_id = pdf.add_object(dictionary! {
        "Font" => dictionary! {
            Face::Regular.resource_name() => regular_id,
            Face::Bold.resource_name() => bold_id,
        },
    });

    let mut kids = Vec::with_capacity(contents.len());
    for content in contents {
        let content_id = pdf.add_object(stream(content, options.compress)?);
        let page_id = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(PAGE_WIDTH),
                Object::Real(PAGE_HEIGHT),
            ],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    pdf.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = pdf.add_object(info_dictionary(&doc.metadata));
    pdf.trailer.set("Root", catalog_id);
    pdf.trailer.set("Info", info_id);

    let mut out = Vec::new();
    pdf.save_to(&mut out)?;
    log::debug!("rendered PDF: {} page(s), {} bytes", count, out.len());
    Ok(out)
}

/// Title and subject joined for the running header.
fn running_header(metadata: &Metadata) -> Option<String> {
    match (&metadata.title, &metadata.subject) {
        (Some(t), Some(s)) => Some(format!("{} | {}", t, s)),
        (Some(t), None) => Some(t.clone()),
        (None, Some(s)) => Some(s.clone()),
        (None, None) => None,
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn stream(content: Vec<u8>, compress: bool) -> Result<Stream> {
    if compress {
        let packed = deflate(&content)?;
        Ok(Stream::new(dictionary! { "Filter" => "FlateDecode" }, packed))
    } else {
        Ok(Stream::new(Dictionary::new(), content))
    }
}

fn real(v: f32) -> Object {
    Object::Real((v * 100.0).round() / 100.0)
}

fn color_operands(color: Color) -> Vec<Object> {
    color.to_unit().iter().map(|c| real(*c)).collect()
}

fn encode_page(page: &PageLayout, fonts: &mut Fonts) -> Result<Vec<u8>> {
    let mut ops = Vec::new();
    for op in &page.ops {
        match op {
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
            } => {
                let rect = vec![real(*x), real(*y), real(*width), real(*height)];
                if let Some(fill) = fill {
                    ops.push(Operation::new("rg", color_operands(*fill)));
                    ops.push(Operation::new("re", rect.clone()));
                    ops.push(Operation::new("f", vec![]));
                }
                if let Some(stroke) = stroke {
                    ops.push(Operation::new("RG", color_operands(*stroke)));
                    ops.push(Operation::new("w", vec![real(0.5)]));
                    ops.push(Operation::new("re", rect));
                    ops.push(Operation::new("S", vec![]));
                }
            }
            DrawOp::Line {
                from,
                to,
                color,
                width,
            } => {
                ops.push(Operation::new("RG", color_operands(*color)));
                ops.push(Operation::new("w", vec![real(*width)]));
                ops.push(Operation::new("m", vec![real(from.0), real(from.1)]));
                ops.push(Operation::new("l", vec![real(to.0), real(to.1)]));
                ops.push(Operation::new("S", vec![]));
            }
            DrawOp::Text {
                face,
                size,
                color,
                x,
                y,
                text,
                word_gap,
            } => {
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![Object::from(face.resource_name()), real(*size)],
                ));
                ops.push(Operation::new("rg", color_operands(*color)));
                ops.push(Operation::new(
                    "Tm",
                    vec![
                        Object::Integer(1),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(1),
                        real(*x),
                        real(*y),
                    ],
                ));
                let font = fonts.get_mut(*face);
                if *word_gap > 0.0 {
                    let adjust = -(word_gap * 1000.0 / size);
                    ops.push(Operation::new("TJ", vec![justified(font, text, adjust)]));
                } else {
                    ops.push(Operation::new("Tj", vec![hex(font.encode(text))]));
                }
                ops.push(Operation::new("ET", vec![]));
            }
        }
    }
    Ok(Content { operations: ops }.encode()?)
}

fn hex(bytes: Vec<u8>) -> Object {
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// TJ array that widens every space by `adjust` thousandths of an em.
fn justified(font: &mut LoadedFont, text: &str, adjust: f32) -> Object {
    let mut items = Vec::new();
    let mut segment = String::new();
    for ch in text.chars() {
        segment.push(ch);
        if ch == ' ' {
            items.push(hex(font.encode(&segment)));
            items.push(real(adjust));
            segment.clear();
        }
    }
    if !segment.is_empty() {
        items.push(hex(font.encode(&segment)));
    }
    Object::Array(items)
}

fn embed_font(pdf: &mut lopdf::Document, font: &LoadedFont, compress: bool) -> Result<ObjectId> {
    let base_name = font.name().to_string();
    let data = font.data();

    let file = if compress {
        Stream::new(
            dictionary! {
                "Length1" => data.len() as i64,
                "Filter" => "FlateDecode",
            },
            deflate(data)?,
        )
    } else {
        Stream::new(dictionary! { "Length1" => data.len() as i64 }, data.to_vec())
    };
    let file_id = pdf.add_object(file);

    let ascent = font.ascent().round() as i64;
    let descent = font.descent().round() as i64;
    let descriptor_id = pdf.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => Object::Name(base_name.clone().into_bytes()),
        "Flags" => Object::Integer(32),
        "FontBBox" => vec![
            Object::Integer(-1000),
            Object::Integer(descent),
            Object::Integer(2000),
            Object::Integer(ascent),
        ],
        "ItalicAngle" => Object::Integer(0),
        "Ascent" => Object::Integer(ascent),
        "Descent" => Object::Integer(descent),
        "CapHeight" => Object::Integer(ascent),
        "StemV" => Object::Integer(80),
        "FontFile2" => file_id,
    });

    let cid_id = pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => Object::Name(base_name.clone().into_bytes()),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => Object::Integer(0),
        },
        "FontDescriptor" => descriptor_id,
        "DW" => Object::Integer(1000),
        "W" => width_array(font),
        "CIDToGIDMap" => "Identity",
    });

    let cmap_id = pdf.add_object(stream(to_unicode_cmap(font).into_bytes(), false)?);

    Ok(pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => Object::Name(base_name.into_bytes()),
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(cid_id)],
        "ToUnicode" => cmap_id,
    }))
}

/// `W` entries grouped into runs of consecutive glyph ids.
fn width_array(font: &LoadedFont) -> Object {
    let mut out = Vec::new();
    let mut run_start: Option<u16> = None;
    let mut prev = 0u16;
    let mut widths = Vec::new();
    for (gid, width) in font.used_widths() {
        match run_start {
            Some(_) if gid == prev.wrapping_add(1) => {}
            Some(start) => {
                out.push(Object::Integer(start as i64));
                out.push(Object::Array(std::mem::take(&mut widths)));
                run_start = Some(gid);
            }
            None => run_start = Some(gid),
        }
        widths.push(Object::Integer(width.round() as i64));
        prev = gid;
    }
    if let Some(start) = run_start {
        out.push(Object::Integer(start as i64));
        out.push(Object::Array(widths));
    }
    Object::Array(out)
}

fn to_unicode_cmap(font: &LoadedFont) -> String {
    let entries: Vec<(u16, char)> = font.used_chars().collect();
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );
    for chunk in entries.chunks(CMAP_CHUNK) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, ch) in chunk {
            let mut units = [0u16; 2];
            let utf16: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{:04X}", u))
                .collect();
            cmap.push_str(&format!("<{:04X}> <{}>\n", gid, utf16));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\nend\n",
    );
    cmap
}

fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        Object::string_literal(value)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in value.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

fn pdf_date(date: &DateTime<Utc>) -> Object {
    Object::string_literal(date.format("D:%Y%m%d%H%M%SZ").to_string())
}

fn info_dictionary(metadata: &Metadata) -> Dictionary {
    let mut info = dictionary! {
        "Producer" => Object::string_literal(concat!("offerdoc ", env!("CARGO_PKG_VERSION"))),
    };
    if let Some(title) = &metadata.title {
        info.set("Title", text_string(title));
    }
    if let Some(subject) = &metadata.subject {
        info.set("Subject", text_string(subject));
    }
    if let Some(author) = &metadata.author {
        info.set("Author", text_string(author));
    }
    if let Some(created) = &metadata.created {
        info.set("CreationDate", pdf_date(created));
    }
    info.set("ModDate", pdf_date(&metadata.modified.unwrap_or_else(Utc::now)));
    if let Some(revision) = metadata.revision {
        info.set("Revision", Object::Integer(revision as i64));
    }
    info
}
