//! Page layout: turns blocks into positioned drawing operations.
//!
//! Coordinates are PDF user space (points, origin bottom-left).

use super::fonts::{Face, Fonts};
use super::Margins;
use crate::model::{
    Alignment, Block, Color, Document, InlineContent, Paragraph, Table, TableRow, TextStyle,
};

const BODY_SIZE: f32 = 11.0;
const TABLE_SIZE: f32 = 10.0;
const HEADER_SIZE: f32 = 8.0;
const LINE_SPACING: f32 = 1.25;
const CELL_PADDING: f32 = 4.0;
const BORDER: Color = Color(128, 128, 128);
const HEADER_COLOR: Color = Color(110, 110, 110);

/// One positioned drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawOp {
    /// A text span on one baseline. `word_gap` is extra space added after
    /// every space character (justification).
    Text {
        face: Face,
        size: f32,
        color: Color,
        x: f32,
        y: f32,
        text: String,
        word_gap: f32,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Color>,
        stroke: Option<Color>,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        color: Color,
        width: f32,
    },
}

/// Drawing operations of one page.
#[derive(Debug, Clone, Default)]
pub(crate) struct PageLayout {
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PieceKind {
    Word,
    Space,
}

#[derive(Debug, Clone)]
struct Piece {
    text: String,
    face: Face,
    size: f32,
    color: Color,
    underline: bool,
    width: f32,
    kind: PieceKind,
}

impl Piece {
    fn same_style(&self, other: &Piece) -> bool {
        self.face == other.face
            && self.size == other.size
            && self.color == other.color
            && self.underline == other.underline
    }
}

enum Token {
    Piece(Piece),
    Newline,
}

#[derive(Debug, Default)]
struct Line {
    pieces: Vec<Piece>,
    width: f32,
    size: f32,
    indent: f32,
    available: f32,
    last: bool,
}

impl Line {
    fn new(indent: f32, available: f32) -> Self {
        Self {
            indent,
            available,
            ..Default::default()
        }
    }

    fn has_words(&self) -> bool {
        self.pieces.iter().any(|p| p.kind == PieceKind::Word)
    }

    fn push(&mut self, piece: Piece) {
        self.width += piece.width;
        self.size = self.size.max(piece.size);
        self.pieces.push(piece);
    }

    fn trim_end(&mut self) {
        while matches!(self.pieces.last(), Some(p) if p.kind == PieceKind::Space) {
            if let Some(p) = self.pieces.pop() {
                self.width -= p.width;
            }
        }
    }

    fn spaces(&self) -> usize {
        self.pieces
            .iter()
            .filter(|p| p.kind == PieceKind::Space)
            .map(|p| p.text.chars().count())
            .sum()
    }

    fn height(&self, fallback: f32) -> f32 {
        let size = if self.size > 0.0 { self.size } else { fallback };
        size * LINE_SPACING
    }
}

/// Defaults for runs without explicit formatting.
#[derive(Debug, Clone, Copy)]
struct RunDefaults {
    size: f32,
    bold: bool,
}

/// Lays out a whole document.
pub(crate) struct LayoutEngine<'a> {
    fonts: &'a Fonts,
    page_width: f32,
    page_height: f32,
    margins: Margins,
    ascent: f32,
    pages: Vec<PageLayout>,
    cursor: f32,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(fonts: &'a Fonts, page_width: f32, page_height: f32, margins: Margins) -> Self {
        let ascent = (fonts.regular.ascent() / 1000.0).clamp(0.5, 1.2);
        Self {
            fonts,
            page_width,
            page_height,
            margins,
            ascent,
            pages: vec![PageLayout::default()],
            cursor: page_height - margins.top,
        }
    }

    fn content_left(&self) -> f32 {
        self.margins.left
    }

    fn content_width(&self) -> f32 {
        self.page_width - self.margins.left - self.margins.right
    }

    fn top(&self) -> f32 {
        self.page_height - self.margins.top
    }

    fn at_page_top(&self) -> bool {
        (self.cursor - self.top()).abs() < f32::EPSILON
    }

    fn page_number(&self) -> usize {
        self.pages.len()
    }

    fn ops(&mut self) -> &mut Vec<DrawOp> {
        // pages is never empty
        let last = self.pages.len() - 1;
        &mut self.pages[last].ops
    }

    fn new_page(&mut self) {
        self.pages.push(PageLayout::default());
        self.cursor = self.top();
    }

    /// Start a new page unless the current one is still blank.
    fn page_break(&mut self) {
        if !self.at_page_top() || !self.ops().is_empty() {
            self.new_page();
        }
    }

    fn ensure_room(&mut self, height: f32) {
        if self.cursor - height < self.margins.bottom && !self.at_page_top() {
            self.new_page();
        }
    }

    /// Lay out every block, then draw the running header and footer.
    pub fn run(mut self, doc: &Document, header: Option<&str>) -> Vec<PageLayout> {
        for block in &doc.blocks {
            match block {
                Block::Paragraph(p) if p.is_page_break() => self.page_break(),
                Block::Paragraph(p) => self.paragraph(p),
                Block::Table(t) => self.table(t),
                Block::PageBreak => self.page_break(),
            }
        }

        let total = self.pages.len();
        for index in 0..total {
            if let Some(text) = header {
                self.draw_header(index, text);
            }
            if let Some(footer) = &doc.footer {
                self.draw_footer(index, footer);
            }
        }
        log::debug!("laid out {} page(s)", total);
        self.pages
    }

    fn paragraph(&mut self, p: &Paragraph) {
        let defaults = paragraph_defaults(p);
        let style = &p.style;
        let before = style.space_before.unwrap_or(match p.heading_level() {
            Some(1) => 18.0,
            Some(_) => 10.0,
            None => 0.0,
        });
        let after = style.space_after.unwrap_or(match p.heading_level() {
            Some(_) => 6.0,
            None => 4.0,
        });

        if !self.at_page_top() {
            self.cursor -= before;
        }

        let x = self.content_left();
        let width = self.content_width();
        for chunk in split_at_page_breaks(&p.content) {
            let Some(content) = chunk else {
                self.page_break();
                continue;
            };
            let lines = self.wrap(content, p, defaults, width, self.page_number());
            let fallback = defaults.size;
            for line in lines {
                let height = line.height(fallback);
                self.ensure_room(height);
                let top = self.cursor;
                let ops = self.line_ops(&line, p.style.alignment, x, top, fallback);
                self.ops().extend(ops);
                self.cursor -= height;
            }
        }
        self.cursor -= after;
    }

    fn table(&mut self, table: &Table) {
        let grid = table.column_count();
        if grid == 0 {
            return;
        }
        let widths = column_widths(table, grid, self.content_width());
        let header_rows = table.header_rows();

        self.cursor -= 4.0;
        for (i, row) in table.rows.iter().enumerate() {
            let height = self.row_height(row, &widths);
            if self.cursor - height < self.margins.bottom && !self.at_page_top() {
                self.new_page();
                if i >= header_rows {
                    for header in table.header() {
                        let h = self.row_height(header, &widths);
                        self.draw_row(header, &widths, h);
                    }
                }
            }
            self.draw_row(row, &widths, height);
        }
        self.cursor -= 8.0;
    }

    fn cell_slots<'r>(
        &self,
        row: &'r TableRow,
        widths: &[f32],
    ) -> Vec<(&'r crate::model::TableCell, f32, f32)> {
        let mut slots = Vec::new();
        let mut col = 0usize;
        let mut x = self.content_left();
        for cell in &row.cells {
            let span = (cell.colspan.max(1) as usize).min(widths.len().saturating_sub(col));
            if span == 0 {
                break;
            }
            let width: f32 = widths[col..col + span].iter().sum();
            slots.push((cell, x, width));
            x += width;
            col += span;
        }
        slots
    }

    fn cell_lines(&self, cell: &crate::model::TableCell, width: f32) -> Vec<(Line, Alignment)> {
        let inner = (width - 2.0 * CELL_PADDING).max(1.0);
        let mut lines = Vec::new();
        for p in &cell.content {
            let mut defaults = paragraph_defaults(p);
            if p.heading_level().is_none() {
                defaults.size = TABLE_SIZE;
            }
            for line in self.wrap(&p.content, p, defaults, inner, self.page_number()) {
                lines.push((line, p.style.alignment));
            }
        }
        lines
    }

    fn row_height(&self, row: &TableRow, widths: &[f32]) -> f32 {
        self.cell_slots(row, widths)
            .into_iter()
            .map(|(cell, _, width)| {
                let content: f32 = self
                    .cell_lines(cell, width)
                    .iter()
                    .map(|(l, _)| l.height(TABLE_SIZE))
                    .sum();
                content.max(TABLE_SIZE * LINE_SPACING)
            })
            .fold(0.0, f32::max)
            + 2.0 * CELL_PADDING
    }

    fn draw_row(&mut self, row: &TableRow, widths: &[f32], height: f32) {
        let top = self.cursor;
        let bottom = top - height;
        for (cell, x, width) in self.cell_slots(row, widths) {
            let mut ops = vec![DrawOp::Rect {
                x,
                y: bottom,
                width,
                height,
                fill: cell.shading,
                stroke: Some(BORDER),
            }];
            let mut line_top = top - CELL_PADDING;
            for (line, alignment) in self.cell_lines(cell, width) {
                let inner_x = x + CELL_PADDING;
                ops.extend(self.line_ops(&line, alignment, inner_x, line_top, TABLE_SIZE));
                line_top -= line.height(TABLE_SIZE);
            }
            self.ops().extend(ops);
        }
        self.cursor = bottom;
    }

    fn draw_header(&mut self, index: usize, text: &str) {
        let y = self.page_height - self.margins.top * 0.5;
        let x = self.content_left();
        let right = self.page_width - self.margins.right;
        let page = &mut self.pages[index];
        page.ops.push(DrawOp::Text {
            face: Face::Regular,
            size: HEADER_SIZE,
            color: HEADER_COLOR,
            x,
            y,
            text: text.to_string(),
            word_gap: 0.0,
        });
        page.ops.push(DrawOp::Line {
            from: (x, y - 4.0),
            to: (right, y - 4.0),
            color: BORDER,
            width: 0.5,
        });
    }

    fn draw_footer(&mut self, index: usize, footer: &Paragraph) {
        let mut defaults = paragraph_defaults(footer);
        defaults.size = 9.0;
        let x = self.content_left();
        let width = self.content_width();
        let top = self.margins.bottom * 0.6;
        let mut ops = Vec::new();
        let mut line_top = top;
        for line in self.wrap(&footer.content, footer, defaults, width, index + 1) {
            ops.extend(self.line_ops(&line, footer.style.alignment, x, line_top, 9.0));
            line_top -= line.height(9.0);
        }
        self.pages[index].ops.extend(ops);
    }

    /// Break inline content into lines no wider than `width`.
    fn wrap(
        &self,
        content: &[InlineContent],
        p: &Paragraph,
        defaults: RunDefaults,
        width: f32,
        page_number: usize,
    ) -> Vec<Line> {
        let left = p.style.left_indent.unwrap_or(0.0).max(0.0);
        let first = p.style.first_line_indent.unwrap_or(0.0);
        let first_indent = (left + first).max(0.0);

        let mut lines = Vec::new();
        let mut line = Line::new(first_indent, width - first_indent);

        for token in self.tokens(content, defaults, page_number) {
            let piece = match token {
                Token::Newline => {
                    line.trim_end();
                    line.last = true;
                    lines.push(std::mem::replace(&mut line, Line::new(left, width - left)));
                    continue;
                }
                Token::Piece(piece) => piece,
            };

            if piece.kind == PieceKind::Space {
                if line.has_words() {
                    line.push(piece);
                }
                continue;
            }

            if line.width + piece.width > line.available && line.has_words() {
                line.trim_end();
                lines.push(std::mem::replace(&mut line, Line::new(left, width - left)));
            }

            if piece.width > line.available {
                for part in self.split_word(piece, line.available) {
                    if line.has_words() {
                        lines.push(std::mem::replace(&mut line, Line::new(left, width - left)));
                    }
                    line.push(part);
                }
            } else {
                line.push(piece);
            }
        }

        line.trim_end();
        line.last = true;
        if line.size == 0.0 {
            line.size = defaults.size;
        }
        lines.push(line);
        lines
    }

    fn split_word(&self, piece: Piece, available: f32) -> Vec<Piece> {
        let font = self.fonts.get(piece.face);
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut width = 0.0;
        for ch in piece.text.chars() {
            let w = font.advance_units(ch) * piece.size / 1000.0;
            if width + w > available && !current.is_empty() {
                parts.push(Piece {
                    text: std::mem::take(&mut current),
                    width,
                    ..piece.clone()
                });
                width = 0.0;
            }
            current.push(ch);
            width += w;
        }
        if !current.is_empty() {
            parts.push(Piece {
                text: current,
                width,
                ..piece
            });
        }
        parts
    }

    fn tokens(&self, content: &[InlineContent], defaults: RunDefaults, page: usize) -> Vec<Token> {
        let mut tokens = Vec::new();
        for item in content {
            match item {
                InlineContent::Text(run) => {
                    let mut segments = run.text.split('\n').peekable();
                    while let Some(segment) = segments.next() {
                        self.push_words(&mut tokens, segment, &run.style, defaults);
                        if segments.peek().is_some() {
                            tokens.push(Token::Newline);
                        }
                    }
                }
                InlineContent::PageNumber => {
                    let number = page.to_string();
                    self.push_words(&mut tokens, &number, &TextStyle::default(), defaults);
                }
                InlineContent::PageBreak => {}
            }
        }
        tokens
    }

    fn push_words(
        &self,
        tokens: &mut Vec<Token>,
        text: &str,
        style: &TextStyle,
        defaults: RunDefaults,
    ) {
        let face = Face::for_bold(style.bold || defaults.bold);
        let size = style.font_size.unwrap_or(defaults.size);
        let color = style.color.unwrap_or(Color::BLACK);
        let font = self.fonts.get(face);

        let mut current = String::new();
        let mut current_space = false;
        let flush = |current: &mut String, space: bool, tokens: &mut Vec<Token>| {
            if current.is_empty() {
                return;
            }
            let text = std::mem::take(current);
            tokens.push(Token::Piece(Piece {
                width: font.text_width(&text, size),
                text,
                face,
                size,
                color,
                underline: style.underline,
                kind: if space {
                    PieceKind::Space
                } else {
                    PieceKind::Word
                },
            }));
        };

        for ch in text.chars() {
            let is_space = ch == ' ' || ch == '\t';
            if is_space != current_space {
                flush(&mut current, current_space, tokens);
                current_space = is_space;
            }
            current.push(if ch == '\t' { ' ' } else { ch });
        }
        flush(&mut current, current_space, tokens);
    }

    /// Drawing operations for one line whose box starts at `x` with its top
    /// edge at `top`.
    fn line_ops(
        &self,
        line: &Line,
        alignment: Alignment,
        x: f32,
        top: f32,
        fallback: f32,
    ) -> Vec<DrawOp> {
        let size = if line.size > 0.0 { line.size } else { fallback };
        let baseline = top - size * self.ascent;
        let slack = (line.available - line.width).max(0.0);

        let (offset, gap) = match alignment {
            Alignment::Left => (0.0, 0.0),
            Alignment::Center => (slack / 2.0, 0.0),
            Alignment::Right => (slack, 0.0),
            Alignment::Justify => {
                let spaces = line.spaces();
                if line.last || spaces == 0 {
                    (0.0, 0.0)
                } else {
                    (0.0, slack / spaces as f32)
                }
            }
        };

        let mut ops = Vec::new();
        let mut pen = x + line.indent + offset;
        let mut pieces = line.pieces.iter().peekable();
        while let Some(first) = pieces.next() {
            let mut text = first.text.clone();
            let mut width = first.width;
            let mut spaces = if first.kind == PieceKind::Space {
                first.text.chars().count()
            } else {
                0
            };
            while let Some(next) = pieces.peek() {
                if !next.same_style(first) {
                    break;
                }
                text.push_str(&next.text);
                width += next.width;
                if next.kind == PieceKind::Space {
                    spaces += next.text.chars().count();
                }
                pieces.next();
            }
            let span = width + gap * spaces as f32;
            ops.push(DrawOp::Text {
                face: first.face,
                size: first.size,
                color: first.color,
                x: pen,
                y: baseline,
                text,
                word_gap: gap,
            });
            if first.underline {
                let y = baseline - first.size * 0.12;
                ops.push(DrawOp::Line {
                    from: (pen, y),
                    to: (pen + span, y),
                    color: first.color,
                    width: (first.size * 0.05).max(0.4),
                });
            }
            pen += span;
        }
        ops
    }
}

fn paragraph_defaults(p: &Paragraph) -> RunDefaults {
    match p.heading_level() {
        Some(1) => RunDefaults {
            size: 16.0,
            bold: true,
        },
        Some(2) => RunDefaults {
            size: 14.0,
            bold: true,
        },
        Some(_) => RunDefaults {
            size: 12.0,
            bold: true,
        },
        None => RunDefaults {
            size: BODY_SIZE,
            bold: false,
        },
    }
}

/// Inline content split at hard page breaks; `None` marks a break.
fn split_at_page_breaks(content: &[InlineContent]) -> Vec<Option<&[InlineContent]>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    for (i, item) in content.iter().enumerate() {
        if matches!(item, InlineContent::PageBreak) {
            if i > start {
                chunks.push(Some(&content[start..i]));
            }
            chunks.push(None);
            start = i + 1;
        }
    }
    if start < content.len() || chunks.is_empty() {
        chunks.push(Some(&content[start..]));
    }
    chunks
}

/// Absolute column widths for `grid` columns spread over `total` points.
fn column_widths(table: &Table, grid: usize, total: f32) -> Vec<f32> {
    let relative: Vec<f32> = match &table.column_widths {
        Some(w) if w.len() == grid && w.iter().all(|v| *v > 0.0) => w.clone(),
        _ => vec![1.0; grid],
    };
    let sum: f32 = relative.iter().sum();
    relative.iter().map(|w| w / sum * total).collect()
}
