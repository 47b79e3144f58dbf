//! Fixed style table used by the builder.

use crate::model::{Alignment, Color, Paragraph, ParagraphStyle, TextRun, TextStyle};
use serde::{Deserialize, Serialize};

/// Dark blue used for titles and top-level headings.
pub const DARK_BLUE: Color = Color(0, 51, 102);
/// Dark grey used for sub-headings.
pub const DARK_GREY: Color = Color(51, 51, 51);

/// Font size, color and spacing of one kind of block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockStyle {
    /// Font size in points
    pub font_size: f32,

    /// Bold text
    #[serde(default)]
    pub bold: bool,

    /// Text color
    #[serde(default)]
    pub color: Option<Color>,

    /// Paragraph alignment
    #[serde(default)]
    pub alignment: Alignment,

    /// Space before in points
    #[serde(default)]
    pub space_before: f32,

    /// Space after in points
    #[serde(default)]
    pub space_after: f32,
}

impl BlockStyle {
    fn new(font_size: f32) -> Self {
        Self {
            font_size,
            bold: false,
            color: None,
            alignment: Alignment::Left,
            space_before: 0.0,
            space_after: 0.0,
        }
    }

    fn bold(mut self, color: Color) -> Self {
        self.bold = true;
        self.color = Some(color);
        self
    }

    fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    fn spacing(mut self, before: f32, after: f32) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }

    /// Text style for runs in this block.
    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            bold: self.bold,
            font_size: Some(self.font_size),
            color: self.color,
            ..Default::default()
        }
    }

    /// Paragraph style for this block.
    pub fn paragraph_style(&self) -> ParagraphStyle {
        ParagraphStyle {
            alignment: self.alignment,
            space_before: (self.space_before > 0.0).then_some(self.space_before),
            space_after: (self.space_after > 0.0).then_some(self.space_after),
            ..Default::default()
        }
    }

    /// A paragraph with a single run in this style.
    pub fn paragraph(&self, text: impl Into<String>) -> Paragraph {
        let mut p = Paragraph::new();
        p.style = self.paragraph_style();
        p.add_run(TextRun::styled(text, self.text_style()));
        p
    }
}

/// Table colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStyle {
    /// Header row background
    pub header_fill: Option<Color>,

    /// Header text color
    pub header_text: Option<Color>,

    /// Background of every second body row
    pub stripe_fill: Option<Color>,

    /// Named table style written to DOCX
    pub style_id: Option<String>,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_fill: Some(Color(0xE0, 0xE0, 0xE0)),
            header_text: None,
            stripe_fill: None,
            style_id: Some("TableGrid".to_string()),
        }
    }
}

/// Bullet layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletStyle {
    /// Glyph drawn before the text
    pub glyph: String,

    /// Left indent in points
    pub left_indent: f32,

    /// First line indent in points (negative = hanging)
    pub first_line_indent: f32,

    /// Font size of bullet text
    pub font_size: f32,
}

impl Default for BulletStyle {
    fn default() -> Self {
        Self {
            glyph: "• ".to_string(),
            left_indent: 18.0,
            first_line_indent: -18.0,
            font_size: 11.0,
        }
    }
}

/// Style table: heading level → font size, color and spacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSheet {
    /// Document title
    pub title: BlockStyle,

    /// Subtitle under the title
    pub subtitle: BlockStyle,

    /// Headings by level, index 0 = level 1; the last entry covers deeper levels
    pub headings: Vec<BlockStyle>,

    /// Body paragraphs
    pub body: BlockStyle,

    /// Bulleted items
    pub bullet: BulletStyle,

    /// Item tables
    pub table: TableStyle,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            title: BlockStyle::new(24.0)
                .bold(DARK_BLUE)
                .aligned(Alignment::Center)
                .spacing(0.0, 24.0),
            subtitle: BlockStyle::new(18.0).aligned(Alignment::Center),
            headings: vec![
                BlockStyle::new(16.0).bold(DARK_BLUE).spacing(18.0, 12.0),
                BlockStyle::new(14.0).bold(DARK_GREY).spacing(12.0, 6.0),
                BlockStyle::new(12.0).bold(DARK_GREY).spacing(10.0, 4.0),
            ],
            body: BlockStyle::new(11.0)
                .aligned(Alignment::Justify)
                .spacing(0.0, 8.0),
            bullet: BulletStyle::default(),
            table: TableStyle::default(),
        }
    }
}

impl StyleSheet {
    /// Style for a heading level (1-based).
    pub fn heading(&self, level: u8) -> BlockStyle {
        let idx = (level.max(1) as usize - 1).min(self.headings.len().saturating_sub(1));
        self.headings
            .get(idx)
            .cloned()
            .unwrap_or_else(|| BlockStyle::new(12.0).bold(DARK_GREY))
    }

    /// Load a style sheet from TOML; missing entries keep their defaults.
    pub fn from_toml(s: &str) -> crate::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels() {
        let styles = StyleSheet::default();
        assert_eq!(styles.heading(1).font_size, 16.0);
        assert_eq!(styles.heading(1).color, Some(DARK_BLUE));
        assert_eq!(styles.heading(2).font_size, 14.0);
        assert_eq!(styles.heading(5).font_size, 12.0);
        assert_eq!(styles.heading(0).font_size, 16.0);
    }

    #[test]
    fn test_title_paragraph() {
        let p = StyleSheet::default().title.paragraph("КОММЕРЧЕСКОЕ ПРЕДЛОЖЕНИЕ");
        assert_eq!(p.style.alignment, Alignment::Center);
        assert_eq!(p.style.space_after, Some(24.0));
        let style = p.uniform_run_style().unwrap();
        assert!(style.bold);
        assert_eq!(style.font_size, Some(24.0));
    }

    #[test]
    fn test_partial_override_from_toml() {
        let styles = StyleSheet::from_toml(
            r#"
            [bullet]
            glyph = "– "
            left_indent = 24.0
            first_line_indent = -24.0
            font_size = 10.0
            "#,
        )
        .unwrap();
        assert_eq!(styles.bullet.glyph, "– ");
        assert_eq!(styles.title.font_size, 24.0);
    }
}
