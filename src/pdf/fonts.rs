//! TrueType fonts for PDF output.

use crate::error::{Error, Result};
use ab_glyph::{Font, FontVec, GlyphId};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const DEJAVU_DIR: &str = "/usr/share/fonts/truetype/dejavu";

/// Regular and bold font files used for PDF output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSet {
    /// Regular face
    pub regular: PathBuf,
    /// Bold face
    pub bold: PathBuf,
}

impl Default for FontSet {
    fn default() -> Self {
        Self {
            regular: Path::new(DEJAVU_DIR).join("DejaVuSans.ttf"),
            bold: Path::new(DEJAVU_DIR).join("DejaVuSans-Bold.ttf"),
        }
    }
}

impl FontSet {
    /// Both faces from a directory holding `DejaVuSans.ttf` and
    /// `DejaVuSans-Bold.ttf`.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            regular: dir.join("DejaVuSans.ttf"),
            bold: dir.join("DejaVuSans-Bold.ttf"),
        }
    }

    /// Set the regular face and return self.
    pub fn with_regular(mut self, path: impl Into<PathBuf>) -> Self {
        self.regular = path.into();
        self
    }

    /// Set the bold face and return self.
    pub fn with_bold(mut self, path: impl Into<PathBuf>) -> Self {
        self.bold = path.into();
        self
    }

    /// Whether both files exist.
    pub fn is_available(&self) -> bool {
        self.regular.is_file() && self.bold.is_file()
    }
}

/// Which face a run is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum Face {
    Regular,
    Bold,
}

impl Face {
    pub fn for_bold(bold: bool) -> Self {
        if bold {
            Face::Bold
        } else {
            Face::Regular
        }
    }

    /// Resource name in page dictionaries.
    pub fn resource_name(self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
        }
    }
}

/// A parsed font plus the glyphs used so far.
pub(crate) struct LoadedFont {
    font: FontVec,
    data: Vec<u8>,
    name: String,
    units_per_em: f32,
    used: BTreeMap<u16, char>,
}

impl LoadedFont {
    /// Read and parse a TrueType file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| Error::from_open(e, path))?;
        let font = FontVec::try_from_vec(data.clone())
            .map_err(|e| Error::Font(format!("{}: {}", path.display(), e)))?;
        let units_per_em = font.units_per_em().unwrap_or(1000.0);
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Font")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        log::debug!("loaded font {} ({} bytes)", path.display(), data.len());
        Ok(Self {
            font,
            data,
            name,
            units_per_em,
            used: BTreeMap::new(),
        })
    }

    fn glyph(&self, ch: char) -> GlyphId {
        let ch = if ch == '\t' { ' ' } else { ch };
        self.font.glyph_id(ch)
    }

    /// Advance of `ch` in 1/1000 text space units.
    pub fn advance_units(&self, ch: char) -> f32 {
        self.glyph_units(self.glyph(ch))
    }

    fn glyph_units(&self, id: GlyphId) -> f32 {
        self.font.h_advance_unscaled(id) * 1000.0 / self.units_per_em
    }

    /// Width of `text` at `size` points.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().map(|c| self.advance_units(c)).sum::<f32>() * size / 1000.0
    }

    /// Encode as big-endian glyph ids, recording each glyph for the subset
    /// tables.
    pub fn encode(&mut self, text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len() * 2);
        for ch in text.chars() {
            let id = self.glyph(ch);
            self.used.entry(id.0).or_insert(ch);
            out.extend_from_slice(&id.0.to_be_bytes());
        }
        out
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn ascent(&self) -> f32 {
        self.font.ascent_unscaled() * 1000.0 / self.units_per_em
    }

    pub fn descent(&self) -> f32 {
        self.font.descent_unscaled() * 1000.0 / self.units_per_em
    }

    /// `(glyph id, width)` for every used glyph, ordered by id.
    pub fn used_widths(&self) -> Vec<(u16, f32)> {
        self.used
            .keys()
            .map(|&gid| (gid, self.glyph_units(GlyphId(gid))))
            .collect()
    }

    /// `(glyph id, char)` for every used glyph, ordered by id.
    pub fn used_chars(&self) -> impl Iterator<Item = (u16, char)> + '_ {
        self.used.iter().map(|(g, c)| (*g, *c))
    }
}

/// Regular and bold faces loaded together.
pub(crate) struct Fonts {
    pub regular: LoadedFont,
    pub bold: LoadedFont,
}

impl Fonts {
    /// Load both faces; a missing file is [`Error::ResourceMissing`].
    pub fn load(set: &FontSet) -> Result<Self> {
        Ok(Self {
            regular: LoadedFont::load(&set.regular)?,
            bold: LoadedFont::load(&set.bold)?,
        })
    }

    pub fn get(&self, face: Face) -> &LoadedFont {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
        }
    }

    pub fn get_mut(&mut self, face: Face) -> &mut LoadedFont {
        match face {
            Face::Regular => &mut self.regular,
            Face::Bold => &mut self.bold,
        }
    }
}
