//! Source markup carried by blocks read from a word-processor package.

use super::TextStyle;
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// The markup an element was read from.
///
/// Two fingerprints are taken when the element is read: one over its parsed
/// content and one over its own properties. A writer emits `xml` verbatim
/// while the content still matches, and reuses `head` while only the
/// children changed. Properties the model does not understand (list
/// numbering, vertical merges, borders, highlights) survive either way.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMarkup {
    /// The whole element, verbatim
    pub xml: String,

    /// Opening tag and property block, up to the first child element
    pub head: Option<String>,

    /// Raw `<w:rPr>` blocks, keyed by the style they were read as; empty
    /// for runs without properties
    pub run_properties: Vec<(TextStyle, String)>,

    content: Option<u64>,
    properties: Option<u64>,
}

impl SourceMarkup {
    /// Capture markup for `node`, whose own properties are `props`.
    pub fn capture<T, P>(
        node: &T,
        props: &P,
        xml: impl Into<String>,
        head: Option<String>,
    ) -> Self
    where
        T: Serialize + ?Sized,
        P: Serialize + ?Sized,
    {
        Self {
            xml: xml.into(),
            head,
            run_properties: Vec::new(),
            content: fingerprint(node),
            properties: fingerprint(props),
        }
    }

    /// Attach raw run properties, one entry per run.
    ///
    /// A style read from runs with different raw properties is dropped, so
    /// runs regenerated in that style get generated properties instead.
    pub fn with_run_properties(mut self, runs: Vec<(TextStyle, String)>) -> Self {
        let mut kept: Vec<(TextStyle, String)> = Vec::new();
        let mut ambiguous: Vec<TextStyle> = Vec::new();
        for (style, raw) in runs {
            if ambiguous.contains(&style) {
                continue;
            }
            match kept.iter().position(|(s, _)| *s == style) {
                Some(i) if kept[i].1 != raw => {
                    kept.remove(i);
                    ambiguous.push(style);
                }
                Some(_) => {}
                None => kept.push((style, raw)),
            }
        }
        self.run_properties = kept;
        self
    }

    /// The original markup, if `node` is still what was read.
    pub fn unchanged<T: Serialize + ?Sized>(&self, node: &T) -> Option<&str> {
        matches_print(self.content, node).then_some(self.xml.as_str())
    }

    /// The original opening markup, if the element's properties are unchanged.
    pub fn head_for<P: Serialize + ?Sized>(&self, props: &P) -> Option<&str> {
        let head = self.head.as_deref()?;
        matches_print(self.properties, props).then_some(head)
    }

    /// Raw run properties read for `style`.
    pub fn run_properties_for(&self, style: &TextStyle) -> Option<&str> {
        self.run_properties
            .iter()
            .find(|(s, _)| s == style)
            .map(|(_, raw)| raw.as_str())
    }
}

fn matches_print<T: Serialize + ?Sized>(taken: Option<u64>, value: &T) -> bool {
    matches!((taken, fingerprint(value)), (Some(a), Some(b)) if a == b)
}

/// Hash of the serialized form; markup fields are skipped by serde.
fn fingerprint<T: Serialize + ?Sized>(value: &T) -> Option<u64> {
    let bytes = serde_json::to_vec(value).ok()?;
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    Some(hasher.finish())
}
