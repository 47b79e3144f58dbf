//! Inspection renderers: plain text, JSON and statistics.

mod json;
mod stats;
mod text;

pub use json::{to_json, JsonFormat};
pub use stats::{total_amounts, DocumentStats};
pub use text::{to_text, TextOptions};
