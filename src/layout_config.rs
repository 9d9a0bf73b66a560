//! Layout config – the intermediate representation between layout and the
//! output backends. This is the "frozen" page list: every text run, rule
//! and image with its absolute position on its page.
//!
//! Coordinates are in PDF points with the origin at the top-left of the
//! page; text `y` is the baseline.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fonts::FontFamily;

/// A complete document layout ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Document title embedded in the PDF metadata.
    #[serde(default = "LayoutConfig::default_title")]
    pub title: String,
    /// Width of each page in PDF points (1 pt = 1/72 inch).
    pub page_width_pt: f32,
    /// Height of each page in PDF points.
    pub page_height_pt: f32,
    /// Ordered list of pages.
    pub pages: Vec<PageLayout>,
}

/// One finished page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_index: usize,
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum DrawOp {
    Text(TextOp),
    Line(LineOp),
    Image(ImageOp),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOp {
    pub text: String,
    pub x: f32,
    /// Baseline.
    pub y: f32,
    pub family: FontFamily,
    pub size: f32,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl TextOp {
    /// Concrete PDF font name for this run.
    pub fn font_name(&self) -> &'static str {
        self.family.resolve(self.bold, self.italic)
    }
}

/// A straight rule, used for underlines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineOp {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub thickness: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageOp {
    pub src: String,
    /// Top-left corner.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutConfig {
    /// Empty US Letter layout.
    pub fn letter() -> Self {
        Self {
            title: Self::default_title(),
            page_width_pt: 612.0,
            page_height_pt: 792.0,
            pages: Vec::new(),
        }
    }

    fn default_title() -> String {
        "Correspondence".to_string()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Text runs of page `index` in draw order.
    pub fn texts(&self, index: usize) -> impl Iterator<Item = &TextOp> {
        self.pages
            .get(index)
            .into_iter()
            .flat_map(|p| p.ops.iter())
            .filter_map(|op| match op {
                DrawOp::Text(t) => Some(t),
                _ => None,
            })
    }

    /// First page (0-based) holding a text run equal to `text`.
    pub fn find_text(&self, text: &str) -> Option<(usize, &TextOp)> {
        (0..self.pages.len()).find_map(|i| self.texts(i).find(|t| t.text == text).map(|t| (i, t)))
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl PageLayout {
    pub fn new(page_index: usize) -> Self {
        Self {
            page_index,
            ops: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ops_are_tagged_in_json() {
        let mut config = LayoutConfig::letter();
        let mut page = PageLayout::new(0);
        page.ops.push(DrawOp::Text(TextOp {
            text: "1.".into(),
            x: 72.0,
            y: 100.0,
            family: FontFamily::Times,
            size: 12.0,
            bold: false,
            italic: false,
        }));
        config.pages.push(page);
        let json = config.to_json();
        assert!(json.contains(r#""op": "text""#));
        assert!(json.contains(r#""family": "times""#));
        let parsed = LayoutConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.find_text("1.").map(|(i, _)| i), Some(0));
    }

    #[test]
    fn font_name_resolves_variant() {
        let op = TextOp {
            text: "x".into(),
            x: 0.0,
            y: 0.0,
            family: FontFamily::Courier,
            size: 12.0,
            bold: true,
            italic: false,
        };
        assert_eq!(op.font_name(), "Courier-Bold");
    }
}
