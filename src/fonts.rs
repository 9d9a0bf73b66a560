//! Font resolution and text measurement.
//!
//! Correspondence is set in one of a small closed set of PDF base-14
//! families. We carry the advance-width tables of the builtin faces so that
//! wrapping and the PDF backend agree on every line break without needing
//! font files at runtime.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::markup::RunStyle;

/// Font families offered for correspondence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum FontFamily {
    #[default]
    Times,
    Courier,
}

impl FontFamily {
    /// Map a family identifier from form input. Unknown identifiers fall
    /// back to Times.
    pub fn from_name(name: &str) -> Self {
        let norm = name.trim().trim_matches('"').to_ascii_lowercase();
        match norm.as_str() {
            "courier" | "courier new" | "courier-new" | "courier_new" | "monospace" => {
                FontFamily::Courier
            }
            "times" | "times new roman" | "times-roman" | "times-new-roman" | "serif" => {
                FontFamily::Times
            }
            other => {
                log::warn!("Unknown font family {other:?}, using Times");
                FontFamily::Times
            }
        }
    }

    /// Concrete PDF font name for a style variant.
    pub fn resolve(self, bold: bool, italic: bool) -> &'static str {
        match self {
            FontFamily::Times => match (bold, italic) {
                (true, true) => "Times-BoldItalic",
                (true, false) => "Times-Bold",
                (false, true) => "Times-Italic",
                (false, false) => "Times-Roman",
            },
            FontFamily::Courier => match (bold, italic) {
                (true, true) => "Courier-BoldOblique",
                (true, false) => "Courier-Bold",
                (false, true) => "Courier-Oblique",
                (false, false) => "Courier",
            },
        }
    }
}

impl From<String> for FontFamily {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

/// A family at a given point size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: FontFamily,
    pub size: f32,
}

impl FontSpec {
    pub fn new(family: FontFamily, size: f32) -> Self {
        Self { family, size }
    }

    pub fn with_size(self, size: f32) -> Self {
        Self { size, ..self }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
}

#[derive(Debug, Clone, Copy)]
enum Advances {
    /// Widths for ASCII 0x20..=0x7E in 1/1000 em.
    Table(&'static [u16; 95]),
    Monospace(u16),
}

/// Metrics of one face.
#[derive(Debug, Clone, Copy)]
pub struct FontData {
    advances: Advances,
    pub units_per_em: f32,
    pub ascender: f32,
    pub descender: f32,
}

impl FontData {
    fn advance(&self, ch: char) -> f32 {
        match self.advances {
            Advances::Monospace(w) => w as f32,
            Advances::Table(table) => match ch {
                ' '..='~' => table[ch as usize - 0x20] as f32,
                '\u{00A0}' => table[0] as f32,
                '\u{2018}' | '\u{2019}' => 333.0,
                '\u{201C}' | '\u{201D}' => 444.0,
                '\u{2013}' => 500.0,
                '\u{2014}' | '\u{2026}' => 1000.0,
                // Fallback for glyphs outside the table.
                _ => 500.0,
            },
        }
    }
}

#[rustfmt::skip]
static TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
static TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

#[rustfmt::skip]
static TIMES_ITALIC: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 675, 675, 675, 500,
    920, 611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722,
    611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389, 278, 389, 422, 500,
    333, 500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500,
    500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541,
];

#[rustfmt::skip]
static TIMES_BOLD_ITALIC: [u16; 95] = [
    250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    832, 667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889, 722, 722,
    611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611, 333, 278, 333, 570, 500,
    333, 500, 500, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778, 556, 500,
    500, 500, 389, 389, 278, 556, 444, 667, 500, 444, 389, 348, 220, 348, 570,
];

fn times(bold: bool, italic: bool) -> FontData {
    let table = match (bold, italic) {
        (false, false) => &TIMES_ROMAN,
        (true, false) => &TIMES_BOLD,
        (false, true) => &TIMES_ITALIC,
        (true, true) => &TIMES_BOLD_ITALIC,
    };
    FontData {
        advances: Advances::Table(table),
        units_per_em: 1000.0,
        ascender: 683.0,
        descender: -217.0,
    }
}

fn courier() -> FontData {
    FontData {
        advances: Advances::Monospace(600),
        units_per_em: 1000.0,
        ascender: 629.0,
        descender: -157.0,
    }
}

/// Holds the metrics of every registered face.
pub struct FontManager {
    fonts: HashMap<FontKey, FontData>,
    /// Used when a key is not registered.
    fallback: FontData,
}

impl FontManager {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
            fallback: times(false, false),
        }
    }

    /// Register the builtin faces of every family.
    pub fn ensure_builtin(&mut self) {
        for bold in [false, true] {
            for italic in [false, true] {
                self.fonts.insert(
                    FontKey {
                        family: FontFamily::Times,
                        bold,
                        italic,
                    },
                    times(bold, italic),
                );
                self.fonts.insert(
                    FontKey {
                        family: FontFamily::Courier,
                        bold,
                        italic,
                    },
                    courier(),
                );
            }
        }
    }

    /// Get font data for a key, falling back to the default face.
    pub fn get(&self, key: &FontKey) -> &FontData {
        self.fonts.get(key).unwrap_or_else(|| {
            log::debug!("No metrics for {key:?}, using default face");
            &self.fallback
        })
    }

    fn data_for(&self, family: FontFamily, style: RunStyle) -> &FontData {
        self.get(&FontKey {
            family,
            bold: style.bold,
            italic: style.italic,
        })
    }

    /// Width in points of `text` set in `font` with `style`.
    pub fn measure_text_width(&self, text: &str, font: FontSpec, style: RunStyle) -> f32 {
        let data = self.data_for(font.family, style);
        let scale = font.size / data.units_per_em;
        text.chars().map(|ch| data.advance(ch)).sum::<f32>() * scale
    }

    /// Distance from the top of a line box to the baseline, in points.
    pub fn ascender_pt(&self, font: FontSpec) -> f32 {
        let data = self.data_for(font.family, RunStyle::NORMAL);
        data.ascender * font.size / data.units_per_em
    }

    /// Single-spaced line height for the given font size.
    pub fn line_height_pt(&self, font_size: f32, line_height_factor: f32) -> f32 {
        font_size * line_height_factor
    }
}

impl Default for FontManager {
    fn default() -> Self {
        let mut mgr = Self::new();
        mgr.ensure_builtin();
        mgr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn times_roman_widths() {
        let mgr = FontManager::default();
        let font = FontSpec::new(FontFamily::Times, 12.0);
        // "Hello" = 722 + 444 + 278 + 278 + 500 = 2222 units
        let w = mgr.measure_text_width("Hello", font, RunStyle::NORMAL);
        assert!((w - 26.664).abs() < 0.01, "got {w}");
    }

    #[test]
    fn italic_faces_use_their_own_widths() {
        let mgr = FontManager::default();
        let font = FontSpec::new(FontFamily::Times, 10.0);
        // Times-Italic "Wave" = 833 + 500 + 444 + 444 = 2221 units
        let italic = mgr.measure_text_width("Wave", font, RunStyle::ITALIC);
        assert!((italic - 22.21).abs() < 0.01, "got {italic}");
        let upright = mgr.measure_text_width("Wave", font, RunStyle::NORMAL);
        assert!(italic < upright);
        // Times-BoldItalic "Wave" = 889 + 500 + 444 + 444 = 2277 units
        let style = RunStyle {
            bold: true,
            ..RunStyle::ITALIC
        };
        let bold_italic = mgr.measure_text_width("Wave", font, style);
        assert!((bold_italic - 22.77).abs() < 0.01, "got {bold_italic}");
    }

    #[test]
    fn bold_is_wider() {
        let mgr = FontManager::default();
        let font = FontSpec::new(FontFamily::Times, 12.0);
        let normal = mgr.measure_text_width("Purpose", font, RunStyle::NORMAL);
        let bold = mgr.measure_text_width("Purpose", font, RunStyle::BOLD);
        assert!(bold > normal);
    }

    #[test]
    fn courier_is_monospaced() {
        let mgr = FontManager::default();
        let font = FontSpec::new(FontFamily::Courier, 10.0);
        let w = mgr.measure_text_width("iiii WWWW", font, RunStyle::BOLD);
        assert!((w - 54.0).abs() < 0.01);
    }

    #[test]
    fn underline_does_not_change_width() {
        let mgr = FontManager::default();
        let font = FontSpec::new(FontFamily::Times, 12.0);
        assert_eq!(
            mgr.measure_text_width("abc", font, RunStyle::NORMAL),
            mgr.measure_text_width("abc", font, RunStyle::UNDERLINE)
        );
    }

    #[test]
    fn missing_face_falls_back() {
        let mgr = FontManager::new();
        let font = FontSpec::new(FontFamily::Courier, 12.0);
        // Empty manager measures with default Times metrics.
        let w = mgr.measure_text_width("Hello", font, RunStyle::NORMAL);
        assert!((w - 26.664).abs() < 0.01);
    }

    #[test]
    fn resolution_table() {
        assert_eq!(FontFamily::Times.resolve(true, true), "Times-BoldItalic");
        assert_eq!(FontFamily::Courier.resolve(false, true), "Courier-Oblique");
        assert_eq!(FontFamily::from_name("Courier New"), FontFamily::Courier);
        assert_eq!(FontFamily::from_name("comic sans"), FontFamily::Times);
    }
}
