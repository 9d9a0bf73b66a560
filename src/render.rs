//! PDF renderer – takes a [`LayoutConfig`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API) and the builtin base-14 fonts.

use std::collections::HashMap;

use printpdf::*;

use crate::assets::parse_data_uri;
use crate::error::{Error, Result};
use crate::fonts::FontFamily;
use crate::layout_config::{DrawOp, ImageOp, LayoutConfig, LineOp, TextOp};

const PT_TO_MM: f32 = 0.352778;

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// Render a LayoutConfig into PDF bytes.
///
/// Images whose `src` cannot be decoded are skipped with a `log::warn`.
pub fn render_pdf(config: &LayoutConfig) -> Result<Vec<u8>> {
    if config.page_width_pt <= 0.0 || config.page_height_pt <= 0.0 {
        return Err(Error::Render(format!(
            "invalid page size {}x{}pt",
            config.page_width_pt, config.page_height_pt
        )));
    }
    let page_w = Mm(config.page_width_pt * PT_TO_MM);
    let page_h = Mm(config.page_height_pt * PT_TO_MM);

    let mut doc = PdfDocument::new(&config.title);
    let images = register_images(&mut doc, config);

    let mut pages: Vec<PdfPage> = config
        .pages
        .iter()
        .map(|page| {
            let mut ops = Vec::new();
            for op in &page.ops {
                match op {
                    DrawOp::Text(text) => render_text(&mut ops, text, config.page_height_pt),
                    DrawOp::Line(line) => render_line(&mut ops, line, config.page_height_pt),
                    DrawOp::Image(img) => {
                        render_image(&mut ops, img, config.page_height_pt, &images)
                    }
                }
            }
            PdfPage::new(page_w, page_h, ops)
        })
        .collect();

    // Ensure at least one page.
    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    doc.with_pages(pages);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());
    log::debug!(
        "rendered {} page(s), {} bytes",
        config.page_count().max(1),
        bytes.len()
    );
    Ok(bytes)
}

/// Decode every distinct image once and register it as an XObject.
fn register_images(doc: &mut PdfDocument, config: &LayoutConfig) -> HashMap<String, ImageResource> {
    let mut resources = HashMap::new();
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();

    let srcs = config.pages.iter().flat_map(|p| p.ops.iter()).filter_map(|op| match op {
        DrawOp::Image(img) => Some(img.src.as_str()),
        _ => None,
    });
    for src in srcs {
        if resources.contains_key(src) {
            continue;
        }
        let bytes = match parse_data_uri(src) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("Skipping image: {e}");
                continue;
            }
        };
        let (px_width, px_height) = match ::image::load_from_memory(&bytes) {
            Ok(img) => (img.width(), img.height()),
            Err(e) => {
                log::warn!("Skipping image: decode error: {e}");
                continue;
            }
        };
        let raw = match RawImage::decode_from_bytes(&bytes, &mut warnings) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping image: PDF encode error: {e}");
                continue;
            }
        };
        let xobj_id = doc.add_image(&raw);
        resources.insert(
            src.to_string(),
            ImageResource {
                xobj_id,
                px_width,
                px_height,
            },
        );
    }
    resources
}

/// Builtin face for a family and style.
fn builtin_font(family: FontFamily, bold: bool, italic: bool) -> BuiltinFont {
    match (family, bold, italic) {
        (FontFamily::Times, false, false) => BuiltinFont::TimesRoman,
        (FontFamily::Times, true, false) => BuiltinFont::TimesBold,
        (FontFamily::Times, false, true) => BuiltinFont::TimesItalic,
        (FontFamily::Times, true, true) => BuiltinFont::TimesBoldItalic,
        (FontFamily::Courier, false, false) => BuiltinFont::Courier,
        (FontFamily::Courier, true, false) => BuiltinFont::CourierBold,
        (FontFamily::Courier, false, true) => BuiltinFont::CourierOblique,
        (FontFamily::Courier, true, true) => BuiltinFont::CourierBoldOblique,
    }
}

fn black() -> Color {
    Color::Rgb(Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        icc_profile: None,
    })
}

fn render_text(ops: &mut Vec<Op>, text: &TextOp, page_height: f32) {
    if text.text.is_empty() {
        return;
    }
    // PDF origin is bottom-left; layout origin is top-left.
    let font = builtin_font(text.family, text.bold, text.italic);
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: Pt(text.x),
            y: Pt(page_height - text.y),
        },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(text.size),
        font,
    });
    ops.push(Op::SetFillColor { col: black() });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(to_winlatin(&text.text))],
        font,
    });
    ops.push(Op::EndTextSection);
}

fn render_line(ops: &mut Vec<Op>, line: &LineOp, page_height: f32) {
    ops.push(Op::SetOutlineThickness {
        pt: Pt(line.thickness),
    });
    ops.push(Op::SetOutlineColor { col: black() });
    let point = |x: f32, y: f32| LinePoint {
        p: Point {
            x: Pt(x),
            y: Pt(page_height - y),
        },
        bezier: false,
    };
    ops.push(Op::DrawLine {
        line: Line {
            points: vec![point(line.x1, line.y1), point(line.x2, line.y2)],
            is_closed: false,
        },
    });
}

fn render_image(
    ops: &mut Vec<Op>,
    img: &ImageOp,
    page_height: f32,
    images: &HashMap<String, ImageResource>,
) {
    let Some(res) = images.get(&img.src) else {
        return;
    };
    // translate_y is the bottom edge of the image in PDF coordinates.
    let bottom = page_height - img.y - img.height;
    // At dpi=72 printpdf renders 1 px = 1 pt.
    let scale_x = if res.px_width > 0 {
        img.width / res.px_width as f32
    } else {
        1.0
    };
    let scale_y = if res.px_height > 0 {
        img.height / res.px_height as f32
    } else {
        1.0
    };
    ops.push(Op::UseXobject {
        id: res.xobj_id.clone(),
        transform: XObjectTransform {
            translate_x: Some(Pt(img.x)),
            translate_y: Some(Pt(bottom)),
            dpi: Some(72.0),
            scale_x: Some(scale_x),
            scale_y: Some(scale_y),
            rotate: None,
        },
    });
}

/// Map a character to its WinAnsiEncoding byte; unmapped characters
/// become `?`.
fn win_ansi_byte(c: char) -> u8 {
    match c {
        '\u{20AC}' => 0x80, // euro
        '\u{201A}' => 0x82, // single low-9 quote
        '\u{201E}' => 0x84, // double low-9 quote
        '\u{2026}' => 0x85, // ellipsis
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95, // bullet
        '\u{2013}' => 0x96, // en dash
        '\u{2014}' => 0x97, // em dash
        '\u{2122}' => 0x99, // trademark
        '\u{00A0}' => 0x20,
        c if (c as u32) < 256 => c as u8,
        _ => b'?',
    }
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte).
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s.chars().map(win_ansi_byte).collect();
    // SAFETY: intentionally non-UTF-8 for the 0x80-0xFF range; printpdf passes
    // these bytes straight to the PDF stream, decoded by WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_config::PageLayout;

    fn text_op(text: &str, bold: bool) -> TextOp {
        TextOp {
            text: text.into(),
            x: 72.0,
            y: 100.0,
            family: FontFamily::Times,
            size: 12.0,
            bold,
            italic: false,
        }
    }

    #[test]
    fn render_empty_page() {
        let config = LayoutConfig::letter();
        let bytes = render_pdf(&config).unwrap();
        assert!(bytes.len() > 100, "PDF should have content");
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn render_text_lines_and_image() {
        let mut config = LayoutConfig::letter();
        let mut page = PageLayout::new(0);
        page.ops.push(DrawOp::Text(text_op("1.", false)));
        page.ops.push(DrawOp::Text(text_op("Purpose.", true)));
        page.ops.push(DrawOp::Line(LineOp {
            x1: 72.0,
            y1: 101.2,
            x2: 120.0,
            y2: 101.2,
            thickness: 0.5,
        }));
        page.ops.push(DrawOp::Image(ImageOp {
            src: crate::assets::tests::tiny_png_uri(),
            x: 36.0,
            y: 36.0,
            width: 72.0,
            height: 72.0,
        }));
        config.pages.push(page);
        config.pages.push(PageLayout::new(1));
        let bytes = render_pdf(&config).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn broken_image_is_skipped() {
        let mut config = LayoutConfig::letter();
        let mut page = PageLayout::new(0);
        page.ops.push(DrawOp::Image(ImageOp {
            src: "data:image/png;base64,AAAA".into(),
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        }));
        config.pages.push(page);
        assert!(render_pdf(&config).is_ok());
    }

    #[test]
    fn invalid_page_size_is_an_error() {
        let mut config = LayoutConfig::letter();
        config.page_width_pt = 0.0;
        assert!(matches!(render_pdf(&config), Err(Error::Render(_))));
    }

    #[test]
    fn font_table_matches_resolution_names() {
        assert!(matches!(
            builtin_font(FontFamily::Courier, true, true),
            BuiltinFont::CourierBoldOblique
        ));
        assert!(matches!(
            builtin_font(FontFamily::Times, false, false),
            BuiltinFont::TimesRoman
        ));
    }

    #[test]
    fn win_ansi_mapping() {
        assert_eq!(win_ansi_byte('A'), b'A');
        assert_eq!(win_ansi_byte('\u{2019}'), 0x92);
        assert_eq!(win_ansi_byte('é'), 0xE9);
        assert_eq!(win_ansi_byte('\u{4E2D}'), b'?');
    }
}
