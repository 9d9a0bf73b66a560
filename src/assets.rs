//! Embedded assets (the letterhead seal).
//!
//! Assets arrive as base64 `data:` URIs already resident in memory; layout
//! never performs I/O. A seal that cannot be decoded is skipped.

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};

use crate::error::{Error, Result};

/// Parse a `data:<mime>;base64,<data>` URI and return the raw decoded bytes.
pub fn parse_data_uri(src: &str) -> Result<Vec<u8>> {
    let Some(rest) = src.strip_prefix("data:") else {
        let preview: String = src.chars().take(40).collect();
        return Err(Error::Asset(format!(
            "image must be a base64 data URI, got {preview:?}"
        )));
    };
    let comma_pos = rest
        .find(',')
        .ok_or_else(|| Error::Asset("invalid data URI: missing `,` separator".to_string()))?;
    let header = &rest[..comma_pos];
    if !header.contains(";base64") {
        return Err(Error::Asset(
            "only base64-encoded data URIs are supported".to_string(),
        ));
    }
    BASE64_STD
        .decode(rest[comma_pos + 1..].trim())
        .map_err(|e| Error::Asset(format!("base64 decode error: {e}")))
}

/// Pixel dimensions of a decodable image URI.
pub fn image_dimensions(src: &str) -> Result<(u32, u32)> {
    let bytes = parse_data_uri(src)?;
    let img = ::image::load_from_memory(&bytes)
        .map_err(|e| Error::Asset(format!("image decode error: {e}")))?;
    Ok((img.width(), img.height()))
}

/// Probe the seal; on failure log and return `None` so layout carries on.
pub fn probe_seal(src: &str) -> Option<(u32, u32)> {
    match image_dimensions(src) {
        Ok((w, h)) if w > 0 && h > 0 => Some((w, h)),
        Ok(_) => {
            log::warn!("Skipping seal image: zero-sized");
            None
        }
        Err(e) => {
            log::warn!("Skipping seal image: {e}");
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A 2×2 PNG as a data URI.
    pub(crate) fn tiny_png_uri() -> String {
        let img = ::image::RgbImage::from_pixel(2, 2, ::image::Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            ::image::ImageFormat::Png,
        )
        .unwrap();
        format!("data:image/png;base64,{}", BASE64_STD.encode(bytes))
    }

    #[test]
    fn decodes_png_dimensions() {
        assert_eq!(image_dimensions(&tiny_png_uri()).unwrap(), (2, 2));
    }

    #[test]
    fn rejects_non_data_uri() {
        assert!(matches!(parse_data_uri("seal.png"), Err(Error::Asset(_))));
        assert!(parse_data_uri("data:image/png,abc").is_err());
        assert!(parse_data_uri("data:image/png;base64").is_err());
    }

    #[test]
    fn corrupt_seal_is_skipped() {
        assert_eq!(probe_seal("data:image/png;base64,AAAA"), None);
    }
}
