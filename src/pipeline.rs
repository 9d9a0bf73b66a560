//! Pipeline – ties together validation, layout and rendering into a single
//! function call.

use serde::{Deserialize, Serialize};

use crate::document::DocumentData;
use crate::error::Result;
use crate::fonts::FontManager;
use crate::layout::{layout_document, LayoutMode};
use crate::layout_config::LayoutConfig;
use crate::pagination::{PaginationRules, PAGE_HEIGHT_PT, PAGE_WIDTH_PT};
use crate::render::render_pdf;

/// Configuration for the PDF generation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Document title embedded in the PDF metadata (default: "Correspondence").
    pub title: String,
    /// Keep-together thresholds.
    pub rules: PaginationRules,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            title: "Correspondence".to_string(),
            rules: PaginationRules::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Outcome of a measure-only pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutEstimate {
    pub page_count: usize,
    /// Cursor position on the last page once everything is placed.
    pub final_y: f32,
}

/// Full pipeline: document → PDF bytes.
///
/// Returns `(pdf_bytes, layout_config)`. The document is validated first;
/// layout itself never fails.
pub fn generate_pdf(doc: &DocumentData, config: &PipelineConfig) -> Result<(Vec<u8>, LayoutConfig)> {
    doc.validate()?;
    let layout_config = compute_layout_config(doc, config);
    let pdf_bytes = render_pdf(&layout_config)?;
    Ok((pdf_bytes, layout_config))
}

/// Convenience: JSON document → PDF bytes with the default config.
pub fn generate_pdf_from_json(json: &str) -> Result<Vec<u8>> {
    let doc = DocumentData::from_json(json)?;
    let (bytes, _) = generate_pdf(&doc, &PipelineConfig::default())?;
    Ok(bytes)
}

/// Generate only the layout config (no PDF rendering).
pub fn compute_layout_config(doc: &DocumentData, config: &PipelineConfig) -> LayoutConfig {
    let fonts = FontManager::default();
    let layout = layout_document(doc, &fonts, &config.rules, LayoutMode::Draw);
    LayoutConfig {
        title: config.title.clone(),
        page_width_pt: PAGE_WIDTH_PT,
        page_height_pt: PAGE_HEIGHT_PT,
        pages: layout.pages,
    }
}

/// Page count and final cursor position without keeping any drawn output.
pub fn estimate_layout(doc: &DocumentData, config: &PipelineConfig) -> LayoutEstimate {
    let fonts = FontManager::default();
    let layout = layout_document(doc, &fonts, &config.rules, LayoutMode::MeasureOnly);
    LayoutEstimate {
        page_count: layout.page_count(),
        final_y: layout.final_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::samples;

    #[test]
    fn pipeline_basic() {
        let doc = samples::basic_letter();
        let (bytes, config) = generate_pdf(&doc, &PipelineConfig::default()).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(config.page_count(), 1);
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn invalid_document_is_rejected_before_layout() {
        let doc = DocumentData::default();
        let err = generate_pdf(&doc, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidDocument(_)));
        // Layout alone still works on an incomplete draft.
        assert_eq!(compute_layout_config(&doc, &PipelineConfig::default()).page_count(), 1);
    }

    #[test]
    fn estimate_matches_drawn_page_count() {
        let doc = samples::long_letter();
        let config = PipelineConfig::default();
        let drawn = compute_layout_config(&doc, &config);
        let estimate = estimate_layout(&doc, &config);
        assert!(estimate.page_count > 1);
        assert_eq!(estimate.page_count, drawn.page_count());
    }

    #[test]
    fn title_is_carried_into_layout() {
        let doc = samples::memorandum();
        let config = PipelineConfig::with_title("Memo");
        assert_eq!(compute_layout_config(&doc, &config).title, "Memo");
    }

    #[test]
    fn json_input() {
        let json = samples::basic_letter().to_json().unwrap();
        let bytes = generate_pdf_from_json(&json).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
        assert!(matches!(generate_pdf_from_json("{"), Err(Error::Json(_))));
    }
}
