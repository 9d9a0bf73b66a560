//! Document input model.
//!
//! A [`DocumentData`] is the read-only snapshot the form collects and the
//! layout engine consumes. Every field has a serde default so partially
//! filled drafts load.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fonts::{FontFamily, FontSpec};
use crate::markup::{normalize_sentence_spacing, parse_to_runs, StyledRun};

/// Classification marking printed as a banner at the top and bottom of
/// every page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    #[default]
    None,
    Cui,
    Fouo,
}

impl Classification {
    pub fn banner(self) -> Option<&'static str> {
        match self {
            Classification::None => None,
            Classification::Cui => Some("CUI"),
            Classification::Fouo => Some("FOR OFFICIAL USE ONLY"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    #[default]
    BasicLetter,
    Endorsement,
    Memorandum,
}

/// Paragraph nesting level.
///
/// Unrecognised level tags deserialise to the deepest level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ParagraphLevel {
    #[default]
    Top,
    Sub,
    #[serde(rename = "subsub")]
    SubSub,
    #[serde(rename = "subsubsub")]
    SubSubSub,
}

impl ParagraphLevel {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "top" | "1" | "main" => ParagraphLevel::Top,
            "sub" | "2" => ParagraphLevel::Sub,
            "subsub" | "3" => ParagraphLevel::SubSub,
            "subsubsub" | "4" => ParagraphLevel::SubSubSub,
            other => {
                log::warn!("Unknown paragraph level {other:?}, treating as deepest level");
                ParagraphLevel::SubSubSub
            }
        }
    }

    /// Left indent of the label from the left margin, in points.
    pub fn indent(self) -> f32 {
        match self {
            ParagraphLevel::Top => 0.0,
            ParagraphLevel::Sub => 15.0,
            ParagraphLevel::SubSub => 31.0,
            ParagraphLevel::SubSubSub => 49.0,
        }
    }
}

impl From<String> for ParagraphLevel {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

/// One entry of the flattened paragraph list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paragraph {
    pub level: ParagraphLevel,
    /// Underlined paragraph subject; only honoured on top-level paragraphs.
    pub subject: Option<String>,
    /// Inline markup (`<b>`, `<i>`, `<u>`, newlines).
    pub content: String,
    /// One-letter portion marking, e.g. `U` renders as "(U)".
    pub portion_marking: Option<String>,
}

impl Paragraph {
    pub fn new(level: ParagraphLevel, content: impl Into<String>) -> Self {
        Self {
            level,
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Subject text, if this paragraph may carry one.
    pub fn effective_subject(&self) -> Option<&str> {
        match self.level {
            ParagraphLevel::Top => self
                .subject
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty()),
            _ => None,
        }
    }

    /// Body content as styled runs, after sentence-spacing normalisation.
    pub fn runs(&self) -> Vec<StyledRun> {
        parse_to_runs(&normalize_sentence_spacing(&self.content))
    }

    pub fn is_blank(&self) -> bool {
        self.effective_subject().is_none() && self.content.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Letterhead {
    pub unit_name: String,
    pub address_lines: Vec<String>,
    /// Seal image as a base64 `data:` URI. Must already be in memory.
    pub seal: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Signature {
    pub name: String,
    pub by_direction: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endorsement {
    /// 1 for "FIRST ENDORSEMENT", 2 for "SECOND", …
    pub number: u32,
    /// Identification of the basic letter being endorsed.
    pub on: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSettings {
    pub family: FontFamily,
    pub size: f32,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            family: FontFamily::Times,
            size: 12.0,
        }
    }
}

impl FontSettings {
    /// Clamped body font; sizes outside 8..=14pt fall back to 12pt.
    pub fn spec(&self) -> FontSpec {
        let size = if (8.0..=14.0).contains(&self.size) {
            self.size
        } else {
            12.0
        };
        FontSpec::new(self.family, size)
    }
}

/// Everything needed to lay out one piece of correspondence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentData {
    pub classification: Classification,
    pub kind: DocumentKind,
    pub ssic: String,
    pub office_code: String,
    pub date: String,
    pub letterhead: Option<Letterhead>,
    pub endorsement: Option<Endorsement>,
    pub from: String,
    pub to: String,
    pub via: Vec<String>,
    pub subject: String,
    pub references: Vec<String>,
    pub enclosures: Vec<String>,
    pub paragraphs: Vec<Paragraph>,
    pub signature: Signature,
    pub copy_to: Vec<String>,
    pub font: FontSettings,
    pub portion_marking: bool,
}

impl DocumentData {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Subject as printed (always upper-case).
    pub fn subject_line(&self) -> String {
        self.subject.trim().to_uppercase()
    }

    /// Signature name as printed (always upper-case).
    pub fn signature_name(&self) -> String {
        self.signature.name.trim().to_uppercase()
    }

    /// Caller-level precondition check, run before layout.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.from.trim().is_empty() {
            missing.push("from");
        }
        if self.to.trim().is_empty() {
            missing.push("to");
        }
        if self.subject.trim().is_empty() {
            missing.push("subject");
        }
        if self.paragraphs.iter().all(Paragraph::is_blank) {
            missing.push("paragraphs");
        }
        if self.kind == DocumentKind::Endorsement
            && self.endorsement.as_ref().map_or(true, |e| e.number == 0)
        {
            missing.push("endorsement.number");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidDocument(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}
