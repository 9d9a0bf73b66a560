//! # letter-forge – paginated naval correspondence
//!
//! Lays out SECNAV M-5216.5 correspondence (standard letters, memoranda,
//! endorsements) onto US Letter pages and renders the result to PDF. The
//! pipeline stages are:
//!
//! 1. **Load** – JSON → [`DocumentData`] ([`document`]), inline markup →
//!    styled runs ([`markup`])
//! 2. **Measure** – builtin font metrics ([`fonts`])
//! 3. **Wrap** – styled runs → positioned lines ([`wrap`])
//! 4. **Paginate** – cursor, page breaks, running header and footer
//!    ([`pagination`])
//! 5. **Lay out** – headings, numbered paragraphs with keep-together rules,
//!    end block ([`layout`], [`blocks`])
//! 6. **Render** – [`LayoutConfig`] → PDF bytes via printpdf ([`render`])
//!
//! The same layout pass drives the final PDF, the live [`preview`] and the
//! measure-only [`pipeline::estimate_layout`].

pub mod assets;
pub mod blocks;
pub mod document;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod layout_config;
pub mod markup;
pub mod numbering;
pub mod pagination;
pub mod pipeline;
pub mod preview;
pub mod render;
pub mod samples;
pub mod wrap;

// Re-exports for convenience
pub use document::{DocumentData, Paragraph, ParagraphLevel};
pub use error::{Error, Result};
pub use layout_config::LayoutConfig;
pub use pipeline::{compute_layout_config, estimate_layout, generate_pdf, PipelineConfig};
