//! Error types for letter-forge.
//!
//! The layout pass itself never fails; errors only come from loading input,
//! caller-level validation, and the PDF backend.

use std::io;
use thiserror::Error;

/// Result type alias for letter-forge operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading input or writing output files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Document or layout JSON could not be (de)serialised.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required document field is missing or malformed.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// An embedded asset (seal image) could not be decoded.
    #[error("Asset error: {0}")]
    Asset(String),

    /// The PDF backend failed.
    #[error("Rendering error: {0}")]
    Render(String),
}
