//! Error taxonomy for the extraction pipeline.
//!
//! Only conditions that abort a request live in [`ExtractorError`]. A document
//! that fails to parse is *not* an error at this level: it becomes an
//! [`ExtractFailure`] standing in for the affected aspect, and the rest of the
//! pipeline keeps going.

use crate::types::AspectKind;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractorError {
    /// Format tag outside the supported set. No extractor was invoked.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// Transport payload could not be decoded into document bytes.
    #[error("invalid document payload: {0}")]
    InvalidPayload(String),

    /// Two fragments supplied the same aspect. Indicates a wiring bug.
    #[error("Duplicate property name detected: '{0}'")]
    DuplicateAspect(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExtractorError>;

/// Fail-soft replacement for an aspect mapping that could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractFailure {
    pub aspect: AspectKind,
    pub reason: String,
}

impl ExtractFailure {
    pub fn new(aspect: AspectKind, reason: impl Into<String>) -> Self {
        Self {
            aspect,
            reason: reason.into(),
        }
    }

    /// Diagnostic string emitted in place of the mapping.
    pub fn diagnostic(&self) -> String {
        format!("An error occurred: {}", self.reason)
    }
}

impl std::fmt::Display for ExtractFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} extraction failed: {}", self.aspect, self.reason)
    }
}

/// Failure of the OCR capability for a single image.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("unsupported or corrupt image: {0}")]
    UnsupportedImage(String),

    #[error("OCR engine failed: {0}")]
    Engine(String),

    #[error("scratch file error: {0}")]
    Io(#[from] std::io::Error),
}
