// Unitext Core Library
//
// Turns PDF, DOCX, PPTX and plain text documents into per-unit text and image
// aspects, then shapes them into full, simplified or collapsed output.

pub mod config;
pub mod error;
pub mod extractors;
pub mod ocr;
pub mod processor;
pub mod shape;
pub mod simplify;
pub mod types;
pub mod units;

// Re-export main types and functions for easy use
pub use config::ExtractionConfig;
pub use error::{ExtractFailure, ExtractorError, OcrError};
pub use extractors::{ExtractorRegistry, FormatExtractor};
pub use ocr::{NoopOcr, OcrEngine, TesseractOcr};
pub use processor::Pipeline;
pub use types::*;

/// One-shot extraction with default configuration.
pub fn extract_information(
    file_type: &str,
    payload: &str,
    mode: ExtractionMode,
) -> error::Result<ExtractionResult> {
    Pipeline::from_config(ExtractionConfig::default()).extract_information(file_type, payload, mode)
}
