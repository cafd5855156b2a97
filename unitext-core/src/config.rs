use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::path::Path;

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_tesseract_cmd() -> String {
    "tesseract".to_string()
}

fn default_language() -> String {
    "eng".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// OCR engine settings and when to apply OCR
    #[serde(default)]
    pub ocr: OcrConfig,
    /// PDF-specific extraction switches
    #[serde(default)]
    pub pdf: PdfConfig,
    /// Plain text decoding
    #[serde(default)]
    pub txt: TxtConfig,
    /// Orchestration switches
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Use the Tesseract engine; when false a no-op engine returns empty text
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Tesseract executable (name on PATH or absolute path)
    #[serde(default = "default_tesseract_cmd")]
    pub tesseract_cmd: String,
    /// Tesseract language pack(s), e.g. "eng" or "eng+deu"
    #[serde(default = "default_language")]
    pub language: String,
    /// OCR PDF/DOCX image blobs before simplification so the simplified
    /// output carries their text. Verbose output always keeps the blobs.
    #[serde(default = "default_true")]
    pub recognize_embedded_images: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tesseract_cmd: default_tesseract_cmd(),
            language: default_language(),
            recognize_embedded_images: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Extract the per-page link aspect
    #[serde(default = "default_true")]
    pub include_links: bool,
    /// Wrap Flate-compressed image samples as PNG (otherwise they are skipped)
    #[serde(default = "default_true")]
    pub wrap_flate_images: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            include_links: true,
            wrap_flate_images: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxtConfig {
    /// Replace invalid UTF-8 sequences instead of failing the text aspect
    #[serde(default)]
    pub lossy_utf8: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Log per-step timings and a summary for each request
    #[serde(default)]
    pub profile: bool,
}

impl ExtractionConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: &Path) -> Result<Self, ExtractorError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ExtractorError::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ExtractorError> {
        serde_yaml::from_str(content).map_err(|e| ExtractorError::Config(e.to_string()))
    }

    /// Load config with fallback to defaults
    pub fn load_with_fallback(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                log::warn!("Failed to load config from {}, using defaults: {e}", p.display());
                Self::default()
            }),
            None => Self::default(),
        }
    }
}
