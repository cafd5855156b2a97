//! OCR adapter.
//!
//! Recognition itself is an external capability behind [`OcrEngine`]. The
//! pipeline only decides *when* to call it and turns failures into inline
//! diagnostic strings, so one unreadable image never aborts a document.

use crate::config::OcrConfig;
use crate::error::OcrError;
use log::{debug, warn};
use std::io::Write;
use std::process::Command;

/// Converts one image blob into recognized text.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;

    /// Engine identifier for logging
    fn name(&self) -> &str;
}

/// Best-effort recognition: a failure becomes a diagnostic string for this
/// image only.
pub fn recognize_or_diagnostic(engine: &dyn OcrEngine, image: &[u8]) -> String {
    match engine.recognize(image) {
        Ok(text) => text,
        Err(e) => {
            warn!("{} could not read image ({} bytes): {e}", engine.name(), image.len());
            format!("An error occurred while performing OCR: {e}")
        }
    }
}

/// Build the engine described by the config.
pub fn engine_from_config(config: &OcrConfig) -> Box<dyn OcrEngine> {
    if config.enabled {
        Box::new(TesseractOcr::new(&config.tesseract_cmd, &config.language))
    } else {
        Box::new(NoopOcr)
    }
}

/// Runs the `tesseract` command line tool against a scratch copy of the image.
pub struct TesseractOcr {
    command: String,
    language: String,
}

impl TesseractOcr {
    pub fn new(command: &str, language: &str) -> Self {
        Self {
            command: command.to_string(),
            language: language.to_string(),
        }
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        let extension = sniff_extension(image)?;

        // Removed on drop, including every early return below.
        let mut scratch = tempfile::Builder::new()
            .prefix("unitext-ocr-")
            .suffix(&format!(".{extension}"))
            .tempfile()?;
        scratch.write_all(image)?;
        scratch.flush()?;

        debug!("Running {} on {}", self.command, scratch.path().display());
        let output = Command::new(&self.command)
            .arg(scratch.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| OcrError::Engine(format!("failed to run {}: {e}", self.command)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

/// Engine for environments without OCR; every image reads as empty text.
pub struct NoopOcr;

impl OcrEngine for NoopOcr {
    fn recognize(&self, _image: &[u8]) -> Result<String, OcrError> {
        Ok(String::new())
    }

    fn name(&self) -> &str {
        "noop"
    }
}

/// File extension for the detected image format.
fn sniff_extension(image: &[u8]) -> Result<&'static str, OcrError> {
    let format =
        image::guess_format(image).map_err(|e| OcrError::UnsupportedImage(e.to_string()))?;
    format
        .extensions_str()
        .first()
        .copied()
        .ok_or_else(|| OcrError::UnsupportedImage(format!("{format:?} has no file extension")))
}
