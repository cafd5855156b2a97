// Extractor abstraction for document formats
//
// This module defines the boundary between format parsing (bytes -> aspect
// mappings) and the format-agnostic shaping done by the pipeline. Each
// extractor declares which aspects it produces and in which order they are
// composed.

use crate::ocr::OcrEngine;
use crate::types::*;
use anyhow::{bail, Result};

/// FormatExtractor trait - converts one document format into aspect mappings
///
/// Every aspect method is independent: it gets the raw document bytes and
/// either returns a unit mapping or an error. The pipeline turns errors into
/// fail-soft diagnostics, so implementations should just propagate with `?`.
pub trait FormatExtractor: Send + Sync {
    /// Format handled by this extractor
    fn format(&self) -> FileFormat;

    /// Get extractor name for debugging/logging
    fn name(&self) -> &str;

    /// Aspects produced, in composition order
    fn aspects(&self) -> &[AspectKind];

    fn supports(&self, aspect: AspectKind) -> bool {
        self.aspects().contains(&aspect)
    }

    /// Per-unit text
    fn extract_text(&self, _document: &[u8]) -> Result<UnitMap<String>> {
        bail!("{} does not extract text", self.name())
    }

    /// Per-unit images. Extractors that store recognized text instead of blobs
    /// use `ocr` here.
    fn extract_images(
        &self,
        _document: &[u8],
        _ocr: &dyn OcrEngine,
    ) -> Result<UnitMap<Vec<ImageContent>>> {
        bail!("{} does not extract images", self.name())
    }

    /// Per-unit hyperlinks
    fn extract_links(&self, _document: &[u8]) -> Result<UnitMap<Vec<Link>>> {
        bail!("{} does not extract links", self.name())
    }
}
