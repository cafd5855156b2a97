//! Document Extractors
//!
//! One extractor per supported format. Each turns raw document bytes into
//! per-unit aspect mappings that the pipeline composes into a data object.
//!
//! ## Architecture
//!
//! ```text
//! Document bytes (PDF, DOCX, PPTX, TXT)
//!     ↓
//! [Format-specific FormatExtractor]
//!     ↓
//! UnitMap per aspect (text, image, link)
//!     ↓
//! [shape::compose]
//!     ↓
//! DataObject
//! ```
//!
//! ## Available Extractors
//!
//! - `PdfExtractor` - pages via lopdf: image, text, link
//! - `DocxExtractor` - body paragraphs: text, image
//! - `PptxExtractor` - slides: text, OCR'd pictures
//! - `TxtExtractor` - whole file as one unit

pub mod docx;
pub mod ooxml;
pub mod pdf;
pub mod pptx;
pub mod traits;
pub mod txt;

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;
pub use pptx::PptxExtractor;
pub use traits::FormatExtractor;
pub use txt::TxtExtractor;

use crate::config::ExtractionConfig;
use crate::types::FileFormat;

/// Format tag → extractor lookup.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn FormatExtractor>>,
}

impl ExtractorRegistry {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            extractors: vec![
                Box::new(PdfExtractor::new(
                    config.pdf.include_links,
                    config.pdf.wrap_flate_images,
                )),
                Box::new(DocxExtractor::new()),
                Box::new(PptxExtractor::new()),
                Box::new(TxtExtractor::new(config.txt.lossy_utf8)),
            ],
        }
    }

    pub fn get(&self, format: FileFormat) -> Option<&dyn FormatExtractor> {
        self.extractors
            .iter()
            .find(|e| e.format() == format)
            .map(|e| e.as_ref())
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}
