//! PDF extractor.
//!
//! Units are pages, numbered as lopdf numbers them (1-based, in page tree
//! order). Aspects are composed image first, then text, then links.

mod images;
mod links;
mod strings;

pub use images::page_images;
pub use links::{page_links, TextPiece};
pub use strings::decode_pdf_string;

use super::traits::FormatExtractor;
use crate::ocr::OcrEngine;
use crate::types::{AspectKind, FileFormat, ImageContent, Link, UnitMap};
use anyhow::{Context, Result};
use log::debug;
use lopdf::{Document, Object};

pub struct PdfExtractor {
    include_links: bool,
    wrap_flate_images: bool,
}

impl PdfExtractor {
    pub fn new(include_links: bool, wrap_flate_images: bool) -> Self {
        Self {
            include_links,
            wrap_flate_images,
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl FormatExtractor for PdfExtractor {
    fn format(&self) -> FileFormat {
        FileFormat::Pdf
    }

    fn name(&self) -> &str {
        "PdfExtractor"
    }

    fn aspects(&self) -> &[AspectKind] {
        if self.include_links {
            &[AspectKind::Image, AspectKind::Text, AspectKind::Link]
        } else {
            &[AspectKind::Image, AspectKind::Text]
        }
    }

    /// A page whose text cannot be decoded keeps its slot with empty text.
    fn extract_text(&self, document: &[u8]) -> Result<UnitMap<String>> {
        let doc = load(document)?;
        let mut pages = UnitMap::new();
        for page_number in doc.get_pages().keys().copied() {
            let text = doc.extract_text(&[page_number]).unwrap_or_else(|e| {
                debug!("page {page_number}: no text extracted: {e}");
                String::new()
            });
            pages.insert(page_number, text);
        }
        Ok(pages)
    }

    fn extract_images(
        &self,
        document: &[u8],
        _ocr: &dyn OcrEngine,
    ) -> Result<UnitMap<Vec<ImageContent>>> {
        let doc = load(document)?;
        let mut pages = UnitMap::new();
        for (page_number, page_id) in doc.get_pages() {
            let blobs = page_images(&doc, page_id, self.wrap_flate_images);
            debug!("page {page_number}: {} images", blobs.len());
            pages.insert(page_number, blobs.into_iter().map(ImageContent::Blob).collect());
        }
        Ok(pages)
    }

    fn extract_links(&self, document: &[u8]) -> Result<UnitMap<Vec<Link>>> {
        let doc = load(document)?;
        let mut pages = UnitMap::new();
        for (page_number, page_id) in doc.get_pages() {
            let links = page_links(&doc, page_id)
                .with_context(|| format!("page {page_number}: link listing failed"))?;
            pages.insert(page_number, links);
        }
        Ok(pages)
    }
}

fn load(document: &[u8]) -> Result<Document> {
    let doc = Document::load_mem(document).context("failed to parse PDF")?;
    if doc.is_encrypted() {
        anyhow::bail!("encrypted PDFs are not supported");
    }
    Ok(doc)
}

/// Follow a reference to its object; direct objects are returned as is.
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object> {
    match object {
        Object::Reference(id) => doc
            .get_object(*id)
            .with_context(|| format!("dangling reference {} {}", id.0, id.1)),
        other => Ok(other),
    }
}

pub(crate) fn as_number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
