//! DOCX extractor.
//!
//! Units are the body-level paragraphs of `word/document.xml`. Text and images
//! come from the same paragraph walk so both aspects share one ordinal space.

use super::ooxml::{self, local_name, prefixed_attr};
use super::traits::FormatExtractor;
use crate::ocr::OcrEngine;
use crate::types::{AspectKind, FileFormat, ImageContent, UnitMap};
use crate::units::index_units;
use anyhow::{anyhow, Result};
use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;

const DOCUMENT_PART: &str = "word/document.xml";

/// One body-level paragraph: its text and the relationship ids of the
/// pictures drawn in its runs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DocxParagraph {
    pub text: String,
    pub image_ids: Vec<String>,
}

pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatExtractor for DocxExtractor {
    fn format(&self) -> FileFormat {
        FileFormat::Docx
    }

    fn name(&self) -> &str {
        "DocxExtractor"
    }

    fn aspects(&self) -> &[AspectKind] {
        &[AspectKind::Text, AspectKind::Image]
    }

    fn extract_text(&self, document: &[u8]) -> Result<UnitMap<String>> {
        let mut archive = ooxml::open_archive(document)?;
        let xml = ooxml::read_part(&mut archive, DOCUMENT_PART)?;
        let paragraphs = parse_paragraphs(&xml)?;
        debug!("DOCX: {} paragraphs", paragraphs.len());
        Ok(index_units(paragraphs.into_iter().map(|p| p.text)))
    }

    fn extract_images(
        &self,
        document: &[u8],
        _ocr: &dyn OcrEngine,
    ) -> Result<UnitMap<Vec<ImageContent>>> {
        let mut archive = ooxml::open_archive(document)?;
        let xml = ooxml::read_part(&mut archive, DOCUMENT_PART)?;
        let relationships = ooxml::load_relationships(&mut archive, DOCUMENT_PART)?;

        let mut units = Vec::new();
        for paragraph in parse_paragraphs(&xml)? {
            let blobs = ooxml::read_related_parts(
                &mut archive,
                &relationships,
                DOCUMENT_PART,
                &paragraph.image_ids,
            )?;
            units.push(blobs.into_iter().map(ImageContent::Blob).collect());
        }
        Ok(index_units(units))
    }
}

/// Walk `word/document.xml` and collect its body-level paragraphs.
///
/// Text comes from `w:t`, `w:tab` and `w:br`/`w:cr` inside runs. Text in
/// drawings (text boxes, shapes) and in `mc:Fallback` branches is left out.
/// Pictures are `a:blip` references inside an `a:graphic`; fallback branches
/// are skipped so a picture is counted once.
pub fn parse_paragraphs(xml: &[u8]) -> Result<Vec<DocxParagraph>> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();

    let mut paragraphs = Vec::new();
    let mut depth = 0usize;
    let mut body_level: Option<usize> = None;
    let mut paragraph_level: Option<usize> = None;
    let mut current = DocxParagraph::default();

    // Depths at which suppressing containers were opened.
    let mut run_level: Option<usize> = None;
    let mut drawing_level: Option<usize> = None;
    let mut fallback_level: Option<usize> = None;
    let mut graphic_level: Option<usize> = None;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                match local {
                    b"body" if body_level.is_none() => body_level = Some(depth),
                    b"p" if paragraph_level.is_none()
                        && body_level.is_some_and(|b| depth == b + 1) =>
                    {
                        paragraph_level = Some(depth);
                        current = DocxParagraph::default();
                    }
                    _ if paragraph_level.is_some() => match local {
                        b"r" if run_level.is_none() => run_level = Some(depth),
                        b"drawing" | b"pict" | b"object" if drawing_level.is_none() => {
                            drawing_level = Some(depth)
                        }
                        b"Fallback" if fallback_level.is_none() => fallback_level = Some(depth),
                        b"graphic" if graphic_level.is_none() => graphic_level = Some(depth),
                        b"t" => in_text = text_allowed(run_level, drawing_level, fallback_level),
                        b"blip" => collect_blip(e, graphic_level, fallback_level, &mut current),
                        _ => {}
                    },
                    _ => {}
                }
                depth += 1;
            }
            Ok(Event::Empty(ref e)) if paragraph_level.is_none() => {
                let name = e.name();
                if local_name(name.as_ref()) == b"p" && body_level.is_some_and(|b| depth == b + 1) {
                    paragraphs.push(DocxParagraph::default());
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"tab" if text_allowed(run_level, drawing_level, fallback_level) => {
                        current.text.push('\t')
                    }
                    b"br" | b"cr" if text_allowed(run_level, drawing_level, fallback_level) => {
                        current.text.push('\n')
                    }
                    b"blip" => collect_blip(e, graphic_level, fallback_level, &mut current),
                    _ => {}
                }
            }
            Ok(Event::Text(ref t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| anyhow!("bad text in paragraph {}: {e}", paragraphs.len() + 1))?;
                current.text.push_str(&text);
            }
            Ok(Event::End(ref e)) => {
                depth = depth.saturating_sub(1);
                let name = e.name();
                if local_name(name.as_ref()) == b"t" {
                    in_text = false;
                }
                close_at(&mut run_level, depth);
                close_at(&mut drawing_level, depth);
                close_at(&mut fallback_level, depth);
                close_at(&mut graphic_level, depth);
                if paragraph_level == Some(depth) {
                    paragraph_level = None;
                    paragraphs.push(std::mem::take(&mut current));
                }
                if body_level == Some(depth) {
                    body_level = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(anyhow!(
                    "document.xml parse failed at byte {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

fn text_allowed(
    run_level: Option<usize>,
    drawing_level: Option<usize>,
    fallback_level: Option<usize>,
) -> bool {
    run_level.is_some() && drawing_level.is_none() && fallback_level.is_none()
}

fn collect_blip(
    element: &quick_xml::events::BytesStart,
    graphic_level: Option<usize>,
    fallback_level: Option<usize>,
    paragraph: &mut DocxParagraph,
) {
    if graphic_level.is_none() || fallback_level.is_some() {
        return;
    }
    if let Some(id) = prefixed_attr(element, b"embed") {
        paragraph.image_ids.push(id);
    }
}

fn close_at(level: &mut Option<usize>, depth: usize) {
    if *level == Some(depth) {
        *level = None;
    }
}
