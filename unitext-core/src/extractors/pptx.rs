//! PPTX extractor.
//!
//! Slides are taken in presentation order (`p:sldIdLst`). Only the direct
//! children of a slide's shape tree are considered: text shapes contribute
//! their paragraphs, picture shapes contribute an OCR result.

use super::ooxml::{self, local_name, prefixed_attr};
use super::traits::FormatExtractor;
use crate::ocr::{recognize_or_diagnostic, OcrEngine};
use crate::types::{AspectKind, FileFormat, ImageContent, UnitMap};
use crate::units::index_units;
use anyhow::{anyhow, Result};
use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;

const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Content of one slide's top-level shapes, in shape order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SlideContent {
    /// Every text-frame paragraph of every text shape
    pub paragraphs: Vec<String>,
    /// Relationship ids of picture shapes
    pub picture_ids: Vec<String>,
}

impl SlideContent {
    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }
}

pub struct PptxExtractor;

impl PptxExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PptxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatExtractor for PptxExtractor {
    fn format(&self) -> FileFormat {
        FileFormat::Pptx
    }

    fn name(&self) -> &str {
        "PptxExtractor"
    }

    fn aspects(&self) -> &[AspectKind] {
        &[AspectKind::Text, AspectKind::Image]
    }

    fn extract_text(&self, document: &[u8]) -> Result<UnitMap<String>> {
        let mut archive = ooxml::open_archive(document)?;
        let mut slides = Vec::new();
        for slide_part in slide_parts(&mut archive)? {
            let xml = ooxml::read_part(&mut archive, &slide_part)?;
            slides.push(parse_slide(&xml)?.text());
        }
        debug!("PPTX: {} slides", slides.len());
        Ok(index_units(slides))
    }

    /// Picture shapes are OCR'd eagerly; the aspect holds recognized text.
    fn extract_images(
        &self,
        document: &[u8],
        ocr: &dyn OcrEngine,
    ) -> Result<UnitMap<Vec<ImageContent>>> {
        let mut archive = ooxml::open_archive(document)?;
        let mut slides = Vec::new();
        for slide_part in slide_parts(&mut archive)? {
            let xml = ooxml::read_part(&mut archive, &slide_part)?;
            let content = parse_slide(&xml)?;
            let relationships = ooxml::load_relationships(&mut archive, &slide_part)?;
            let pictures = ooxml::read_related_parts(
                &mut archive,
                &relationships,
                &slide_part,
                &content.picture_ids,
            )?;
            debug!("{slide_part}: {} pictures", pictures.len());
            slides.push(
                pictures
                    .iter()
                    .map(|bytes| ImageContent::Recognized(recognize_or_diagnostic(ocr, bytes)))
                    .collect(),
            );
        }
        Ok(index_units(slides))
    }
}

/// Slide part names in presentation order.
pub fn slide_parts(archive: &mut ooxml::Archive<'_>) -> Result<Vec<String>> {
    let xml = ooxml::read_part(archive, PRESENTATION_PART)?;
    let relationships = ooxml::load_relationships(archive, PRESENTATION_PART)?;

    slide_ids(&xml)?
        .into_iter()
        .map(|id| {
            relationships
                .get(&id)
                .map(|rel| ooxml::resolve_target(ooxml::part_dir(PRESENTATION_PART), &rel.target))
                .ok_or_else(|| anyhow!("slide relationship '{id}' not found"))
        })
        .collect()
}

/// Relationship ids listed in `p:sldIdLst`.
fn slide_ids(xml: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut ids = Vec::new();
    let mut in_list = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"sldIdLst" => {
                in_list = true
            }
            Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == b"sldIdLst" => {
                in_list = false
            }
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if in_list && local_name(e.name().as_ref()) == b"sldId" =>
            {
                if let Some(id) = prefixed_attr(e, b"id") {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("presentation.xml parse failed: {e}")),
            _ => {}
        }
        buf.clear();
    }

    Ok(ids)
}

/// Walk one slide's shape tree.
///
/// Text comes from `a:t` runs and fields inside `p:txBody` paragraphs, with
/// `a:br` as a newline. Grouped shapes are not descended into.
pub fn parse_slide(xml: &[u8]) -> Result<SlideContent> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();

    let mut content = SlideContent::default();
    let mut depth = 0usize;
    let mut tree_level: Option<usize> = None;
    let mut shape: Option<(TopShape, usize)> = None;
    let mut text_body_level: Option<usize> = None;
    let mut paragraph: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if tree_level.is_none() && local == b"spTree" {
                    tree_level = Some(depth);
                } else if shape.is_none() && tree_level.is_some_and(|t| depth == t + 1) {
                    shape = TopShape::from_name(local).map(|kind| (kind, depth));
                } else if let Some((kind, _)) = shape {
                    match (kind, local) {
                        (TopShape::Text, b"txBody") if text_body_level.is_none() => {
                            text_body_level = Some(depth)
                        }
                        (TopShape::Text, b"p") if text_body_level.is_some() => {
                            paragraph = Some(String::new())
                        }
                        (TopShape::Text, b"t") if paragraph.is_some() => in_text = true,
                        (TopShape::Picture, b"blip") => collect_picture(e, &mut content),
                        _ => {}
                    }
                }
                depth += 1;
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                match (shape.map(|(kind, _)| kind), local) {
                    (Some(TopShape::Text), b"br") => {
                        if let Some(p) = paragraph.as_mut() {
                            p.push('\n');
                        }
                    }
                    (Some(TopShape::Text), b"p") if text_body_level.is_some() => {
                        content.paragraphs.push(String::new())
                    }
                    (Some(TopShape::Picture), b"blip") => collect_picture(e, &mut content),
                    _ => {}
                }
            }
            Ok(Event::Text(ref t)) if in_text => {
                let text = t.unescape().map_err(|e| anyhow!("bad slide text: {e}"))?;
                if let Some(p) = paragraph.as_mut() {
                    p.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                depth = depth.saturating_sub(1);
                let name = e.name();
                let local = local_name(name.as_ref());
                if local == b"t" {
                    in_text = false;
                }
                if local == b"p" && text_body_level.is_some() {
                    if let Some(p) = paragraph.take() {
                        content.paragraphs.push(p);
                    }
                }
                if text_body_level == Some(depth) {
                    text_body_level = None;
                }
                if shape.is_some_and(|(_, level)| level == depth) {
                    shape = None;
                }
                if tree_level == Some(depth) {
                    tree_level = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("slide parse failed: {e}")),
            _ => {}
        }
        buf.clear();
    }

    Ok(content)
}

/// Top-level shape kinds that carry extractable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TopShape {
    Text,
    Picture,
}

impl TopShape {
    fn from_name(local: &[u8]) -> Option<Self> {
        match local {
            b"sp" => Some(TopShape::Text),
            b"pic" => Some(TopShape::Picture),
            _ => None,
        }
    }
}

fn collect_picture(element: &quick_xml::events::BytesStart, content: &mut SlideContent) {
    if let Some(id) = prefixed_attr(element, b"embed") {
        content.picture_ids.push(id);
    }
}
