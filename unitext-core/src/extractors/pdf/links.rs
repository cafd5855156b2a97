//! URI link annotations of a page and their anchor text.
//!
//! Anchor text is the page text whose origin falls inside the annotation's
//! rectangle. Origins come from a walk over the text positioning operators;
//! the graphics CTM and glyph advances are not tracked, so every piece shown
//! by one operator is placed at the operator's starting point.

use super::strings::decode_pdf_string;
use super::{as_number, resolve};
use crate::types::Link;
use anyhow::Result;
use log::debug;
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// A piece of page text and the text-space origin it was shown at.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPiece {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// Links on a page in annotation order. Only annotations with a URI action
/// are kept; internal destinations and other actions are ignored.
pub fn page_links(doc: &Document, page_id: ObjectId) -> Result<Vec<Link>> {
    let page = doc.get_dictionary(page_id)?;
    let annotations = match page.get(b"Annots") {
        Ok(annots) => match resolve(doc, annots)? {
            Object::Array(items) => items.as_slice(),
            _ => return Ok(Vec::new()),
        },
        Err(_) => return Ok(Vec::new()),
    };

    let mut targets = Vec::new();
    for annotation in annotations {
        let Object::Dictionary(dict) = resolve(doc, annotation)? else {
            continue;
        };
        if let Some(target) = uri_target(doc, dict)? {
            targets.push(target);
        }
    }
    if targets.is_empty() {
        return Ok(Vec::new());
    }

    // Only walk the content stream when there is something to anchor.
    let pieces = match doc.get_page_content(page_id) {
        Ok(bytes) => text_pieces(&bytes),
        Err(e) => {
            debug!("page content unreadable, links get empty text: {e}");
            Vec::new()
        }
    };

    Ok(targets
        .into_iter()
        .map(|(uri, rect)| Link::new(text_in_rect(&pieces, rect), uri))
        .collect())
}

type Rect = [f32; 4];

fn uri_target(doc: &Document, annotation: &Dictionary) -> Result<Option<(String, Rect)>> {
    if !matches!(annotation.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Link") {
        return Ok(None);
    }
    let action = match annotation.get(b"A") {
        Ok(action) => match resolve(doc, action)? {
            Object::Dictionary(dict) => dict,
            _ => return Ok(None),
        },
        Err(_) => return Ok(None),
    };
    if !matches!(action.get(b"S"), Ok(Object::Name(n)) if n == b"URI") {
        return Ok(None);
    }
    let uri = match action.get(b"URI").map(|o| resolve(doc, o)) {
        Ok(Ok(Object::String(bytes, _))) => decode_pdf_string(bytes),
        _ => return Ok(None),
    };
    let rect = match annotation.get(b"Rect").map(|o| resolve(doc, o)) {
        Ok(Ok(Object::Array(values))) => normalize_rect(values),
        _ => None,
    };
    Ok(Some((uri, rect.unwrap_or([0.0; 4]))))
}

fn normalize_rect(values: &[Object]) -> Option<Rect> {
    let numbers: Vec<f32> = values.iter().filter_map(as_number).collect();
    let [x1, y1, x2, y2] = numbers[..] else {
        return None;
    };
    Some([x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2)])
}

fn text_in_rect(pieces: &[TextPiece], rect: Rect) -> String {
    let [x0, y0, x1, y1] = rect;
    let mut text = String::new();
    let mut last_y: Option<f32> = None;
    for piece in pieces
        .iter()
        .filter(|p| p.x >= x0 && p.x <= x1 && p.y >= y0 && p.y <= y1)
    {
        if last_y.is_some_and(|y| (y - piece.y).abs() > f32::EPSILON) {
            text.push(' ');
        }
        text.push_str(&piece.text);
        last_y = Some(piece.y);
    }
    text.trim().to_string()
}

/// Row-vector text matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy)]
struct TextMatrix([f32; 6]);

impl TextMatrix {
    const IDENTITY: TextMatrix = TextMatrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translated(&self, tx: f32, ty: f32) -> Self {
        let [a, b, c, d, e, f] = self.0;
        TextMatrix([a, b, c, d, tx * a + ty * c + e, tx * b + ty * d + f])
    }

    fn origin(&self) -> (f32, f32) {
        (self.0[4], self.0[5])
    }
}

/// Walk a page content stream and collect shown strings with their origins.
pub fn text_pieces(content: &[u8]) -> Vec<TextPiece> {
    let content = match Content::decode(content) {
        Ok(content) => content,
        Err(e) => {
            debug!("content stream decode failed: {e}");
            return Vec::new();
        }
    };

    let mut pieces = Vec::new();
    let mut line = TextMatrix::IDENTITY;
    let mut leading = 0.0f32;

    let number = |operands: &[Object], idx: usize| operands.get(idx).and_then(as_number);

    for op in content.operations {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "BT" => line = TextMatrix::IDENTITY,
            "TL" => leading = number(operands, 0).unwrap_or(leading),
            "Tm" => {
                if let Some(values) = (0..6)
                    .map(|i| number(operands, i))
                    .collect::<Option<Vec<f32>>>()
                {
                    line = TextMatrix([
                        values[0], values[1], values[2], values[3], values[4], values[5],
                    ]);
                }
            }
            "Td" | "TD" => {
                let tx = number(operands, 0).unwrap_or(0.0);
                let ty = number(operands, 1).unwrap_or(0.0);
                if op.operator == "TD" {
                    leading = -ty;
                }
                line = line.translated(tx, ty);
            }
            "T*" => line = line.translated(0.0, -leading),
            "Tj" => push_piece(&mut pieces, &line, operands.first()),
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let joined: String = items
                        .iter()
                        .filter_map(|item| match item {
                            Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
                            _ => None,
                        })
                        .collect();
                    push_text(&mut pieces, &line, joined);
                }
            }
            "'" => {
                line = line.translated(0.0, -leading);
                push_piece(&mut pieces, &line, operands.first());
            }
            "\"" => {
                line = line.translated(0.0, -leading);
                push_piece(&mut pieces, &line, operands.get(2));
            }
            _ => {}
        }
    }

    pieces
}

fn push_piece(pieces: &mut Vec<TextPiece>, line: &TextMatrix, operand: Option<&Object>) {
    if let Some(Object::String(bytes, _)) = operand {
        push_text(pieces, line, decode_pdf_string(bytes));
    }
}

fn push_text(pieces: &mut Vec<TextPiece>, line: &TextMatrix, text: String) {
    if text.is_empty() {
        return;
    }
    let (x, y) = line.origin();
    pieces.push(TextPiece { text, x, y });
}
