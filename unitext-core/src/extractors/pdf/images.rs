//! Image XObjects of a page.
//!
//! JPEG and JPEG 2000 streams are already self-contained files and are
//! returned verbatim. Flate-compressed or unfiltered samples are raw pixels;
//! they are wrapped into a PNG so the blob is a usable image.

use flate2::read::ZlibDecoder;
use log::debug;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashSet;
use std::io::Read;

/// Upper bound on page tree levels walked for inherited resources.
const MAX_TREE_DEPTH: usize = 64;

/// An image XObject stream with the dictionary entries needed to export it.
#[derive(Debug)]
struct ImageXObject<'a> {
    id: Option<ObjectId>,
    width: i64,
    height: i64,
    color_space: Option<String>,
    bits_per_component: Option<i64>,
    filters: Vec<String>,
    content: &'a [u8],
}

impl<'a> ImageXObject<'a> {
    fn from_stream(doc: &'a Document, id: Option<ObjectId>, stream: &'a Stream) -> Option<Self> {
        let dict = &stream.dict;
        let width = lookup(doc, dict, b"Width")?.as_i64().ok()?;
        let height = lookup(doc, dict, b"Height")?.as_i64().ok()?;
        let color_space = lookup(doc, dict, b"ColorSpace").and_then(|cs| match cs {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(array) => array.first().and_then(|family| family.as_name().ok()),
            _ => None,
        });
        let bits_per_component = match lookup(doc, dict, b"BitsPerComponent") {
            Some(bits) => Some(bits.as_i64().ok()?),
            None => None,
        };
        let filters = match dict.get(b"Filter") {
            Ok(_) => stream.filters().ok()?,
            Err(_) => Vec::new(),
        };
        Some(Self {
            id,
            width,
            height,
            color_space: color_space.map(|name| String::from_utf8_lossy(name).into_owned()),
            bits_per_component,
            filters,
            content: &stream.content,
        })
    }
}

/// Image blobs drawn from a page's resources, in resource order.
///
/// Resources inherited from the page tree are honored and form XObjects are
/// searched for nested images. Each image object is listed once per page.
/// Images that cannot be turned into a blob are skipped.
pub fn page_images(doc: &Document, page_id: ObjectId, wrap_raw: bool) -> Vec<Vec<u8>> {
    let Some(resources) = page_resources(doc, page_id) else {
        debug!("page {page_id:?}: no resources");
        return Vec::new();
    };
    let mut visited = HashSet::new();
    let mut images = Vec::new();
    collect_images(doc, resources, &mut visited, &mut images);
    images
        .iter()
        .filter_map(|image| image_blob(image, wrap_raw))
        .collect()
}

/// The page's own `/Resources`, else the nearest ancestor's.
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Some(resources) = lookup(doc, node, b"Resources") {
            return resources.as_dict().ok();
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn collect_images<'a>(
    doc: &'a Document,
    resources: &'a Dictionary,
    visited: &mut HashSet<ObjectId>,
    images: &mut Vec<ImageXObject<'a>>,
) {
    let Some(xobjects) = lookup(doc, resources, b"XObject").and_then(|o| o.as_dict().ok()) else {
        return;
    };
    for (name, value) in xobjects.iter() {
        let Ok((id, object)) = doc.dereference(value) else {
            debug!("xobject {}: dangling reference", String::from_utf8_lossy(name));
            continue;
        };
        if let Some(id) = id {
            if !visited.insert(id) {
                continue;
            }
        }
        let Ok(stream) = object.as_stream() else {
            continue;
        };
        match stream.dict.get(b"Subtype").and_then(Object::as_name) {
            Ok(b"Image") => match ImageXObject::from_stream(doc, id, stream) {
                Some(image) => images.push(image),
                None => debug!(
                    "xobject {}: malformed image dictionary",
                    String::from_utf8_lossy(name)
                ),
            },
            Ok(b"Form") => {
                if let Some(form_resources) =
                    lookup(doc, &stream.dict, b"Resources").and_then(|o| o.as_dict().ok())
                {
                    collect_images(doc, form_resources, visited, images);
                }
            }
            _ => {}
        }
    }
}

/// Dictionary entry with references followed.
fn lookup<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let value = dict.get(key).ok()?;
    doc.dereference(value).ok().map(|(_, object)| object)
}

fn image_blob(image: &ImageXObject<'_>, wrap_raw: bool) -> Option<Vec<u8>> {
    let filters = image.filters.as_slice();
    let has = |name: &str| filters.iter().any(|f| f == name);

    if has("DCTDecode") || has("JPXDecode") {
        return Some(image.content.to_vec());
    }
    if !wrap_raw {
        debug!("skipping raw image {:?}", image.id);
        return None;
    }

    let samples = if has("FlateDecode") {
        let mut decoder = ZlibDecoder::new(image.content);
        let mut decompressed = Vec::new();
        if let Err(e) = decoder.read_to_end(&mut decompressed) {
            debug!("image {:?}: decompression failed: {e}", image.id);
            return None;
        }
        decompressed
    } else if filters.is_empty() {
        image.content.to_vec()
    } else {
        debug!("image {:?}: unsupported filters {filters:?}", image.id);
        return None;
    };

    match encode_png(image, samples) {
        Ok(png) => Some(png),
        Err(e) => {
            debug!("image {:?}: {e}", image.id);
            None
        }
    }
}

fn encode_png(image: &ImageXObject<'_>, samples: Vec<u8>) -> Result<Vec<u8>, String> {
    if image.bits_per_component.unwrap_or(8) != 8 {
        return Err("only 8-bit samples are supported".to_string());
    }
    let width = u32::try_from(image.width).map_err(|_| "bad width".to_string())?;
    let height = u32::try_from(image.height).map_err(|_| "bad height".to_string())?;

    let color_space = image.color_space.as_deref().unwrap_or("DeviceRGB");
    let decoded = match color_space {
        "DeviceGray" | "CalGray" | "G" => image::GrayImage::from_raw(width, height, samples)
            .map(image::DynamicImage::ImageLuma8),
        "DeviceCMYK" | "CMYK" => image::RgbImage::from_raw(width, height, cmyk_to_rgb(&samples))
            .map(image::DynamicImage::ImageRgb8),
        _ => image::RgbImage::from_raw(width, height, samples)
            .map(image::DynamicImage::ImageRgb8),
    };
    let decoded = decoded
        .ok_or_else(|| format!("sample data does not fit {width}x{height} {color_space}"))?;

    let mut png = Vec::new();
    decoded
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| format!("PNG encoding failed: {e}"))?;
    Ok(png)
}

#[allow(clippy::many_single_char_names)]
fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity((cmyk.len() / 4) * 3);
    for chunk in cmyk.chunks_exact(4) {
        let k = 1.0 - f32::from(chunk[3]) / 255.0;
        for channel in &chunk[..3] {
            let value = 255.0 * (1.0 - f32::from(*channel) / 255.0) * k;
            rgb.push(value as u8);
        }
    }
    rgb
}
