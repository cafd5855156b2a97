//! Shared plumbing for Office Open XML containers (DOCX, PPTX).
//!
//! Both formats are zip archives of XML parts linked by relationship files.
//! This module covers the archive access and relationship resolution; the
//! per-format modules own the document XML walks.

use anyhow::{anyhow, Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use zip::ZipArchive;

pub type Archive<'a> = ZipArchive<Cursor<&'a [u8]>>;

/// Most bytes reserved up front for a part; the declared size is untrusted.
const MAX_PART_PREALLOCATION: u64 = 1 << 20;

/// One entry of a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub target: String,
    pub external: bool,
}

pub fn open_archive(bytes: &[u8]) -> Result<Archive<'_>> {
    ZipArchive::new(Cursor::new(bytes)).context("document is not a valid zip container")
}

/// Read a part by name. Part names are matched case-insensitively, as
/// producers disagree on casing.
pub fn read_part(archive: &mut Archive<'_>, name: &str) -> Result<Vec<u8>> {
    let actual = archive
        .file_names()
        .find(|entry| entry.eq_ignore_ascii_case(name))
        .map(str::to_string)
        .ok_or_else(|| anyhow!("missing part '{name}'"))?;
    let mut entry = archive.by_name(&actual)?;
    let mut buffer = Vec::with_capacity(entry.size().min(MAX_PART_PREALLOCATION) as usize);
    entry
        .read_to_end(&mut buffer)
        .with_context(|| format!("failed to read part '{name}'"))?;
    Ok(buffer)
}

/// Like [`read_part`] but a missing part is `None`.
pub fn read_optional_part(archive: &mut Archive<'_>, name: &str) -> Result<Option<Vec<u8>>> {
    let present = archive
        .file_names()
        .any(|entry| entry.eq_ignore_ascii_case(name));
    if present {
        read_part(archive, name).map(Some)
    } else {
        Ok(None)
    }
}

/// Relationship part that belongs to `part`:
/// `ppt/slides/slide1.xml` → `ppt/slides/_rels/slide1.xml.rels`.
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Directory of a part name, used as the base for its relative targets.
pub fn part_dir(part: &str) -> &str {
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Resolve a relationship target against the directory of its source part.
/// Absolute targets (`/word/media/a.png`) are rooted at the package.
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    let mut segments: Vec<&str> = if target.starts_with('/') {
        Vec::new()
    } else {
        base_dir.split('/').filter(|s| !s.is_empty()).collect()
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Parse a `.rels` part into id → relationship.
pub fn parse_relationships(xml: &[u8]) -> Result<HashMap<String, Relationship>> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut relationships = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let id = attr(e, b"Id").unwrap_or_default();
                let target = attr(e, b"Target").unwrap_or_default();
                let external = attr(e, b"TargetMode")
                    .is_some_and(|mode| mode.eq_ignore_ascii_case("External"));
                if !id.is_empty() && !target.is_empty() {
                    relationships.insert(id, Relationship { target, external });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("relationships parse failed: {e}")),
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

/// Load and parse the relationships of `part`; a part without a `.rels`
/// file has no relationships.
pub fn load_relationships(
    archive: &mut Archive<'_>,
    part: &str,
) -> Result<HashMap<String, Relationship>> {
    match read_optional_part(archive, &rels_path_for(part))? {
        Some(xml) => parse_relationships(&xml),
        None => Ok(HashMap::new()),
    }
}

/// Follow relationship ids of `source_part` to the bytes of their targets.
///
/// External targets and dangling ids are skipped with a warning.
pub fn read_related_parts(
    archive: &mut Archive<'_>,
    relationships: &HashMap<String, Relationship>,
    source_part: &str,
    ids: &[String],
) -> Result<Vec<Vec<u8>>> {
    let mut parts = Vec::with_capacity(ids.len());
    for id in ids {
        let Some(rel) = relationships.get(id) else {
            log::warn!("{source_part}: relationship '{id}' not found");
            continue;
        };
        if rel.external {
            log::debug!("{source_part}: skipping external target {}", rel.target);
            continue;
        }
        let path = resolve_target(part_dir(source_part), &rel.target);
        match read_optional_part(archive, &path)? {
            Some(bytes) => parts.push(bytes),
            None => log::warn!("{source_part}: '{path}' is referenced but missing"),
        }
    }
    Ok(parts)
}

/// Element or attribute name without its namespace prefix.
pub fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|b| *b == b':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// Unprefixed attribute value.
pub fn attr(element: &BytesStart, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| attribute_value(&a))
}

/// Namespaced attribute value matched by local name, e.g. `r:embed` / `r:id`.
/// Unprefixed attributes with the same local name are ignored.
pub fn prefixed_attr(element: &BytesStart, local: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| a.key.as_ref().contains(&b':') && local_name(a.key.as_ref()) == local)
        .map(|a| attribute_value(&a))
}

fn attribute_value(attribute: &quick_xml::events::attributes::Attribute) -> String {
    attribute
        .unescape_value()
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| String::from_utf8_lossy(&attribute.value).into_owned())
}
