//! Shape converters and the data composer.
//!
//! Extractor results become single-key fragments, and fragments are merged
//! into one [`DataObject`] keyed by aspect name.

use crate::error::{ExtractFailure, ExtractorError, Result};
use crate::types::*;
use log::warn;
use std::collections::HashSet;

/// Turn an extractor result into an aspect outcome; an error becomes the
/// fail-soft stand-in for this aspect only.
pub fn outcome<T>(kind: AspectKind, result: anyhow::Result<UnitMap<T>>) -> AspectOutcome<T> {
    match result {
        Ok(map) => AspectOutcome::Extracted(map),
        Err(e) => {
            warn!("{kind} extraction failed: {e:#}");
            AspectOutcome::Failed(ExtractFailure::new(kind, format!("{e:#}")))
        }
    }
}

pub fn text_fragment(result: anyhow::Result<UnitMap<String>>) -> Fragment {
    Fragment::Text(outcome(AspectKind::Text, result))
}

pub fn image_fragment(result: anyhow::Result<UnitMap<Vec<ImageContent>>>) -> Fragment {
    Fragment::Image(outcome(AspectKind::Image, result))
}

pub fn link_fragment(result: anyhow::Result<UnitMap<Vec<Link>>>) -> Fragment {
    Fragment::Link(outcome(AspectKind::Link, result))
}

/// Merge fragments in order. Each aspect may appear once.
pub fn compose<I>(fragments: I) -> Result<DataObject>
where
    I: IntoIterator<Item = Fragment>,
{
    let mut seen = HashSet::new();
    let mut data = DataObject::default();
    for fragment in fragments {
        let kind = fragment.kind();
        if !seen.insert(kind) {
            return Err(ExtractorError::DuplicateAspect(kind.to_string()));
        }
        data.fragments.push(fragment);
    }
    Ok(data)
}
