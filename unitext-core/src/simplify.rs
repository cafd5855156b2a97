//! Simplified and collapsed output modes.

use crate::types::*;
use std::collections::BTreeSet;

/// Merge the image and text aspects per unit into one string:
/// `"<image texts> <text>"`, trimmed. Links are not part of the result.
pub fn simplify(data: &DataObject) -> UnitMap<String> {
    let text = data.text();
    let images = data.images();

    let ordinals: BTreeSet<Ordinal> = text
        .into_iter()
        .flat_map(|m| m.ordinals())
        .chain(images.into_iter().flat_map(|m| m.ordinals()))
        .collect();

    ordinals
        .into_iter()
        .map(|ordinal| {
            let image_text = images
                .and_then(|m| m.get(ordinal))
                .map(|entries| join_image_text(entries))
                .unwrap_or_default();
            let unit_text = text
                .and_then(|m| m.get(ordinal))
                .map(String::as_str)
                .unwrap_or_default();
            (ordinal, format!("{image_text} {unit_text}").trim().to_string())
        })
        .collect()
}

fn join_image_text(entries: &[ImageContent]) -> String {
    entries
        .iter()
        .filter_map(ImageContent::text_form)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reduce result data to a single string.
pub fn collapse(data: ResultData) -> crate::error::Result<ResultData> {
    let joined = match data {
        ResultData::Collapsed(_) => return Ok(data),
        ResultData::Simplified(units) => units.values().cloned().collect::<Vec<_>>().join(" "),
        ResultData::Full(object) => object
            .fragments()
            .iter()
            .map(|f| f.value_json().map(|v| v.to_string()))
            .collect::<serde_json::Result<Vec<_>>>()?
            .join(" "),
    };
    Ok(ResultData::Collapsed(joined))
}
