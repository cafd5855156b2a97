//! Plain text extractor. The whole file is one unit.

use super::traits::FormatExtractor;
use crate::types::{AspectKind, FileFormat, UnitMap};
use crate::units::single_unit;
use anyhow::{Context, Result};

pub struct TxtExtractor {
    lossy: bool,
}

impl TxtExtractor {
    pub fn new(lossy: bool) -> Self {
        Self { lossy }
    }
}

impl Default for TxtExtractor {
    fn default() -> Self {
        Self::new(false)
    }
}

impl FormatExtractor for TxtExtractor {
    fn format(&self) -> FileFormat {
        FileFormat::Txt
    }

    fn name(&self) -> &str {
        "TxtExtractor"
    }

    fn aspects(&self) -> &[AspectKind] {
        &[AspectKind::Text]
    }

    fn extract_text(&self, document: &[u8]) -> Result<UnitMap<String>> {
        let text = if self.lossy {
            String::from_utf8_lossy(document).into_owned()
        } else {
            String::from_utf8(document.to_vec()).context("text is not valid UTF-8")?
        };
        Ok(single_unit(text))
    }
}
