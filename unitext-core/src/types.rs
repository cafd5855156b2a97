use crate::error::{ExtractFailure, ExtractorError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// 1-based position of a unit (page, paragraph, slide) inside one document.
pub type Ordinal = u32;

// ===== INPUT TYPES =====

/// Supported document formats. Tags are case-insensitive at the boundary
/// and canonicalized to upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileFormat {
    Pdf,
    Docx,
    Pptx,
    Txt,
}

impl FileFormat {
    pub const ALL: [FileFormat; 4] = [
        FileFormat::Pdf,
        FileFormat::Docx,
        FileFormat::Pptx,
        FileFormat::Txt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Pdf => "PDF",
            FileFormat::Docx => "DOCX",
            FileFormat::Pptx => "PPTX",
            FileFormat::Txt => "TXT",
        }
    }

    /// Comma separated list of every tag, for messages.
    pub fn list_formats() -> String {
        Self::ALL
            .iter()
            .map(FileFormat::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for FileFormat {
    type Err = ExtractorError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "PDF" => Ok(FileFormat::Pdf),
            "DOCX" => Ok(FileFormat::Docx),
            "PPTX" => Ok(FileFormat::Pptx),
            "TXT" => Ok(FileFormat::Txt),
            _ => Err(ExtractorError::UnsupportedFormat(tag.to_string())),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two independent output-mode flags of a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionMode {
    /// Keep the full per-aspect representation (skip simplification).
    #[serde(default)]
    pub return_representation: bool,
    /// Collapse the simplified per-unit mapping into one string.
    /// Only meaningful when `return_representation` is false.
    #[serde(default)]
    pub collapse: bool,
}

impl ExtractionMode {
    pub fn full() -> Self {
        Self {
            return_representation: true,
            collapse: false,
        }
    }

    pub fn simplified() -> Self {
        Self::default()
    }

    pub fn collapsed() -> Self {
        Self {
            return_representation: false,
            collapse: true,
        }
    }
}

// ===== ASPECT TYPES =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectKind {
    Text,
    Image,
    Link,
}

impl AspectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectKind::Text => "text",
            AspectKind::Image => "image",
            AspectKind::Link => "link",
        }
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping from unit ordinal to an aspect value, ordered numerically.
///
/// Serializes as a JSON object keyed by the decimal ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UnitMap<T>(BTreeMap<Ordinal, T>);

impl<T> UnitMap<T> {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, ordinal: Ordinal, value: T) -> Option<T> {
        self.0.insert(ordinal, value)
    }

    pub fn get(&self, ordinal: Ordinal) -> Option<&T> {
        self.0.get(&ordinal)
    }

    pub fn get_mut(&mut self, ordinal: Ordinal) -> Option<&mut T> {
        self.0.get_mut(&ordinal)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ordinals(&self) -> impl Iterator<Item = Ordinal> + '_ {
        self.0.keys().copied()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.0.values_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ordinal, &T)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }
}

impl<T> Default for UnitMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(Ordinal, T)> for UnitMap<T> {
    fn from_iter<I: IntoIterator<Item = (Ordinal, T)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for UnitMap<T> {
    type Item = (Ordinal, T);
    type IntoIter = std::collections::btree_map::IntoIter<Ordinal, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// One entry of an `image` aspect.
///
/// PDF and DOCX produce raw blobs; PPTX stores OCR text directly because
/// downstream consumers only want text from slide pictures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageContent {
    Blob(Vec<u8>),
    Recognized(String),
}

impl ImageContent {
    /// Text contributed to simplified output. Blobs have none.
    pub fn text_form(&self) -> Option<&str> {
        match self {
            ImageContent::Blob(_) => None,
            ImageContent::Recognized(text) => Some(text),
        }
    }
}

impl Serialize for ImageContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ImageContent::Blob(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            ImageContent::Recognized(text) => serializer.serialize_str(text),
        }
    }
}

/// A hyperlink found on a PDF page. Serialized as `[text, uri]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub text: String,
    pub uri: String,
}

impl Link {
    pub fn new(text: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            uri: uri.into(),
        }
    }
}

impl Serialize for Link {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.text, &self.uri).serialize(serializer)
    }
}

/// Result of extracting one aspect: the mapping, or the reason it is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AspectOutcome<T> {
    Extracted(UnitMap<T>),
    Failed(ExtractFailure),
}

impl<T> AspectOutcome<T> {
    /// The mapping, if extraction succeeded.
    pub fn mapping(&self) -> Option<&UnitMap<T>> {
        match self {
            AspectOutcome::Extracted(map) => Some(map),
            AspectOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ExtractFailure> {
        match self {
            AspectOutcome::Extracted(_) => None,
            AspectOutcome::Failed(failure) => Some(failure),
        }
    }
}

impl<T: Serialize> Serialize for AspectOutcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AspectOutcome::Extracted(map) => map.serialize(serializer),
            AspectOutcome::Failed(failure) => serializer.serialize_str(&failure.diagnostic()),
        }
    }
}

// ===== COMPOSED TYPES =====

/// A single-key piece of the data object: `{"<aspect>": <mapping>}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(AspectOutcome<String>),
    Image(AspectOutcome<Vec<ImageContent>>),
    Link(AspectOutcome<Vec<Link>>),
}

impl Fragment {
    pub fn kind(&self) -> AspectKind {
        match self {
            Fragment::Text(_) => AspectKind::Text,
            Fragment::Image(_) => AspectKind::Image,
            Fragment::Link(_) => AspectKind::Link,
        }
    }

    fn serialize_value<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        match self {
            Fragment::Text(outcome) => map.serialize_entry(self.kind().as_str(), outcome),
            Fragment::Image(outcome) => map.serialize_entry(self.kind().as_str(), outcome),
            Fragment::Link(outcome) => map.serialize_entry(self.kind().as_str(), outcome),
        }
    }

    /// JSON rendering of the aspect value alone (without its key).
    pub fn value_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Fragment::Text(outcome) => serde_json::to_value(outcome),
            Fragment::Image(outcome) => serde_json::to_value(outcome),
            Fragment::Link(outcome) => serde_json::to_value(outcome),
        }
    }
}

impl Serialize for Fragment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        self.serialize_value(&mut map)?;
        map.end()
    }
}

/// All aspects of one document, unique by aspect name, in composition order.
///
/// Serializes as the inner aspect map; [`DataObject::to_envelope`] adds the
/// `{"data": ...}` wrapper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataObject {
    pub(crate) fragments: Vec<Fragment>,
}

impl DataObject {
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn get(&self, kind: AspectKind) -> Option<&Fragment> {
        self.fragments.iter().find(|f| f.kind() == kind)
    }

    pub fn text(&self) -> Option<&UnitMap<String>> {
        match self.get(AspectKind::Text)? {
            Fragment::Text(outcome) => outcome.mapping(),
            _ => None,
        }
    }

    pub fn images(&self) -> Option<&UnitMap<Vec<ImageContent>>> {
        match self.get(AspectKind::Image)? {
            Fragment::Image(outcome) => outcome.mapping(),
            _ => None,
        }
    }

    pub fn images_mut(&mut self) -> Option<&mut UnitMap<Vec<ImageContent>>> {
        self.fragments.iter_mut().find_map(|f| match f {
            Fragment::Image(AspectOutcome::Extracted(map)) => Some(map),
            _ => None,
        })
    }

    pub fn links(&self) -> Option<&UnitMap<Vec<Link>>> {
        match self.get(AspectKind::Link)? {
            Fragment::Link(outcome) => outcome.mapping(),
            _ => None,
        }
    }

    pub fn to_envelope(&self) -> serde_json::Result<serde_json::Value> {
        Ok(serde_json::json!({ "data": serde_json::to_value(self)? }))
    }
}

impl Serialize for DataObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fragments.len()))?;
        for fragment in &self.fragments {
            fragment.serialize_value(&mut map)?;
        }
        map.end()
    }
}

// ===== OUTPUT TYPES =====

/// The `data` value of a result. Its shape depends on the requested mode and
/// is not tagged in the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResultData {
    Full(DataObject),
    Simplified(UnitMap<String>),
    Collapsed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub file_type: FileFormat,
    pub data: ResultData,
}

impl ExtractionResult {
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
