//! End-to-end pipeline tests.
//!
//! Documents are built in memory (zip containers for DOCX/PPTX, lopdf for
//! PDF) and run through `Pipeline` with a stub OCR engine, so neither
//! fixture files nor a Tesseract install are needed.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use unitext_core::*;

// ============================================================================
// Fixture helpers
// ============================================================================

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDRfake-picture";
const JPEG_BYTES: &[u8] = b"\xff\xd8\xff\xe0\0\x10JFIFfake-photo";

/// OCR stand-in that reads every image as the same text and counts calls.
#[derive(Clone, Default)]
struct StubOcr {
    text: &'static str,
    calls: Arc<AtomicUsize>,
}

impl StubOcr {
    fn reading(text: &'static str) -> Self {
        Self {
            text,
            calls: Arc::default(),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrEngine for StubOcr {
    fn recognize(&self, _image: &[u8]) -> Result<String, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.to_string())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

struct BrokenOcr;

impl OcrEngine for BrokenOcr {
    fn recognize(&self, _image: &[u8]) -> Result<String, OcrError> {
        Err(OcrError::Engine("engine crashed".into()))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

fn pipeline_with(ocr: impl OcrEngine + 'static) -> Pipeline {
    Pipeline::new(ExtractionConfig::default(), Box::new(ocr))
}

fn zip_package(parts: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, bytes) in parts {
        zip.start_file(*name, zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn rels(entries: &[(&str, &str)]) -> String {
    let body: String = entries
        .iter()
        .map(|(id, target)| {
            format!(
                r#"<Relationship Id="{id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="{target}"/>"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{body}</Relationships>"#
    )
}

fn docx_fixture() -> Vec<u8> {
    let document = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
            xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
            xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <w:body>
    <w:p><w:r><w:t>Quarterly report</w:t></w:r></w:p>
    <w:p/>
    <w:p><w:r><w:t>See figure</w:t></w:r><w:r><w:drawing><a:graphic><a:graphicData>
      <a:blip r:embed="rId7"/></a:graphicData></a:graphic></w:drawing></w:r></w:p>
    <w:sectPr/>
  </w:body>
</w:document>"#;
    let relationships = rels(&[("rId7", "media/image1.png")]);
    zip_package(&[
        ("word/document.xml", document.as_bytes()),
        ("word/_rels/document.xml.rels", relationships.as_bytes()),
        ("word/media/image1.png", PNG_BYTES),
    ])
}

fn slide(tree: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
       xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
       xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree><p:nvGrpSpPr/><p:grpSpPr/>{tree}</p:spTree></p:cSld>
</p:sld>"#
    )
}

/// Two slides; the presentation lists `intro.xml` before `chart.xml`, and
/// the second slide holds a single picture.
fn pptx_fixture() -> Vec<u8> {
    let presentation = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
                xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <p:sldIdLst><p:sldId id="256" r:id="rId9"/><p:sldId id="257" r:id="rId2"/></p:sldIdLst>
</p:presentation>"#;
    let presentation_rels = rels(&[("rId2", "slides/chart.xml"), ("rId9", "slides/intro.xml")]);
    let intro = slide(
        r#"<p:sp><p:txBody><a:p><a:r><a:t>Welcome</a:t></a:r></a:p>
           <a:p><a:r><a:t>Agenda</a:t></a:r></a:p></p:txBody></p:sp>"#,
    );
    let chart = slide(r#"<p:pic><p:blipFill><a:blip r:embed="rId1"/></p:blipFill></p:pic>"#);
    let chart_rels = rels(&[("rId1", "../media/image1.png")]);
    zip_package(&[
        ("ppt/presentation.xml", presentation.as_bytes()),
        ("ppt/_rels/presentation.xml.rels", presentation_rels.as_bytes()),
        ("ppt/slides/intro.xml", intro.as_bytes()),
        ("ppt/slides/chart.xml", chart.as_bytes()),
        ("ppt/slides/_rels/chart.xml.rels", chart_rels.as_bytes()),
        ("ppt/media/image1.png", PNG_BYTES),
    ])
}

fn courier(doc: &mut Document) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    })
}

fn jpeg_xobject(doc: &mut Document, color_space: Object) -> ObjectId {
    doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1,
            "Height" => 1,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        JPEG_BYTES.to_vec(),
    ))
}

/// Content stream drawing `text` at (100, 600) in font `F1`.
fn text_content(doc: &mut Document, text: &str) -> ObjectId {
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![100.into(), 600.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()))
}

/// URI link annotation over the area `text_content` draws into.
fn uri_annotation(doc: &mut Document, uri: &str) -> Object {
    let annotation_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => vec![90.into(), 590.into(), 300.into(), 640.into()],
        "A" => dictionary! {
            "S" => "URI",
            "URI" => Object::string_literal(uri),
        },
    });
    vec![Object::Reference(annotation_id)].into()
}

/// Write the page tree node and catalog, then serialize.
fn finish_pdf(
    mut doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    tree_resources: Option<lopdf::Dictionary>,
) -> Vec<u8> {
    let mut pages = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    if let Some(resources) = tree_resources {
        pages.set("Resources", resources);
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// One-page PDF showing "Hello", optionally with a JPEG image resource and a
/// URI link annotation over the text.
fn pdf_fixture(with_image: bool, with_link: bool) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = courier(&mut doc);

    let mut resources = dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    };
    if with_image {
        let image_id = jpeg_xobject(&mut doc, "DeviceRGB".into());
        resources.set("XObject", dictionary! { "Im1" => image_id });
    }

    let content_id = text_content(&mut doc, "Hello");
    let mut page = dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources,
    };
    if with_link {
        page.set("Annots", uri_annotation(&mut doc, "https://example.com/hello"));
    }
    let page_id = doc.add_object(page);
    finish_pdf(doc, pages_id, vec![page_id], None)
}

/// Three pages: "First" with an image and a link, a blank middle page, and
/// "Last" with a link.
fn three_page_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = courier(&mut doc);
    let image_id = jpeg_xobject(&mut doc, "DeviceRGB".into());

    let first_content = text_content(&mut doc, "First");
    let first_link = uri_annotation(&mut doc, "https://example.com/first");
    let first = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => first_content,
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
            "XObject" => dictionary! { "Im1" => image_id },
        },
        "Annots" => first_link,
    });
    let blank = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Resources" => dictionary! {},
    });
    let last_content = text_content(&mut doc, "Last");
    let last_link = uri_annotation(&mut doc, "https://example.com/last");
    let last = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => last_content,
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        "Annots" => last_link,
    });
    finish_pdf(doc, pages_id, vec![first, blank, last], None)
}

/// One-page "Hello" PDF whose page has no `/Resources` of its own; font and
/// image come from the page tree node.
fn pdf_with_inherited_resources() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = courier(&mut doc);
    let image_id = jpeg_xobject(&mut doc, "DeviceRGB".into());
    let content_id = text_content(&mut doc, "Hello");
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let inherited = dictionary! {
        "Font" => dictionary! { "F1" => font_id },
        "XObject" => dictionary! { "Im1" => image_id },
    };
    finish_pdf(doc, pages_id, vec![page_id], Some(inherited))
}

/// One-page "Hello" PDF whose image declares `/ColorSpace []`.
fn pdf_with_empty_color_space() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = courier(&mut doc);
    let image_id = jpeg_xobject(&mut doc, Object::Array(vec![]));
    let content_id = text_content(&mut doc, "Hello");
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
            "XObject" => dictionary! { "Im1" => image_id },
        },
    });
    finish_pdf(doc, pages_id, vec![page_id], None)
}

fn data_json(result: &ExtractionResult) -> Value {
    result.to_json().unwrap()["data"].clone()
}

/// Aspect names in the order they were serialized.
fn aspect_order(result: &ExtractionResult) -> Vec<&'static str> {
    let serialized = serde_json::to_string(&result.data).unwrap();
    let mut found: Vec<(usize, &'static str)> = ["image", "text", "link"]
        .into_iter()
        .filter_map(|aspect| {
            serialized
                .find(&format!("\"{aspect}\":"))
                .map(|at| (at, aspect))
        })
        .collect();
    found.sort();
    found.into_iter().map(|(_, aspect)| aspect).collect()
}

// ============================================================================
// Orchestration boundary
// ============================================================================

mod orchestration {
    use super::*;

    #[test]
    fn txt_simplified_envelope() {
        let result = pipeline_with(StubOcr::reading("x"))
            .extract_information("TXT", &STANDARD.encode(b"abc"), ExtractionMode::simplified())
            .unwrap();
        assert_eq!(
            result.to_json().unwrap(),
            json!({"file_type": "TXT", "data": {"1": "abc"}})
        );
    }

    #[test]
    fn format_tag_is_case_insensitive_and_canonicalized() {
        let result = pipeline_with(StubOcr::default())
            .extract_information("txt", &STANDARD.encode(b"abc"), ExtractionMode::simplified())
            .unwrap();
        assert_eq!(result.to_json().unwrap()["file_type"], "TXT");
    }

    #[test]
    fn unsupported_tag_invokes_nothing() {
        let ocr = StubOcr::reading("never");
        let pipeline = pipeline_with(ocr.clone());
        let payload = STANDARD.encode(pptx_fixture());
        let err = pipeline
            .extract_information("RTF", &payload, ExtractionMode::simplified())
            .unwrap_err();
        assert!(matches!(err, ExtractorError::UnsupportedFormat(ref tag) if tag == "RTF"));
        assert_eq!(err.to_string(), "Unsupported file type: RTF");
        assert_eq!(ocr.calls(), 0);
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let err = pipeline_with(StubOcr::default())
            .extract_information("TXT", "not base64!", ExtractionMode::simplified())
            .unwrap_err();
        assert!(matches!(err, ExtractorError::InvalidPayload(_)));
    }

    #[test]
    fn collapse_is_ignored_with_full_representation() {
        let mode = ExtractionMode {
            return_representation: true,
            collapse: true,
        };
        let result = pipeline_with(StubOcr::default())
            .extract(FileFormat::Txt, b"abc", mode)
            .unwrap();
        assert_eq!(data_json(&result), json!({"text": {"1": "abc"}}));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let pipeline = pipeline_with(StubOcr::reading("CAT"));
        let document = pptx_fixture();
        let first = pipeline
            .extract(FileFormat::Pptx, &document, ExtractionMode::collapsed())
            .unwrap();
        let second = pipeline
            .extract(FileFormat::Pptx, &document, ExtractionMode::collapsed())
            .unwrap();
        assert_eq!(first, second);
    }
}

// ============================================================================
// PDF
// ============================================================================

mod pdf {
    use super::*;

    #[test]
    fn single_page_text_only() {
        let result = pipeline_with(StubOcr::reading("unused"))
            .extract(FileFormat::Pdf, &pdf_fixture(false, false), ExtractionMode::simplified())
            .unwrap();
        assert_eq!(data_json(&result), json!({"1": "Hello"}));
    }

    #[test]
    fn full_representation_has_image_text_link_in_order() {
        let result = pipeline_with(StubOcr::reading("unused"))
            .extract(FileFormat::Pdf, &pdf_fixture(true, true), ExtractionMode::full())
            .unwrap();
        assert_eq!(aspect_order(&result), vec!["image", "text", "link"]);
        let data = data_json(&result);

        assert_eq!(data["image"]["1"], json!([STANDARD.encode(JPEG_BYTES)]));
        assert_eq!(data["text"]["1"].as_str().unwrap().trim(), "Hello");
        assert_eq!(data["link"]["1"], json!([["Hello", "https://example.com/hello"]]));
    }

    #[test]
    fn verbose_images_are_base64_of_original_bytes() {
        let result = pipeline_with(StubOcr::reading("unused"))
            .extract(FileFormat::Pdf, &pdf_fixture(true, false), ExtractionMode::full())
            .unwrap();
        let encoded = data_json(&result)["image"]["1"][0]
            .as_str()
            .unwrap()
            .to_string();
        assert_eq!(STANDARD.decode(encoded).unwrap(), JPEG_BYTES);
    }

    #[test]
    fn simplified_ocrs_embedded_images_first() {
        let ocr = StubOcr::reading("CAT");
        let result = pipeline_with(ocr.clone())
            .extract(FileFormat::Pdf, &pdf_fixture(true, true), ExtractionMode::simplified())
            .unwrap();
        assert_eq!(data_json(&result), json!({"1": "CAT Hello"}));
        assert_eq!(ocr.calls(), 1);
    }

    #[test]
    fn embedded_ocr_can_be_disabled() {
        let mut config = ExtractionConfig::default();
        config.ocr.recognize_embedded_images = false;
        let ocr = StubOcr::reading("CAT");
        let pipeline = Pipeline::new(config, Box::new(ocr.clone()));
        let result = pipeline
            .extract(FileFormat::Pdf, &pdf_fixture(true, false), ExtractionMode::simplified())
            .unwrap();
        assert_eq!(data_json(&result), json!({"1": "Hello"}));
        assert_eq!(ocr.calls(), 0);
    }

    #[test]
    fn links_can_be_switched_off() {
        let mut config = ExtractionConfig::default();
        config.pdf.include_links = false;
        let pipeline = Pipeline::new(config, Box::new(NoopOcr));
        let result = pipeline
            .extract(FileFormat::Pdf, &pdf_fixture(false, true), ExtractionMode::full())
            .unwrap();
        assert_eq!(aspect_order(&result), vec!["image", "text"]);
    }

    #[test]
    fn corrupt_pdf_fails_every_aspect_softly() {
        let result = pipeline_with(NoopOcr)
            .extract(FileFormat::Pdf, b"%PDF-1.4 garbage", ExtractionMode::full())
            .unwrap();
        let data = data_json(&result);
        for aspect in ["image", "text", "link"] {
            let value = data[aspect].as_str().unwrap();
            assert!(value.starts_with("An error occurred: "), "{aspect}: {value}");
        }

        let simplified = pipeline_with(NoopOcr)
            .extract(FileFormat::Pdf, b"%PDF-1.4 garbage", ExtractionMode::simplified())
            .unwrap();
        assert_eq!(data_json(&simplified), json!({}));
    }

    #[test]
    fn pages_are_dense_ordinals() {
        let result = pipeline_with(StubOcr::reading("unused"))
            .extract(FileFormat::Pdf, &three_page_pdf(), ExtractionMode::full())
            .unwrap();
        let data = data_json(&result);

        assert_eq!(
            data["image"],
            json!({"1": [STANDARD.encode(JPEG_BYTES)], "2": [], "3": []})
        );
        assert_eq!(
            data["link"],
            json!({
                "1": [["First", "https://example.com/first"]],
                "2": [],
                "3": [["Last", "https://example.com/last"]],
            })
        );
        let text = data["text"].as_object().unwrap();
        let pages: Vec<&str> = text.keys().map(String::as_str).collect();
        assert_eq!(pages, vec!["1", "2", "3"]);
        assert_eq!(text["1"].as_str().unwrap().trim(), "First");
        assert_eq!(text["2"], json!(""));
        assert_eq!(text["3"].as_str().unwrap().trim(), "Last");
    }

    #[test]
    fn blank_middle_page_keeps_its_slot_when_simplified() {
        let result = pipeline_with(StubOcr::reading("CAT"))
            .extract(FileFormat::Pdf, &three_page_pdf(), ExtractionMode::simplified())
            .unwrap();
        assert_eq!(
            data_json(&result),
            json!({"1": "CAT First", "2": "", "3": "Last"})
        );
    }

    #[test]
    fn images_from_inherited_resources() {
        let result = pipeline_with(StubOcr::reading("unused"))
            .extract(
                FileFormat::Pdf,
                &pdf_with_inherited_resources(),
                ExtractionMode::full(),
            )
            .unwrap();
        let data = data_json(&result);
        assert_eq!(data["image"]["1"], json!([STANDARD.encode(JPEG_BYTES)]));
        assert_eq!(data["text"]["1"].as_str().unwrap().trim(), "Hello");
    }

    #[test]
    fn empty_color_space_array_does_not_abort_the_request() {
        let result = pipeline_with(StubOcr::reading("unused"))
            .extract(
                FileFormat::Pdf,
                &pdf_with_empty_color_space(),
                ExtractionMode::full(),
            )
            .unwrap();
        let data = data_json(&result);
        assert_eq!(data["image"]["1"], json!([STANDARD.encode(JPEG_BYTES)]));
        assert_eq!(data["text"]["1"].as_str().unwrap().trim(), "Hello");
    }
}

// ============================================================================
// DOCX
// ============================================================================

mod docx {
    use super::*;

    #[test]
    fn paragraphs_are_dense_units() {
        let result = pipeline_with(NoopOcr)
            .extract(FileFormat::Docx, &docx_fixture(), ExtractionMode::full())
            .unwrap();
        assert_eq!(aspect_order(&result), vec!["text", "image"]);
        let data = data_json(&result);
        assert_eq!(
            data["text"],
            json!({"1": "Quarterly report", "2": "", "3": "See figure"})
        );
        assert_eq!(
            data["image"],
            json!({"1": [], "2": [], "3": [STANDARD.encode(PNG_BYTES)]})
        );
    }

    #[test]
    fn simplified_puts_image_text_before_paragraph_text() {
        let result = pipeline_with(StubOcr::reading("chart"))
            .extract(FileFormat::Docx, &docx_fixture(), ExtractionMode::simplified())
            .unwrap();
        assert_eq!(
            data_json(&result),
            json!({"1": "Quarterly report", "2": "", "3": "chart See figure"})
        );
    }

    #[test]
    fn missing_media_is_skipped() {
        let document = r#"<w:document xmlns:w="w" xmlns:a="a" xmlns:r="r"><w:body>
            <w:p><w:r><w:drawing><a:graphic><a:blip r:embed="rId1"/></a:graphic></w:drawing></w:r></w:p>
            </w:body></w:document>"#;
        let relationships = rels(&[("rId1", "media/gone.png")]);
        let package = zip_package(&[
            ("word/document.xml", document.as_bytes()),
            ("word/_rels/document.xml.rels", relationships.as_bytes()),
        ]);
        let result = pipeline_with(NoopOcr)
            .extract(FileFormat::Docx, &package, ExtractionMode::full())
            .unwrap();
        assert_eq!(data_json(&result)["image"], json!({"1": []}));
    }
}

// ============================================================================
// PPTX
// ============================================================================

mod pptx {
    use super::*;

    #[test]
    fn slides_follow_presentation_order() {
        let result = pipeline_with(StubOcr::reading("CAT"))
            .extract(FileFormat::Pptx, &pptx_fixture(), ExtractionMode::simplified())
            .unwrap();
        assert_eq!(data_json(&result), json!({"1": "Welcome\nAgenda", "2": "CAT"}));
    }

    #[test]
    fn full_representation_holds_ocr_text_not_blobs() {
        let ocr = StubOcr::reading("CAT");
        let result = pipeline_with(ocr.clone())
            .extract(FileFormat::Pptx, &pptx_fixture(), ExtractionMode::full())
            .unwrap();
        assert_eq!(
            data_json(&result),
            json!({
                "text": {"1": "Welcome\nAgenda", "2": ""},
                "image": {"1": [], "2": ["CAT"]},
            })
        );
        assert_eq!(ocr.calls(), 1);
    }

    #[test]
    fn ocr_failure_is_inline_for_that_picture() {
        let result = pipeline_with(BrokenOcr)
            .extract(FileFormat::Pptx, &pptx_fixture(), ExtractionMode::full())
            .unwrap();
        let entry = data_json(&result)["image"]["2"][0]
            .as_str()
            .unwrap()
            .to_string();
        assert!(entry.starts_with("An error occurred while performing OCR: "));
        assert!(entry.contains("engine crashed"));
    }

    #[test]
    fn collapsed_output() {
        let result = pipeline_with(StubOcr::reading("CAT"))
            .extract(FileFormat::Pptx, &pptx_fixture(), ExtractionMode::collapsed())
            .unwrap();
        assert_eq!(data_json(&result), json!("Welcome\nAgenda CAT"));
    }
}

// ============================================================================
// Collapse ordering
// ============================================================================

mod collapse_order {
    use super::*;
    use unitext_core::simplify::collapse;

    #[test]
    fn numeric_not_lexicographic() {
        let units: UnitMap<String> = [(1, "a"), (10, "b"), (2, "c")]
            .into_iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect();
        assert_eq!(
            collapse(ResultData::Simplified(units)).unwrap(),
            ResultData::Collapsed("a c b".to_string())
        );
    }

    #[test]
    fn segments_match_simplified_values() {
        let pipeline = pipeline_with(StubOcr::reading("CAT"));
        let document = docx_fixture();
        let simplified = pipeline
            .extract(FileFormat::Docx, &document, ExtractionMode::simplified())
            .unwrap();
        let collapsed = pipeline
            .extract(FileFormat::Docx, &document, ExtractionMode::collapsed())
            .unwrap();
        let ResultData::Simplified(units) = simplified.data else {
            panic!("expected simplified data");
        };
        let expected = units.values().cloned().collect::<Vec<_>>().join(" ");
        assert_eq!(collapsed.data, ResultData::Collapsed(expected));
    }
}
