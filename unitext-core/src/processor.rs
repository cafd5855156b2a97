use crate::config::ExtractionConfig;
use crate::error::{ExtractorError, Result};
use crate::extractors::{ExtractorRegistry, FormatExtractor};
use crate::ocr::{engine_from_config, recognize_or_diagnostic, OcrEngine};
use crate::shape::{compose, image_fragment, link_fragment, text_fragment};
use crate::simplify::{collapse, simplify};
use crate::types::*;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, info};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    request_id: Uuid,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool, request_id: Uuid) -> Self {
        Self {
            enabled,
            request_id,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        info!("[{}] {}: {}ms", self.request_id, step_name, elapsed.as_millis());

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn log_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();
        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            info!(
                "[{}]    {:.<30} {}ms ({:.1}%)",
                self.request_id,
                step,
                duration.as_millis(),
                percentage
            );
        }
        info!("[{}]    {:.<30} {}ms", self.request_id, "Total", total.as_millis());
    }
}

/// Extraction pipeline: registry lookup, aspect extraction, composition and
/// the requested output shaping.
pub struct Pipeline {
    config: ExtractionConfig,
    registry: ExtractorRegistry,
    ocr: Box<dyn OcrEngine>,
}

impl Pipeline {
    /// Create a pipeline with an explicit OCR engine
    pub fn new(config: ExtractionConfig, ocr: Box<dyn OcrEngine>) -> Self {
        Self {
            registry: ExtractorRegistry::from_config(&config),
            config,
            ocr,
        }
    }

    /// Create a pipeline with the OCR engine described by the config
    pub fn from_config(config: ExtractionConfig) -> Self {
        let ocr = engine_from_config(&config.ocr);
        Self::new(config, ocr)
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Transport entry point: base64 payload plus a format tag.
    pub fn extract_information(
        &self,
        file_type: &str,
        payload: &str,
        mode: ExtractionMode,
    ) -> Result<ExtractionResult> {
        let document = decode_payload(payload)?;
        let format: FileFormat = file_type.parse()?;
        self.extract(format, &document, mode)
    }

    /// Extract a document already in memory.
    pub fn extract(
        &self,
        format: FileFormat,
        document: &[u8],
        mode: ExtractionMode,
    ) -> Result<ExtractionResult> {
        let request_id = Uuid::new_v4();
        let mut profiler = StepProfiler::new(self.config.pipeline.profile, request_id);
        let extractor = self
            .registry
            .get(format)
            .ok_or_else(|| ExtractorError::UnsupportedFormat(format.to_string()))?;

        info!(
            "[{request_id}] {} document ({} bytes) via {}",
            format,
            document.len(),
            extractor.name()
        );

        let fragments: Vec<Fragment> = extractor
            .aspects()
            .iter()
            .map(|aspect| {
                profiler.time_step(&format!("{aspect} extraction"), || {
                    self.extract_aspect(extractor, *aspect, document)
                })
            })
            .collect();
        let mut data = compose(fragments)?;

        let result = if mode.return_representation {
            if mode.collapse {
                log::warn!("[{request_id}] collapse ignored for the full representation");
            }
            ResultData::Full(data)
        } else {
            if self.config.ocr.recognize_embedded_images {
                profiler.time_step("embedded image OCR", || self.recognize_blobs(&mut data));
            }
            let simplified = profiler.time_step("simplify", || simplify(&data));
            if mode.collapse {
                collapse(ResultData::Simplified(simplified))?
            } else {
                ResultData::Simplified(simplified)
            }
        };

        profiler.log_summary();
        debug!("[{request_id}] done");
        Ok(ExtractionResult {
            file_type: format,
            data: result,
        })
    }

    fn extract_aspect(
        &self,
        extractor: &dyn FormatExtractor,
        aspect: AspectKind,
        document: &[u8],
    ) -> Fragment {
        match aspect {
            AspectKind::Text => text_fragment(extractor.extract_text(document)),
            AspectKind::Image => {
                image_fragment(extractor.extract_images(document, self.ocr.as_ref()))
            }
            AspectKind::Link => link_fragment(extractor.extract_links(document)),
        }
    }

    /// Replace image blobs with their recognized text.
    fn recognize_blobs(&self, data: &mut DataObject) {
        let Some(images) = data.images_mut() else {
            return;
        };
        let mut recognized = 0usize;
        for entry in images.values_mut().flatten() {
            if let ImageContent::Blob(bytes) = entry {
                *entry = ImageContent::Recognized(recognize_or_diagnostic(self.ocr.as_ref(), bytes));
                recognized += 1;
            }
        }
        debug!("OCR'd {recognized} embedded images with {}", self.ocr.name());
    }
}

/// Decode a standard-alphabet base64 payload. Surrounding whitespace and
/// line breaks (as produced by `base64 -w76`) are ignored.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ExtractorError::InvalidPayload(e.to_string()))
}
