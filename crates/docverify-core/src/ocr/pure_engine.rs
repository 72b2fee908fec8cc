//! Native OCR engine backed by `pure-onnx-ocr`.

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{ModelPaths, OcrConfig};

use super::{OcrEngine, RawOcrResult, RawPage};

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
///
/// Results are emitted in the legacy geometric shape (polygon plus
/// `[text, score]`), so they flow through the same normalizer as any other
/// engine output.
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    keep_unknown_glyphs: bool,
}

impl PureOcrEngine {
    /// Load the detection and recognition models.
    ///
    /// Missing files or a failed load are fatal: the caller should refuse to
    /// start a run without an engine.
    pub fn load(paths: &ModelPaths, config: &OcrConfig) -> Result<Self, OcrError> {
        for path in [&paths.detection, &paths.recognition, &paths.dictionary] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&paths.detection)
            .rec_model_path(&paths.recognition)
            .dictionary_path(&paths.dictionary)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!(
            "Loaded pure-onnx-ocr engine ({}, language {})",
            paths.recognition.display(),
            config.language
        );

        Ok(Self {
            engine,
            keep_unknown_glyphs: config.keep_unknown_glyphs,
        })
    }
}

impl OcrEngine for PureOcrEngine {
    fn name(&self) -> &'static str {
        "pure-onnx-ocr"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<RawOcrResult, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("{}x{}", width, height)));
        }

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let lines: Vec<Value> = results
            .iter()
            .map(|r| {
                let polygon: Vec<[f64; 2]> = r
                    .bounding_box
                    .exterior()
                    .coords()
                    .take(4)
                    .map(|c| [c.x, c.y])
                    .collect();
                let text = if self.keep_unknown_glyphs {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                json!([polygon, [text, r.confidence]])
            })
            .collect();

        debug!(
            "pure-onnx-ocr returned {} lines for {}x{} image in {}ms",
            lines.len(),
            width,
            height,
            start.elapsed().as_millis()
        );

        Ok(RawOcrResult::single(RawPage::Geometric(lines)))
    }
}
