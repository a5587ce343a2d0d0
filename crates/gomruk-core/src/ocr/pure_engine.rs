//! Recognition worker backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).

use std::path::{Path, PathBuf};
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use super::{AssetLocation, RecognitionWorker, RecognizedText, TextBox, WorkerFactory};
use crate::error::OcrError;
use crate::models::config::{GomrukConfig, ModelConfig};

/// OCR engine holding one loaded detection/recognition model pair.
pub struct PureOcrEngine {
    engine: Option<pure_onnx_ocr::engine::OcrEngine>,
    keep_unk: bool,
}

impl PureOcrEngine {
    /// Create an engine from explicit model files.
    pub fn from_paths(det_path: &Path, rec_path: &Path, dict_path: &Path, keep_unk: bool) -> Result<Self, OcrError> {
        for path in [det_path, rec_path, dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file {} (run `gomruk models download`)",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(det_path)
            .rec_model_path(rec_path)
            .dictionary_path(dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine ({})", rec_path.display());

        Ok(Self {
            engine: Some(engine),
            keep_unk,
        })
    }
}

impl RecognitionWorker for PureOcrEngine {
    /// `run_from_image` has no mid-run hook, so progress is reported per
    /// text region once the engine returns, not while it runs.
    fn recognize(
        &mut self,
        raster: &DynamicImage,
        progress: &mut dyn FnMut(f32),
    ) -> Result<RecognizedText, OcrError> {
        let engine = self.engine.as_ref().ok_or(OcrError::Terminated)?;
        let start = Instant::now();
        let (width, height) = raster.dimensions();

        debug!("Recognizing raster {}x{}", width, height);

        let results = engine
            .run_from_image(raster)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let total = results.len().max(1) as f32;
        let mut boxes = Vec::with_capacity(results.len());
        for (i, r) in results.iter().enumerate() {
            let text = if self.keep_unk {
                r.text.clone()
            } else {
                r.text.replace("[UNK]", " ")
            };
            boxes.push(TextBox {
                bbox: polygon_to_bbox(&r.bounding_box),
                text,
                confidence: r.confidence,
            });
            progress((i + 1) as f32 / total);
        }

        let result = RecognizedText::from_boxes(boxes, start.elapsed().as_millis() as u64);
        debug!(
            "pure-onnx-ocr returned {} text regions in {}ms",
            result.boxes.len(),
            result.processing_time_ms
        );

        Ok(result)
    }

    fn terminate(&mut self) {
        self.engine = None;
    }
}

/// Builds [`PureOcrEngine`] workers from a local model bundle.
#[derive(Debug, Clone)]
pub struct PureOcrFactory {
    models: ModelConfig,
    keep_unk: bool,
}

impl PureOcrFactory {
    /// Create a factory from the model and OCR settings of a configuration.
    pub fn new(config: &GomrukConfig) -> Self {
        Self {
            models: config.models.clone(),
            keep_unk: config.ocr.keep_unk,
        }
    }

    fn model_files(&self, dir: &Path, alphabet: &str) -> (PathBuf, PathBuf, PathBuf) {
        (
            dir.join(&self.models.detection_model),
            dir.join(self.models.recognition_model(alphabet)),
            dir.join(self.models.dictionary(alphabet)),
        )
    }
}

impl WorkerFactory for PureOcrFactory {
    type Worker = PureOcrEngine;

    fn create(&self, alphabet: &str, assets: &AssetLocation) -> Result<PureOcrEngine, OcrError> {
        match assets {
            AssetLocation::Local(dir) => {
                let (det, rec, dict) = self.model_files(dir, alphabet);
                PureOcrEngine::from_paths(&det, &rec, &dict, self.keep_unk)
            }
            AssetLocation::Remote(url) => Err(OcrError::ModelLoad(format!(
                "models must be available locally; fetch them from {} with `gomruk models download`",
                url
            ))),
        }
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}
