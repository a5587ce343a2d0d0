//! Configuration structures for the extraction and fill pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ocr::AssetLocation;

/// Main configuration for the gomruk pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GomrukConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Text extraction configuration.
    pub extraction: ExtractionConfig,

    /// Model asset configuration.
    pub models: ModelConfig,

    /// Form fill configuration.
    pub fill: FillConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to process. Pages beyond the cap are ignored.
    pub max_pages: u32,

    /// Magnification applied when rendering a page to a raster.
    pub render_scale: f32,

    /// Pages whose trimmed native text is shorter than this are image-only.
    pub min_page_chars: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            render_scale: 2.0,
            min_page_chars: 30,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Run recognition on image-only pages.
    pub enabled: bool,

    /// Alphabet identifier the worker is initialized with.
    pub alphabet: String,

    /// Maximum image dimension (longer side) fed to the engine.
    pub max_image_size: u32,

    /// Keep `[UNK]` tokens produced by the recognizer.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            alphabet: "latin".to_string(),
            max_image_size: 2048,
            keep_unk: false,
        }
    }
}

/// Document-level extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum trimmed length of the merged text for a run to succeed.
    pub min_text_length: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { min_text_length: 20 }
    }
}

/// Model file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Network location models are downloaded from.
    pub base_url: String,

    /// Text detection model file name.
    pub detection_model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            base_url: "https://github.com/example/gomruk/raw/main/models".to_string(),
            detection_model: "det.onnx".to_string(),
        }
    }
}

impl ModelConfig {
    /// Recognition model file name for an alphabet.
    pub fn recognition_model(&self, alphabet: &str) -> String {
        format!("{alphabet}_rec.onnx")
    }

    /// Character dictionary file name for an alphabet.
    pub fn dictionary(&self, alphabet: &str) -> String {
        format!("{alphabet}_dict.txt")
    }

    /// Local asset location for the recognizer.
    pub fn asset_location(&self) -> AssetLocation {
        AssetLocation::Local(self.model_dir.clone())
    }
}

/// Form fill configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    /// How long a filled element stays highlighted.
    pub highlight_ms: u64,

    /// CSS border applied while highlighted.
    pub highlight_border: String,

    /// CSS background applied while highlighted.
    pub highlight_background: String,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            highlight_ms: 3000,
            highlight_border: "3px solid #28a745".to_string(),
            highlight_background: "#d4edda".to_string(),
        }
    }
}

impl GomrukConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "pdf": { "max_pages": 5 } }"#).unwrap();

        let config = GomrukConfig::from_file(&path).unwrap();
        assert_eq!(config.pdf.max_pages, 5);
        assert_eq!(config.pdf.min_page_chars, 30);
        assert_eq!(config.extraction.min_text_length, 20);
        assert_eq!(config.ocr.alphabet, "latin");
    }

    #[test]
    fn test_model_file_names() {
        let models = ModelConfig::default();
        assert_eq!(models.recognition_model("latin"), "latin_rec.onnx");
        assert_eq!(models.dictionary("latin"), "latin_dict.txt");
    }
}
