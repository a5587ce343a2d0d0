//! Optical recognition of image-only pages.
//!
//! A run owns at most one [`RecognitionWorker`], created through a
//! [`WorkerFactory`] from an alphabet id and an [`AssetLocation`], and
//! driven page by page through a [`RecognitionSession`] that guarantees the
//! worker is torn down exactly once.

mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;
mod session;

pub use preprocessing::ImagePreprocessor;
#[cfg(feature = "native")]
pub use pure_engine::{PureOcrEngine, PureOcrFactory};
pub use session::RecognitionSession;

use std::path::PathBuf;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// A detected text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Text recognized on one page raster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognizedText {
    /// Recognized text boxes in reading order.
    pub boxes: Vec<TextBox>,

    /// Full text (boxes joined with newlines).
    pub text: String,

    /// Mean recognition confidence (0.0 - 1.0).
    pub confidence: f32,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl RecognizedText {
    /// Build a result from boxes, sorting them into reading order.
    pub fn from_boxes(mut boxes: Vec<TextBox>, processing_time_ms: u64) -> Self {
        // Group by approximate vertical position (20px rows), then by x
        boxes.sort_by(|a, b| {
            let (ax, ay, _, _) = a.rect();
            let (bx, by, _, _) = b.rect();
            let row_a = (ay / 20.0) as i32;
            let row_b = (by / 20.0) as i32;
            row_a
                .cmp(&row_b)
                .then(ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal))
        });

        let text = boxes
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let confidence = if boxes.is_empty() {
            0.0
        } else {
            boxes.iter().map(|b| b.confidence).sum::<f32>() / boxes.len() as f32
        };

        Self {
            boxes,
            text,
            confidence,
            processing_time_ms,
        }
    }
}

/// Progress of recognizing one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionProgress {
    /// Page being recognized (1-indexed).
    pub page: u32,
    /// Completion percentage, monotonically increasing per page (0 - 100).
    pub percent: u8,
}

/// Where the recognizer finds its language model data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetLocation {
    /// A local directory bundle.
    Local(PathBuf),
    /// A network base URL.
    Remote(String),
}

impl std::fmt::Display for AssetLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetLocation::Local(path) => write!(f, "{}", path.display()),
            AssetLocation::Remote(url) => f.write_str(url),
        }
    }
}

/// A long-lived recognition worker holding one mutable engine context.
///
/// Workers are not reentrant: pages are recognized one at a time.
pub trait RecognitionWorker {
    /// Recognize the text on a page raster.
    ///
    /// `progress` receives completion fractions in `0.0..=1.0`.
    fn recognize(
        &mut self,
        raster: &DynamicImage,
        progress: &mut dyn FnMut(f32),
    ) -> Result<RecognizedText, OcrError>;

    /// Release the engine context. Called exactly once per worker.
    fn terminate(&mut self);
}

/// Produces ready workers from an alphabet id and a base location.
pub trait WorkerFactory {
    /// Worker type produced by this factory.
    type Worker: RecognitionWorker;

    /// Load the language data for `alphabet` from `assets` and start a worker.
    fn create(&self, alphabet: &str, assets: &AssetLocation) -> Result<Self::Worker, OcrError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_box(text: &str, x: f32, y: f32) -> TextBox {
        TextBox {
            bbox: [x, y, x + 50.0, y, x + 50.0, y + 10.0, x, y + 10.0],
            text: text.to_string(),
            confidence: 0.8,
        }
    }

    #[test]
    fn test_reading_order() {
        let boxes = vec![
            text_box("second-line", 0.0, 45.0),
            text_box("right", 200.0, 2.0),
            text_box("left", 10.0, 5.0),
        ];
        let result = RecognizedText::from_boxes(boxes, 12);
        assert_eq!(result.text, "left\nright\nsecond-line");
        assert!((result.confidence - 0.8).abs() < 1e-5);
    }
}
