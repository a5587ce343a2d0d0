//! Raster preparation before recognition.

use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::error::OcrError;

/// Image preprocessor applied to page rasters before they reach the worker.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    /// Maximum image dimension.
    max_size: u32,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self { max_size: 2048 }
    }

    /// Set maximum image dimension.
    pub fn with_max_size(mut self, size: u32) -> Self {
        self.max_size = size;
        self
    }

    /// Prepare a page raster for recognition.
    pub fn prepare(&self, image: &DynamicImage) -> Result<DynamicImage, OcrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!(
                "empty raster {}x{}",
                width, height
            )));
        }

        let (new_width, new_height) = self.calculate_resize_dimensions(width, height, self.max_size);
        let resized = if (new_width, new_height) != (width, height) {
            debug!(
                "Downscaling raster {}x{} -> {}x{}",
                width, height, new_width, new_height
            );
            image.resize_exact(new_width, new_height, image::imageops::FilterType::Lanczos3)
        } else {
            image.clone()
        };

        Ok(DynamicImage::ImageLuma8(resized.to_luma8()))
    }

    fn calculate_resize_dimensions(&self, width: u32, height: u32, target_size: u32) -> (u32, u32) {
        let max_dim = width.max(height);

        if max_dim <= target_size {
            return (width, height);
        }

        let scale = target_size as f32 / max_dim as f32;
        let new_width = (width as f32 * scale) as u32;
        let new_height = (height as f32 * scale) as u32;

        (new_width.max(1), new_height.max(1))
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_dimensions() {
        let preprocessor = ImagePreprocessor::new();

        // Image smaller than target
        let (w, h) = preprocessor.calculate_resize_dimensions(500, 300, 960);
        assert_eq!((w, h), (500, 300));

        // Image larger than target
        let (w, h) = preprocessor.calculate_resize_dimensions(1920, 1080, 960);
        assert_eq!(w, 960);
        assert!(h < 960);
    }

    #[test]
    fn test_prepare_rejects_empty_raster() {
        let preprocessor = ImagePreprocessor::new();
        let empty = DynamicImage::new_luma8(0, 0);
        assert!(matches!(preprocessor.prepare(&empty), Err(OcrError::InvalidImage(_))));
    }

    #[test]
    fn test_prepare_clamps_and_grays() {
        let preprocessor = ImagePreprocessor::new().with_max_size(100);
        let raster = DynamicImage::new_rgb8(400, 200);
        let prepared = preprocessor.prepare(&raster).unwrap();
        assert_eq!(prepared.dimensions(), (100, 50));
        assert!(matches!(prepared, DynamicImage::ImageLuma8(_)));
    }
}
