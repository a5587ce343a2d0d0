//! PDF processing module.

mod extractor;

pub use extractor::PdfDocument;

use crate::error::PdfError;
use image::DynamicImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A paged document that yields native text and page rasters.
///
/// Pages are 1-indexed. Rendering must not mutate the document, so a page
/// can be rendered any number of times with the same result.
pub trait PageSource {
    /// Get the number of pages in the document.
    fn page_count(&self) -> u32;

    /// Native text layer of a page, without any image analysis.
    fn page_text(&self, page: u32) -> Result<String>;

    /// Render a page to a raster at the given magnification.
    fn render_page(&self, page: u32, scale: f32) -> Result<DynamicImage>;
}
