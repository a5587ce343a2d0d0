//! Error types for the gomruk-core library.

use thiserror::Error;

/// Main error type for the gomruk library.
#[derive(Error, Debug)]
pub enum GomrukError {
    /// PDF loading or rendering error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR worker error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Document-level extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to produce a raster for a page.
    #[error("failed to render page: {0}")]
    Render(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors raised by the recognition worker.
///
/// These are recoverable at the orchestrator level: a failing page never
/// aborts its siblings.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load the recognition models for an alphabet.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Recognition of a page raster failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The worker was used after it had been torn down.
    #[error("recognition worker already terminated")]
    Terminated,
}

/// Errors that are fatal to an extraction run.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Too little usable text survived every extraction stage.
    #[error("no extractable text ({chars} characters after all stages)")]
    NoExtractableText {
        /// Trimmed length of the merged text.
        chars: usize,
        /// Remediation advice, present when OCR itself failed outright.
        hint: Option<String>,
    },
}

impl ExtractionError {
    /// Remediation advice for the caller, if any.
    pub fn hint(&self) -> Option<&str> {
        match self {
            ExtractionError::NoExtractableText { hint, .. } => hint.as_deref(),
        }
    }
}

/// Result type for the gomruk library.
pub type Result<T> = std::result::Result<T, GomrukError>;
