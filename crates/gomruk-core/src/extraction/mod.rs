//! Hybrid native-text / OCR extraction of a whole document.
//!
//! Each page is classified on its native text layer alone. Only image-only
//! pages are rendered and sent to the recognizer, one at a time, through a
//! single [`RecognitionSession`] that is released before the run returns.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ExtractionError, GomrukError, OcrError, Result};
use crate::models::config::GomrukConfig;
use crate::normalize::TextNormalizer;
use crate::ocr::{AssetLocation, ImagePreprocessor, RecognitionProgress, RecognitionSession, WorkerFactory};
use crate::pdf::{PageSource, PdfDocument};

/// Advice returned when recognition could not recover any text.
const REMEDIATION_HINT: &str = "The PDF appears to be a scanned image and OCR could not read it. \
     Convert it to a text PDF with an online OCR tool (e.g. https://www.onlineocr.net/ or \
     https://www.ilovepdf.com/ocr_pdf), or copy the data from the PDF manually.";

/// Native text of one page and its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageTextResult {
    /// Page number (1-indexed).
    pub page_index: u32,
    /// Text layer of the page.
    pub native_text: String,
    /// The native text is too short to use; the page needs recognition.
    pub is_image_only: bool,
}

impl PageTextResult {
    /// Classify a page by the trimmed length of its native text.
    pub fn classify(page_index: u32, native_text: String, min_chars: usize) -> Self {
        let is_image_only = native_text.trim().chars().count() < min_chars;
        Self {
            page_index,
            native_text,
            is_image_only,
        }
    }
}

/// Normalized text of a whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MergedText(String);

impl MergedText {
    /// Borrow the text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for MergedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MergedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of one extraction run.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    /// Merged, normalized text.
    pub text: MergedText,
    /// Per-page classification, in page order.
    pub pages: Vec<PageTextResult>,
    /// Pages whose recognized text was merged.
    pub recognized_pages: Vec<u32>,
    /// Pages whose rendering or recognition failed.
    pub failed_pages: Vec<u32>,
    /// Image-only pages left unrecognized because OCR is disabled.
    pub skipped_pages: Vec<u32>,
    /// Non-fatal problems met during the run.
    pub warnings: Vec<String>,
}

/// Decides per page between native text and OCR and merges the results.
pub struct ExtractionOrchestrator<F: WorkerFactory> {
    factory: F,
    config: GomrukConfig,
    normalizer: TextNormalizer,
    assets: AssetLocation,
}

impl<F: WorkerFactory> ExtractionOrchestrator<F> {
    /// Create an orchestrator that starts workers through `factory`.
    pub fn new(factory: F, config: &GomrukConfig) -> Self {
        Self {
            factory,
            assets: config.models.asset_location(),
            config: config.clone(),
            normalizer: TextNormalizer::new(),
        }
    }

    /// Override where the recognizer loads its language data from.
    pub fn with_assets(mut self, assets: AssetLocation) -> Self {
        self.assets = assets;
        self
    }

    /// Load a PDF from bytes and extract its text.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<ExtractionReport> {
        let document = PdfDocument::load(data)?;
        self.extract(&document)
    }

    /// Extract the text of a document.
    pub fn extract(&self, document: &dyn PageSource) -> Result<ExtractionReport> {
        self.extract_with_progress(document, &mut |_| {})
    }

    /// Extract the text of a document, reporting OCR progress per page.
    pub fn extract_with_progress(
        &self,
        document: &dyn PageSource,
        on_progress: &mut dyn FnMut(RecognitionProgress),
    ) -> Result<ExtractionReport> {
        let page_count = document.page_count().min(self.config.pdf.max_pages);
        if document.page_count() > page_count {
            info!(
                "Document has {} pages, processing the first {}",
                document.page_count(),
                page_count
            );
        }

        let mut warnings = Vec::new();
        let pages: Vec<PageTextResult> = (1..=page_count)
            .map(|page| {
                let text = document.page_text(page).unwrap_or_else(|e| {
                    warn!("No native text for page {}: {}", page, e);
                    warnings.push(format!("page {}: {}", page, e));
                    String::new()
                });
                let result = PageTextResult::classify(page, text, self.config.pdf.min_page_chars);
                debug!(
                    "Page {}: {} native chars, image-only: {}",
                    page,
                    result.native_text.trim().chars().count(),
                    result.is_image_only
                );
                result
            })
            .collect();

        let image_only: Vec<u32> = pages
            .iter()
            .filter(|p| p.is_image_only)
            .map(|p| p.page_index)
            .collect();

        let mut recognized = Vec::new();
        let mut failed_pages = Vec::new();
        let mut skipped_pages = Vec::new();
        let mut ocr_unavailable = false;

        if !image_only.is_empty() {
            if self.config.ocr.enabled {
                info!("Recognizing {} image-only page(s): {:?}", image_only.len(), image_only);
                match self.start_session() {
                    Ok(mut session) => {
                        for &page in &image_only {
                            match self.recognize_page(&mut session, document, page, on_progress) {
                                Ok(text) => recognized.push((page, text)),
                                Err(e) => {
                                    warn!("Recognition failed for page {}: {}", page, e);
                                    warnings.push(format!("page {}: {}", page, e));
                                    failed_pages.push(page);
                                }
                            }
                        }
                        session.finish();
                    }
                    Err(e) => {
                        warn!("Could not start recognition worker: {}", e);
                        warnings.push(format!("OCR unavailable: {}", e));
                        ocr_unavailable = true;
                        failed_pages.extend(&image_only);
                    }
                }
            } else {
                info!("OCR disabled, skipping image-only pages {:?}", image_only);
                skipped_pages = image_only.clone();
            }
        }

        let raw = merge(&pages, &recognized);
        let text = self.normalizer.normalize(&raw);
        let chars = text.trim().chars().count();

        if chars < self.config.extraction.min_text_length {
            let ocr_failed_outright =
                ocr_unavailable || (!failed_pages.is_empty() && recognized.is_empty());
            return Err(GomrukError::Extraction(ExtractionError::NoExtractableText {
                chars,
                hint: ocr_failed_outright.then(|| REMEDIATION_HINT.to_string()),
            }));
        }

        info!(
            "Extracted {} chars from {} page(s) ({} recognized)",
            chars,
            pages.len(),
            recognized.len()
        );

        Ok(ExtractionReport {
            text: MergedText(text),
            pages,
            recognized_pages: recognized.iter().map(|(page, _)| *page).collect(),
            failed_pages,
            skipped_pages,
            warnings,
        })
    }

    fn start_session(&self) -> std::result::Result<RecognitionSession<F::Worker>, OcrError> {
        let preprocessor = ImagePreprocessor::new().with_max_size(self.config.ocr.max_image_size);
        RecognitionSession::start(&self.factory, &self.config.ocr.alphabet, &self.assets)
            .map(|session| session.with_preprocessor(preprocessor))
    }

    fn recognize_page(
        &self,
        session: &mut RecognitionSession<F::Worker>,
        document: &dyn PageSource,
        page: u32,
        on_progress: &mut dyn FnMut(RecognitionProgress),
    ) -> Result<String> {
        let raster = document.render_page(page, self.config.pdf.render_scale)?;
        let recognized = session.recognize_page(page, &raster, on_progress)?;
        Ok(recognized.text)
    }
}

/// Every page's native text in page order, then one marked block per
/// recognized page. Short text layers of image-only pages are kept.
fn merge(pages: &[PageTextResult], recognized: &[(u32, String)]) -> String {
    let mut blocks: Vec<String> = pages
        .iter()
        .map(|p| p.native_text.trim())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect();

    blocks.extend(
        recognized
            .iter()
            .map(|(page, text)| format!("--- OCR page {} ---\n{}", page, text.trim())),
    );

    blocks.join("\n\n")
}
