//! Core library for customs declaration autofill.
//!
//! This crate provides:
//! - PDF processing (per-page native text and page rasters)
//! - OCR of image-only pages through a single scoped recognition worker
//! - Correction of systematic OCR misreads for the Azerbaijani Latin alphabet
//! - Rule-based extraction of company and identity fields
//! - Site profiles and a form filler that writes those fields into foreign markup

pub mod error;
pub mod extraction;
pub mod fields;
pub mod fill;
pub mod models;
pub mod normalize;
pub mod ocr;
pub mod pdf;

pub use error::{ExtractionError, GomrukError, OcrError, PdfError, Result};
pub use extraction::{ExtractionOrchestrator, ExtractionReport, MergedText, PageTextResult};
pub use fields::{FieldParser, ParseReport, RuleBasedFieldParser};
pub use fill::{
    Dom, FillOutcome, FillReport, FillStatus, FrameSummary, MarkupTree, NodeId, SiteProfile,
    fill_target, resolve,
};
pub use models::config::GomrukConfig;
pub use models::fields::{FieldKind, FieldRecord};
pub use normalize::TextNormalizer;
pub use ocr::{AssetLocation, RecognitionProgress, RecognitionWorker, WorkerFactory};
pub use pdf::{PageSource, PdfDocument};

#[cfg(feature = "native")]
pub use ocr::{PureOcrEngine, PureOcrFactory};
