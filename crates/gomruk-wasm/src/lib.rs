//! WASM bindings for customs field extraction and form filling.
//!
//! The page-context half of the extension: text extracted elsewhere is
//! parsed here and written into the live page and its same-origin frames.

mod web_dom;

use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlIFrameElement};

use gomruk_core::fill::{FillReport, FrameSummary, fill_target, resolve};
use gomruk_core::models::config::FillConfig;
use gomruk_core::{FieldRecord, RuleBasedFieldParser, TextNormalizer};

pub use web_dom::WebDom;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Correct OCR misreads in extracted text.
#[wasm_bindgen]
pub fn normalize_text(text: &str) -> String {
    TextNormalizer::new().normalize(text)
}

/// Parse fields from extracted text, with the rule that produced each one.
#[wasm_bindgen]
pub fn extract_fields(text: &str) -> Result<JsValue, JsValue> {
    let report = RuleBasedFieldParser::new().parse_detailed(&normalize_text(text));
    to_js(&report)
}

/// Site profile chosen for a target page.
#[derive(Debug, Serialize)]
pub struct ProfileInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub supported: bool,
}

impl ProfileInfo {
    pub fn for_target(target: &str) -> Self {
        let profile = resolve(target);
        Self {
            id: profile.id(),
            name: profile.name(),
            supported: profile.is_supported(),
        }
    }
}

/// Describe the profile that would fill `target`.
#[wasm_bindgen]
pub fn resolve_profile(target: &str) -> Result<JsValue, JsValue> {
    to_js(&ProfileInfo::for_target(target))
}

/// Fill the current page and its same-origin frames from extracted text.
///
/// `target` is the page URL or origin; it selects the site profile.
#[wasm_bindgen]
pub fn fill_form(text: &str, target: &str) -> Result<JsValue, JsValue> {
    let report = RuleBasedFieldParser::new().parse_detailed(&normalize_text(text));
    let summary = fill_frames(&report.record, target)?;
    to_js(&summary)
}

/// Fill the current page and its same-origin frames from a field record.
#[wasm_bindgen]
pub fn fill_form_with_fields(fields: JsValue, target: &str) -> Result<JsValue, JsValue> {
    let record: FieldRecord = serde_wasm_bindgen::from_value(fields)?;
    let summary = fill_frames(&record, target)?;
    to_js(&summary)
}

fn fill_frames(record: &FieldRecord, target: &str) -> Result<FrameSummary, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document available"))?;

    let config = FillConfig::default();
    let mut reports = Vec::new();
    for frame in frame_documents(&document) {
        if let Some(report) = fill_document(record, target, &frame, &config) {
            reports.push(report);
        }
    }

    let summary = FrameSummary::aggregate(reports);
    web_sys::console::log_1(&JsValue::from_str(&format!(
        "gomruk: {:?}, {} field(s) filled across {} frame(s)",
        summary.status,
        summary.filled_count,
        summary.frames.len()
    )));
    Ok(summary)
}

fn fill_document(
    record: &FieldRecord,
    target: &str,
    document: &Document,
    config: &FillConfig,
) -> Option<FillReport> {
    let mut dom = WebDom::new(document)?;
    Some(fill_target(record, target, &mut dom, config))
}

/// `document` followed by the documents of its reachable iframes.
///
/// Cross-origin frames have no accessible document and are left out.
fn frame_documents(document: &Document) -> Vec<Document> {
    let mut documents = vec![document.clone()];
    let mut next = 0;
    while next < documents.len() {
        if let Ok(frames) = documents[next].query_selector_all("iframe") {
            for i in 0..frames.length() {
                let content = frames
                    .item(i)
                    .and_then(|n| n.dyn_into::<HtmlIFrameElement>().ok())
                    .and_then(|f| f.content_document());
                if let Some(content) = content {
                    documents.push(content);
                }
            }
        }
        next += 1;
    }
    documents
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Parse report as a JSON string, for callers passing messages between contexts.
#[wasm_bindgen]
pub fn extract_fields_json(text: &str) -> Result<String, JsValue> {
    let report = RuleBasedFieldParser::new().parse_detailed(&normalize_text(text));
    serde_json::to_string(&report.record).map_err(|e| JsValue::from_str(&e.to_string()))
}
