//! Rule-based extractors for company and identity fields.
//!
//! A [`FieldRule`] is one structural text pattern: a regex, the capture
//! group holding the value, an optional group whose presence vetoes the
//! match, optional terminator tokens that cut over-captured values short,
//! and a transform that cleans the value up. Rules for a field are tried in
//! order and the first non-empty value wins.

pub mod company;
pub mod contact;
pub mod identity;
pub mod patterns;
pub mod tax_id;
pub mod vehicle;

pub use company::{extract_company_address, extract_company_name};
pub use contact::{extract_email, extract_phone};
pub use identity::{IdentityBlock, extract_identity_block};
pub use tax_id::extract_tax_id;
pub use vehicle::extract_vin;

use regex::Regex;
use serde::Serialize;
use tracing::trace;

/// Extraction context with confidence scores.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// Value cleanup applied after capture.
pub type Transform = fn(&str) -> Option<String>;

/// One ordered extraction rule for a field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    name: String,
    pattern: Regex,
    group: usize,
    veto_group: Option<usize>,
    terminators: Option<Regex>,
    transform: Transform,
    confidence: f32,
}

impl FieldRule {
    /// Create a rule that captures group 1 of `pattern`.
    pub fn new(name: impl Into<String>, pattern: Regex) -> Self {
        Self {
            name: name.into(),
            pattern,
            group: 1,
            veto_group: None,
            terminators: None,
            transform: clean_value,
            confidence: 0.9,
        }
    }

    /// Capture the value from another group.
    pub fn group(mut self, group: usize) -> Self {
        self.group = group;
        self
    }

    /// Skip matches where `group` participated.
    pub fn veto(mut self, group: usize) -> Self {
        self.veto_group = Some(group);
        self
    }

    /// Cut the value at the first match of `terminators`.
    pub fn until(mut self, terminators: Regex) -> Self {
        self.terminators = Some(terminators);
        self
    }

    /// Replace the value cleanup. Returning `None` rejects the candidate.
    pub fn map(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the confidence reported for hits of this rule.
    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Rule name, reported in parse audits.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First non-empty value this rule yields in `text`.
    pub fn apply(&self, text: &str) -> Option<ExtractionMatch<String>> {
        for caps in self.pattern.captures_iter(text) {
            if self.veto_group.is_some_and(|g| caps.get(g).is_some()) {
                trace!("Rule {} vetoed at {:?}", self.name, caps.get(0).map(|m| m.start()));
                continue;
            }

            let Some(m) = caps.get(self.group) else {
                continue;
            };

            let mut raw = m.as_str();
            if let Some(stop) = self.terminators.as_ref().and_then(|t| t.find(raw)) {
                raw = &raw[..stop.start()];
            }

            if let Some(value) = (self.transform)(raw).filter(|v| !v.is_empty()) {
                let source = caps.get(0).map_or(raw, |whole| whole.as_str());
                return Some(
                    ExtractionMatch::new(value, self.confidence, source)
                        .with_position(m.start(), m.start() + raw.len()),
                );
            }
        }

        None
    }
}

/// Trim whitespace and trailing separators.
pub fn clean_value(raw: &str) -> Option<String> {
    let value = raw
        .trim()
        .trim_end_matches([',', ';', ':', '-'])
        .trim_end();
    (!value.is_empty()).then(|| value.to_string())
}

/// Remove all whitespace.
pub fn compact_value(raw: &str) -> Option<String> {
    let value: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    (!value.is_empty()).then_some(value)
}

/// Accept only values mixing letters and digits.
pub fn alphanumeric_mix(raw: &str) -> Option<String> {
    let has_letter = raw.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = raw.chars().any(|c| c.is_ascii_digit());
    (has_letter && has_digit).then(|| raw.to_string())
}

/// Run `rules` in order and return the first hit.
pub fn first_match(rules: &[FieldRule], text: &str) -> Option<(String, ExtractionMatch<String>)> {
    rules
        .iter()
        .find_map(|rule| rule.apply(text).map(|m| (rule.name().to_string(), m)))
}
