//! Structured field extraction from merged document text.

mod parser;
pub mod rules;

pub use parser::{ParseReport, RuleBasedFieldParser, RuleHit};

use crate::models::fields::FieldRecord;

/// Trait for field parsers.
///
/// Parsing never fails: fields that no rule matches stay unset.
pub trait FieldParser {
    /// Parse a field record from text.
    fn parse(&self, text: &str) -> FieldRecord;
}
