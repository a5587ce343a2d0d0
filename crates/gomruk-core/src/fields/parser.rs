//! Ordered, first-match-wins field parser.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::models::fields::{FieldKind, FieldRecord};

use super::FieldParser;
use super::rules::{FieldRule, company, contact, extract_identity_block, first_match, identity, tax_id, vehicle};

/// Rule name reported for names taken from an ID-card block.
const IDENTITY_BLOCK_RULE: &str = "identity-block";

/// Which rule produced a field value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleHit {
    pub field: FieldKind,
    pub rule: String,
    pub value: String,
    pub confidence: f32,
    /// Byte range of the value in the parsed text.
    pub position: Option<(usize, usize)>,
    /// Full text matched by the rule.
    pub source: String,
}

/// Result of a parse with its rule audit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseReport {
    /// Extracted fields.
    pub record: FieldRecord,
    /// One entry per present field, in record order.
    pub hits: Vec<RuleHit>,
    /// Fields no rule matched.
    pub missing: Vec<FieldKind>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Field parser driven by an ordered rule list per field.
///
/// The built-in rule set can be extended or replaced per field.
#[derive(Debug, Clone)]
pub struct RuleBasedFieldParser {
    rules: BTreeMap<FieldKind, Vec<FieldRule>>,
    identity_block: bool,
}

impl RuleBasedFieldParser {
    /// Create a parser with the built-in rules.
    pub fn new() -> Self {
        let rules = BTreeMap::from([
            (FieldKind::CompanyName, company::name_rules()),
            (FieldKind::CompanyAddress, company::address_rules()),
            (FieldKind::Voen, tax_id::rules()),
            (FieldKind::Vin, vehicle::rules()),
            (FieldKind::IdNumber, identity::fin_rules()),
            (FieldKind::Passport, identity::passport_rules()),
            (FieldKind::Phone, contact::phone_rules()),
            (FieldKind::Email, contact::email_rules()),
            (FieldKind::Surname, identity::surname_rules()),
            (FieldKind::Name, identity::name_rules()),
            (FieldKind::FatherName, identity::father_name_rules()),
            (FieldKind::PersonalAddress, identity::personal_address_rules()),
        ]);

        Self {
            rules,
            identity_block: true,
        }
    }

    /// Append a rule after the existing rules for a field.
    pub fn with_rule(mut self, field: FieldKind, rule: FieldRule) -> Self {
        self.rules.entry(field).or_default().push(rule);
        self
    }

    /// Insert a rule ahead of the existing rules for a field.
    pub fn with_priority_rule(mut self, field: FieldKind, rule: FieldRule) -> Self {
        self.rules.entry(field).or_default().insert(0, rule);
        self
    }

    /// Replace every rule for a field.
    pub fn with_rules(mut self, field: FieldKind, rules: Vec<FieldRule>) -> Self {
        self.rules.insert(field, rules);
        self
    }

    /// Enable or disable the combined ID-card name block.
    pub fn with_identity_block(mut self, enabled: bool) -> Self {
        self.identity_block = enabled;
        self
    }

    /// Rules tried for a field, in order.
    pub fn rules(&self, field: FieldKind) -> &[FieldRule] {
        self.rules.get(&field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Parse text and report which rule produced each field.
    pub fn parse_detailed(&self, text: &str) -> ParseReport {
        let start = Instant::now();
        let mut record = FieldRecord::default();
        let mut hits = Vec::new();

        let block = if self.identity_block {
            extract_identity_block(text)
        } else {
            None
        };

        if let Some(block) = &block {
            debug!("Identity block matched: {}", block.source.replace('\n', " "));
            for (field, value) in [
                (FieldKind::Surname, &block.value.surname),
                (FieldKind::Name, &block.value.name),
                (FieldKind::FatherName, &block.value.father_name),
            ] {
                if value.is_empty() {
                    continue;
                }
                record.set(field, value.as_str());
                hits.push(RuleHit {
                    field,
                    rule: IDENTITY_BLOCK_RULE.to_string(),
                    value: value.clone(),
                    confidence: block.confidence,
                    position: block.position,
                    source: block.source.clone(),
                });
            }
        }

        for field in FieldKind::ALL {
            if record.has(field) {
                continue;
            }

            if let Some((rule, m)) = first_match(self.rules(field), text) {
                debug!("{} <- {} ({:?})", field, rule, m.value);
                record.set(field, m.value.as_str());
                hits.push(RuleHit {
                    field,
                    rule,
                    value: m.value,
                    confidence: m.confidence,
                    position: m.position,
                    source: m.source,
                });
            }
        }

        hits.sort_by_key(|hit| hit.field);
        let missing = record.missing();
        let processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Parsed {} of {} fields in {}ms",
            hits.len(),
            FieldKind::ALL.len(),
            processing_time_ms
        );

        ParseReport {
            record,
            hits,
            missing,
            processing_time_ms,
        }
    }
}

impl Default for RuleBasedFieldParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldParser for RuleBasedFieldParser {
    fn parse(&self, text: &str) -> FieldRecord {
        self.parse_detailed(text).record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use regex::Regex;

    #[test]
    fn test_bank_details_company_name() {
        let parser = RuleBasedFieldParser::new();
        let record = parser.parse("Name: GLB LOGISTICS CORPORATION SWIFT CODE CHASUS33 Account 1234");

        assert_eq!(record.company_name.as_deref(), Some("GLB LOGISTICS CORPORATION"));
        assert_eq!(record.name, None);
    }

    #[test]
    fn test_company_address_and_tax_id() {
        let parser = RuleBasedFieldParser::new();
        let record = parser.parse(
            "COMPANY Address: 30 N GOULD ST STE R. SHERIDAN WY 82801 ,USA Tax ID: 99-0667903",
        );

        assert_eq!(
            record.company_address.as_deref(),
            Some("30 N GOULD ST STE R. SHERIDAN WY 82801")
        );
        assert_eq!(record.voen.as_deref(), Some("99-0667903"));
    }

    #[test]
    fn test_no_matches_leaves_record_empty() {
        let parser = RuleBasedFieldParser::new();
        let report = parser.parse_detailed("lorem ipsum dolor sit amet\nnothing useful here");

        assert!(report.record.is_empty());
        assert!(report.hits.is_empty());
        assert_eq!(report.missing.len(), FieldKind::ALL.len());
    }

    #[test]
    fn test_identity_block_beats_name_label() {
        let parser = RuleBasedFieldParser::new();
        let text = "Name: Leyla\n\
            SOYADI/SURNAME: MƏMMƏDOV\n\
            ADI/GIVEN NAME: ELVİN\n\
            ATASININ ADI/PATRONYMIC: ŞİRAZ OĞLU";
        let report = parser.parse_detailed(text);

        assert_eq!(report.record.name.as_deref(), Some("ELVİN"));
        assert_eq!(report.record.surname.as_deref(), Some("MƏMMƏDOV"));
        assert_eq!(report.record.father_name.as_deref(), Some("ŞİRAZ"));

        let name_hit = report.hits.iter().find(|h| h.field == FieldKind::Name).unwrap();
        assert_eq!(name_hit.rule, IDENTITY_BLOCK_RULE);
    }

    #[test]
    fn test_individual_name_without_block() {
        let parser = RuleBasedFieldParser::new();
        let record = parser.parse("Name: Leyla\nSurname: Həsənova");

        assert_eq!(record.name.as_deref(), Some("Leyla"));
        assert_eq!(record.surname.as_deref(), Some("Həsənova"));
        assert_eq!(record.father_name, None);
    }

    #[test]
    fn test_priority_rule_extends_policy() {
        let parser = RuleBasedFieldParser::new().with_priority_rule(
            FieldKind::CompanyName,
            FieldRule::new("sender", Regex::new(r"Göndərən:\s*([^\n]+)").unwrap()),
        );
        let record = parser.parse("Göndərən: Caspian Cargo\nName: GLB LOGISTICS CORPORATION");

        assert_eq!(record.company_name.as_deref(), Some("Caspian Cargo"));
        assert_eq!(parser.rules(FieldKind::CompanyName)[0].name(), "sender");
    }

    #[test]
    fn test_appended_rule_runs_after_builtins() {
        let parser = RuleBasedFieldParser::new().with_rule(
            FieldKind::Vin,
            FieldRule::new("chassis", Regex::new(r"Şassi №\s*(\S+)").unwrap()),
        );
        let record = parser.parse("Şassi № AB12");

        assert_eq!(record.vin.as_deref(), Some("AB12"));
        let rules = parser.rules(FieldKind::Vin);
        assert_eq!(rules.last().map(|r| r.name()), Some("chassis"));
    }

    #[test]
    fn test_replaced_rules_drop_builtins() {
        let parser = RuleBasedFieldParser::new().with_rules(
            FieldKind::CompanyName,
            vec![FieldRule::new("firma", Regex::new(r"Firma:\s*([^\n]+)").unwrap())],
        );
        let record = parser.parse("Name: GLB LOGISTICS CORPORATION\nFirma: Caspian Cargo");

        assert_eq!(record.company_name.as_deref(), Some("Caspian Cargo"));
        assert_eq!(parser.rules(FieldKind::CompanyName).len(), 1);
    }

    #[test]
    fn test_identity_block_can_be_disabled() {
        let text = "SOYADI/SURNAME: MƏMMƏDOV\n\
            ADI/GIVEN NAME: ELVİN\n\
            ATASININ ADI/PATRONYMIC: ŞİRAZ OĞLU";
        let enabled = RuleBasedFieldParser::new().parse_detailed(text);
        let disabled = RuleBasedFieldParser::new()
            .with_identity_block(false)
            .parse_detailed(text);

        assert!(enabled.hits.iter().any(|h| h.rule == IDENTITY_BLOCK_RULE));
        assert!(disabled.hits.iter().all(|h| h.rule != IDENTITY_BLOCK_RULE));
    }

    #[test]
    fn test_hits_are_in_record_order() {
        let parser = RuleBasedFieldParser::new();
        let report = parser.parse_detailed("Email: a@b.az\nVÖEN: 1700767721\nName: ACME LTD");
        let fields: Vec<FieldKind> = report.hits.iter().map(|h| h.field).collect();

        assert_eq!(
            fields,
            vec![FieldKind::CompanyName, FieldKind::Voen, FieldKind::Email]
        );
    }

    proptest! {
        #[test]
        fn parse_is_deterministic(text in "[A-Za-z0-9ƏəŞşİ:/,. \n-]{0,200}") {
            let parser = RuleBasedFieldParser::new();
            prop_assert_eq!(parser.parse(&text), parser.parse(&text));
        }
    }
}
