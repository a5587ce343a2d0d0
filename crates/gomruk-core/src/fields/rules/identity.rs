//! Personal identity extraction: names, FIN code, passport and home address.
//!
//! An ID card prints surname, given name and patronymic as one block. When
//! that block is found it supplies all three names; the individual labeled
//! patterns are only consulted when it is absent.

use serde::Serialize;

use super::patterns::{
    FATHER_NAME_LABELED, FIN_LABELED, FIN_STANDALONE, GIVEN_NAME_LABELED, IDENTITY_BLOCK,
    PASSPORT_LABELED, PASSPORT_STANDALONE, PATRONYMIC_SUFFIX, PERSONAL_ADDRESS, SURNAME_LABELED,
};
use super::{ExtractionMatch, FieldRule, alphanumeric_mix, first_match};

/// Names read from an ID-card block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityBlock {
    pub surname: String,
    pub name: String,
    /// Patronymic without the `OĞLU` / `QIZI` suffix.
    pub father_name: String,
}

/// Find the combined surname / given name / patronymic block.
pub fn extract_identity_block(text: &str) -> Option<ExtractionMatch<IdentityBlock>> {
    let caps = IDENTITY_BLOCK.captures(text)?;
    let whole = caps.get(0)?;

    let father = caps.get(3)?.as_str().trim();
    let father_name = PATRONYMIC_SUFFIX.replace(father, "").trim().to_string();

    let block = IdentityBlock {
        surname: caps.get(1)?.as_str().to_string(),
        name: caps.get(2)?.as_str().to_string(),
        father_name,
    };

    Some(ExtractionMatch::new(block, 0.95, whole.as_str()).with_position(whole.start(), whole.end()))
}

/// Given-name rules used when no identity block is present.
pub fn name_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new("name-label", GIVEN_NAME_LABELED.clone())
            .group(2)
            .veto(1)
            .confidence(0.7),
    ]
}

/// Surname rules used when no identity block is present.
pub fn surname_rules() -> Vec<FieldRule> {
    vec![FieldRule::new("surname-label", SURNAME_LABELED.clone()).confidence(0.7)]
}

/// Patronymic rules used when no identity block is present.
pub fn father_name_rules() -> Vec<FieldRule> {
    vec![FieldRule::new("father-name-label", FATHER_NAME_LABELED.clone()).confidence(0.7)]
}

/// FIN code rules: a labeled code, then any 7-character code mixing letters and digits.
pub fn fin_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new("fin-label", FIN_LABELED.clone()),
        FieldRule::new("fin-standalone", FIN_STANDALONE.clone())
            .map(alphanumeric_mix)
            .confidence(0.5),
    ]
}

/// Passport rules: two letters and seven digits after a label, then the AA/AZE series.
pub fn passport_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new("passport-label", PASSPORT_LABELED.clone()),
        FieldRule::new("passport-series", PASSPORT_STANDALONE.clone())
            .map(|raw| Some(raw.trim().to_uppercase()))
            .confidence(0.8),
    ]
}

/// Home address rules (Azerbaijani postcode).
pub fn personal_address_rules() -> Vec<FieldRule> {
    vec![FieldRule::new("personal-address", PERSONAL_ADDRESS.clone()).confidence(0.8)]
}

/// Extract a FIN code from text.
pub fn extract_fin(text: &str) -> Option<String> {
    first_match(&fin_rules(), text).map(|(_, m)| m.value)
}

/// Extract a passport number from text.
pub fn extract_passport(text: &str) -> Option<String> {
    first_match(&passport_rules(), text).map(|(_, m)| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ID_CARD: &str = "AZƏRBAYCAN RESPUBLİKASI\n\
        SOYADI/SURNAME: MƏMMƏDOV\n\
        ADI/GIVEN NAME: ELVİN\n\
        ATASININ ADI/PATRONYMIC: ŞİRAZ OĞLU\n\
        FİN: 5ABC12D";

    #[test]
    fn test_identity_block() {
        let block = extract_identity_block(ID_CARD).unwrap().value;
        assert_eq!(
            block,
            IdentityBlock {
                surname: "MƏMMƏDOV".to_string(),
                name: "ELVİN".to_string(),
                father_name: "ŞİRAZ".to_string(),
            }
        );
    }

    #[test]
    fn test_identity_block_needs_all_three_labels() {
        assert!(extract_identity_block("SOYADI/SURNAME: MƏMMƏDOV\nADI/GIVEN NAME: ELVİN").is_none());
    }

    #[test]
    fn test_individual_labels() {
        let text = "Soyadı: Məmmədov\nAdı: Elvin\nAta adı: Şiraz";
        assert_eq!(first_match(&surname_rules(), text).unwrap().1.value, "Məmmədov");
        assert_eq!(first_match(&name_rules(), text).unwrap().1.value, "Elvin");
        assert_eq!(first_match(&father_name_rules(), text).unwrap().1.value, "Şiraz");
    }

    #[test]
    fn test_company_name_label_is_not_a_given_name() {
        let text = "Company Name: Acme\nName: Leyla";
        assert_eq!(first_match(&name_rules(), text).unwrap().1.value, "Leyla");
    }

    #[test]
    fn test_fin() {
        assert_eq!(extract_fin(ID_CARD), Some("5ABC12D".to_string()));
        assert_eq!(extract_fin("code 7XK2M9P here"), Some("7XK2M9P".to_string()));
        assert_eq!(extract_fin("COMPANY 1234567"), None);
    }

    #[test]
    fn test_passport() {
        assert_eq!(extract_passport("Passport No: AB1234567"), Some("AB1234567".to_string()));
        assert_eq!(extract_passport("seriya aa1234567"), Some("AA1234567".to_string()));
        assert_eq!(extract_passport("Passport No: AB123456"), None);
    }

    #[test]
    fn test_personal_address() {
        let text = "Ünvan: AZ1000 Bakı şəhəri, Nizami küç. 10\nTel: 1";
        assert_eq!(
            first_match(&personal_address_rules(), text).unwrap().1.value,
            "AZ1000 Bakı şəhəri, Nizami küç. 10"
        );
    }
}
