//! Company name and company address extraction.

use super::patterns::{
    COMPANY_ADDRESS_COUNTRY, COMPANY_ADDRESS_LABELED, COMPANY_ADDRESS_TERMINATORS,
    COMPANY_NAME_LABELED, COMPANY_NAME_LEGAL_SUFFIX, COMPANY_NAME_TERMINATORS, STREET_ADDRESS,
};
use super::{FieldRule, first_match};

/// Company name rules, most specific first.
pub fn name_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new("company-name-label", COMPANY_NAME_LABELED.clone())
            .group(2)
            .veto(1)
            .until(COMPANY_NAME_TERMINATORS.clone()),
        FieldRule::new("company-name-legal-suffix", COMPANY_NAME_LEGAL_SUFFIX.clone())
            .map(legal_name)
            .confidence(0.6),
    ]
}

/// Company address rules, most specific first.
pub fn address_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new("company-address-country", COMPANY_ADDRESS_COUNTRY.clone()),
        FieldRule::new("company-address-label", COMPANY_ADDRESS_LABELED.clone())
            .until(COMPANY_ADDRESS_TERMINATORS.clone())
            .confidence(0.8),
        FieldRule::new("company-address-street", STREET_ADDRESS.clone()).confidence(0.6),
    ]
}

/// A legal-suffix match must start with a word, not a stray initial or separator.
fn legal_name(raw: &str) -> Option<String> {
    let value = raw.trim().trim_start_matches(['&', '.', ',', '-']).trim();
    let first_word = value.split_whitespace().next()?;
    (first_word.chars().count() > 1 || value.split_whitespace().count() > 1)
        .then(|| value.to_string())
}

/// Extract the company name from text.
pub fn extract_company_name(text: &str) -> Option<String> {
    first_match(&name_rules(), text).map(|(_, m)| m.value)
}

/// Extract the company address from text.
pub fn extract_company_address(text: &str) -> Option<String> {
    first_match(&address_rules(), text).map(|(_, m)| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_labeled_name_stops_at_swift() {
        let text = "Beneficiary\nName: GLB LOGISTICS CORPORATION SWIFT CODE: CHASUS33 Account: 123";
        assert_eq!(
            extract_company_name(text),
            Some("GLB LOGISTICS CORPORATION".to_string())
        );
    }

    #[test]
    fn test_given_name_label_is_not_a_company() {
        let text = "ADI/GIVEN NAME: ELVIN\nCompany Name: CASPIAN TRADE LLC, Address: Baku";
        assert_eq!(extract_company_name(text), Some("CASPIAN TRADE LLC".to_string()));
    }

    #[test]
    fn test_legal_suffix_fallback() {
        let text = "Invoice from\nGLB LOGISTICS CORPORATION\n30 N GOULD ST";
        assert_eq!(
            extract_company_name(text),
            Some("GLB LOGISTICS CORPORATION".to_string())
        );
    }

    #[test]
    fn test_address_strips_country_and_tax_id() {
        let text = "COMPANY Address: 30 N GOULD ST STE R. SHERIDAN WY 82801 ,USA Tax ID: 99-0667903";
        assert_eq!(
            extract_company_address(text),
            Some("30 N GOULD ST STE R. SHERIDAN WY 82801".to_string())
        );
    }

    #[test]
    fn test_address_label_without_country() {
        let text = "COMPANY Address: 12 Harbour Road, Rotterdam Tax ID: 12-3456789";
        assert_eq!(
            extract_company_address(text),
            Some("12 Harbour Road, Rotterdam".to_string())
        );
    }

    #[test]
    fn test_no_company_fields() {
        assert_eq!(extract_company_name("nothing to see here"), None);
        assert_eq!(extract_company_address("nothing to see here"), None);
    }
}
