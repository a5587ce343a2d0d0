//! Tax identification number extraction.
//!
//! Accepts the US EIN format (`NN-NNNNNNN`) and the 10-digit Azerbaijani
//! VÖEN, only after a label. Anything else is not captured.

use super::patterns::TAX_ID_LABELED;
use super::{FieldRule, first_match};

/// Tax ID rules.
pub fn rules() -> Vec<FieldRule> {
    vec![FieldRule::new("tax-id-label", TAX_ID_LABELED.clone()).confidence(0.95)]
}

/// Extract a tax ID from text.
pub fn extract_tax_id(text: &str) -> Option<String> {
    first_match(&rules(), text).map(|(_, m)| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ein_after_tax_id_label() {
        let text = "SHERIDAN WY 82801 ,USA Tax ID: 99-0667903";
        assert_eq!(extract_tax_id(text), Some("99-0667903".to_string()));
    }

    #[test]
    fn test_voen_ten_digits() {
        assert_eq!(extract_tax_id("VÖEN: 1700767721"), Some("1700767721".to_string()));
        assert_eq!(extract_tax_id("voen 1700767721"), Some("1700767721".to_string()));
    }

    #[test]
    fn test_non_conforming_values_are_ignored() {
        assert_eq!(extract_tax_id("Tax ID: 99-06679"), None);
        assert_eq!(extract_tax_id("VÖEN: 17007677212"), None);
        assert_eq!(extract_tax_id("1700767721"), None);
    }
}
