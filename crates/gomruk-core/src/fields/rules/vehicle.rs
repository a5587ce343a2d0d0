//! Vehicle identification number extraction.

use super::patterns::VIN;
use super::{FieldRule, alphanumeric_mix, first_match};

/// VIN rules. The letters I, O and Q never appear in a VIN.
pub fn rules() -> Vec<FieldRule> {
    // All-digit runs of 17 are account numbers, not VINs
    vec![FieldRule::new("vin", VIN.clone()).map(alphanumeric_mix)]
}

/// Extract a VIN from text.
pub fn extract_vin(text: &str) -> Option<String> {
    first_match(&rules(), text).map(|(_, m)| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_vin() {
        let text = "Vehicle: TOYOTA CAMRY VIN 4T1BF1FK5CU123456 black";
        assert_eq!(extract_vin(text), Some("4T1BF1FK5CU123456".to_string()));
    }

    #[test]
    fn test_confusable_letters_are_rejected() {
        assert_eq!(extract_vin("VIN 4T1BF1FK5CO123456"), None);
        assert_eq!(extract_vin("VIN 4T1BF1FK5CU12345"), None);
    }

    #[test]
    fn test_digit_only_run_is_not_a_vin() {
        assert_eq!(extract_vin("Account: 40702840000000012"), None);
    }
}
