//! Phone number and email extraction.

use super::patterns::{EMAIL, PHONE_AZ, PHONE_LABELED};
use super::{FieldRule, compact_value, first_match};

/// Phone rules: labeled numbers first, then Azerbaijani numbers with a country code.
pub fn phone_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new("phone-label", PHONE_LABELED.clone()).map(compact_value),
        FieldRule::new("phone-az", PHONE_AZ.clone())
            .map(compact_value)
            .confidence(0.7),
    ]
}

/// Email rules.
pub fn email_rules() -> Vec<FieldRule> {
    vec![FieldRule::new("email", EMAIL.clone()).confidence(0.95)]
}

/// Extract a phone number from text, without whitespace.
pub fn extract_phone(text: &str) -> Option<String> {
    first_match(&phone_rules(), text).map(|(_, m)| m.value)
}

/// Extract an email address from text.
pub fn extract_email(text: &str) -> Option<String> {
    first_match(&email_rules(), text).map(|(_, m)| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_phone() {
        assert_eq!(
            extract_phone("Tel: +1 307 555 0142\nFax: 1"),
            Some("+13075550142".to_string())
        );
    }

    #[test]
    fn test_azerbaijani_phone() {
        assert_eq!(
            extract_phone("Əlaqə +994 50 123 45 67"),
            Some("+994501234567".to_string())
        );
    }

    #[test]
    fn test_tax_id_is_not_a_phone() {
        assert_eq!(extract_phone("Tax ID: 99-0667903"), None);
    }

    #[test]
    fn test_email() {
        assert_eq!(
            extract_email("contact: ops@glb-logistics.com."),
            Some("ops@glb-logistics.com".to_string())
        );
    }
}
