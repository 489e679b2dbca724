/// Input validators for caller-supplied data.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MIN_PHONE_LENGTH: usize = 7;
const MAX_PHONE_LENGTH: usize = 20;
const MAX_NAME_LENGTH: usize = 256;

lazy_static! {
    // Digits with optional leading +, separated by spaces, dashes, dots
    // or parentheses. Loose on purpose; the phone number is an opaque
    // login identifier, not something we dial.
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9][0-9 .()-]*[0-9]$").unwrap();
}

/// Validates a phone number used as the login identifier.
/// Returns the trimmed value on success.
pub fn is_valid_phone(phone: &str) -> Result<String, ValidationError> {
    let trimmed = phone.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("phone".to_string()));
    }
    if trimmed.len() > MAX_PHONE_LENGTH {
        return Err(ValidationError::TooLong("phone".to_string(), MAX_PHONE_LENGTH));
    }
    if trimmed.len() < MIN_PHONE_LENGTH || !PHONE_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("phone".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates a display name for the catalogue entities (categories,
/// unit types, labour types). Returns the trimmed value on success.
pub fn is_valid_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("name".to_string()));
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong("name".to_string(), MAX_NAME_LENGTH));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_phone_formats() {
        for phone in ["555-0100", "+82 10-1234-5678", "(02) 555 0100", "010.1234.5678"] {
            assert!(is_valid_phone(phone).is_ok(), "should accept {}", phone);
        }
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(is_valid_phone("  555-0100  ").unwrap(), "555-0100");
    }

    #[test]
    fn rejects_invalid_phones() {
        for phone in ["", "   ", "55", "phone-number", "555_0100", "555-0100-"] {
            assert!(is_valid_phone(phone).is_err(), "should reject {:?}", phone);
        }
    }

    #[test]
    fn rejects_overlong_phone() {
        let phone = "9".repeat(MAX_PHONE_LENGTH + 1);
        assert!(is_valid_phone(&phone).is_err());
    }

    #[test]
    fn name_must_be_non_empty() {
        assert!(is_valid_name("Groceries").is_ok());
        assert!(is_valid_name("  ").is_err());
        assert!(is_valid_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }
}
