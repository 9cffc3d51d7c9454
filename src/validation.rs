// Validation utilities module
// Provides custom validation functions for domain-specific rules

use validator::ValidationError;

/// Validates password strength requirements:
/// at least 7 characters and must not contain the word "password"
/// in any letter case.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < 7 {
        return Err(ValidationError::new("password_too_short"));
    }
    if password.to_lowercase().contains("password") {
        return Err(ValidationError::new("password_contains_password"));
    }
    Ok(())
}

/// Validates that a string is non-empty once surrounding whitespace is removed
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("must_not_be_blank"))
    } else {
        Ok(())
    }
}

/// Normalizes user-supplied text by trimming surrounding whitespace
pub fn normalize(value: &str) -> String {
    value.trim().to_string()
}

/// Normalizes an email address: trimmed and lowercased, matching the
/// case-insensitive uniqueness rule enforced by the store.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_password_minimum_length() {
        assert!(validate_password("abc123").is_err());
        assert!(validate_password("abc1234").is_ok());
    }

    #[test]
    fn test_password_must_not_contain_password() {
        assert!(validate_password("password123").is_err());
        assert!(validate_password("myPASSword1").is_err());
        assert!(validate_password("PaSsWoRd!!").is_err());
        assert!(validate_password("correcthorse").is_ok());
    }

    #[test]
    fn test_not_blank() {
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("  x  ").is_ok());
    }

    #[test]
    fn test_normalize_email_lowercases_and_trims() {
        assert_eq!(normalize_email("  Foo@Example.COM "), "foo@example.com");
    }

    proptest! {
        #[test]
        fn prop_short_passwords_rejected(pw in "[a-zA-Z0-9]{0,6}") {
            prop_assert!(validate_password(&pw).is_err());
        }

        #[test]
        fn prop_password_substring_rejected(prefix in "[a-z]{0,5}", suffix in "[0-9]{0,5}") {
            let pw = format!("{}password{}", prefix, suffix);
            prop_assert!(validate_password(&pw).is_err());
        }
    }
}
