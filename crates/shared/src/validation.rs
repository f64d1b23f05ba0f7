//! Common validation utilities.

use validator::ValidateEmail;

/// Minimum length of a phone number, counting separators.
pub const PHONE_MIN_LEN: usize = 10;

/// Maximum length of a phone number, counting separators.
pub const PHONE_MAX_LEN: usize = 20;

lazy_static::lazy_static! {
    static ref PHONE_REGEX: regex::Regex =
        regex::Regex::new(r"^[0-9 \t\r\n\-+()]{10,20}$").unwrap();
}

/// Returns the trimmed value, or `None` when the value is absent or blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Checks email syntax using the `validator` crate rules.
pub fn is_valid_email(email: &str) -> bool {
    email.validate_email()
}

/// Checks a phone number: ASCII digits, whitespace, `-`, `+`, `(`, `)`,
/// 10 to 20 characters.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_REGEX.is_match(phone)
}

/// Checks that the character count of `value` lies within `min..=max`.
pub fn char_len_within(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    len >= min && len <= max
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Ada ")), Some("Ada"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(Some("")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("ada@x.com"));
        assert!(is_valid_email("first.last+tag@example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn test_is_valid_email_generated() {
        for _ in 0..20 {
            let email: String = SafeEmail().fake();
            assert!(is_valid_email(&email), "rejected {}", email);
        }
    }

    #[test]
    fn test_is_valid_phone() {
        assert!(is_valid_phone("+1-555-0100"));
        assert!(is_valid_phone("0803 123 4567"));
        assert!(is_valid_phone("(234) 803-123-4567"));
        assert!(is_valid_phone("08031234567"));
    }

    #[test]
    fn test_is_valid_phone_length_bounds() {
        assert!(!is_valid_phone("123456789"));
        assert!(is_valid_phone("1234567890"));
        assert!(is_valid_phone("12345678901234567890"));
        assert!(!is_valid_phone("123456789012345678901"));
    }

    #[test]
    fn test_is_valid_phone_rejects_letters() {
        assert!(!is_valid_phone("555-CALL-NOW"));
        assert!(!is_valid_phone("+1 555 0100 ext 2"));
    }

    #[test]
    fn test_is_valid_phone_rejects_non_ascii_digits() {
        // Arabic-Indic and full-width digits
        assert!(!is_valid_phone("٠٨٠٣١٢٣٤٥٦٧"));
        assert!(!is_valid_phone("０８０３１２３４５６７"));
        assert!(!is_valid_phone("0803\u{2003}123\u{2003}4567"));
    }

    #[test]
    fn test_char_len_within() {
        assert!(char_len_within("Ada", 2, 50));
        assert!(!char_len_within("A", 2, 50));
        assert!(!char_len_within(&"a".repeat(51), 2, 50));
        // Counts characters, not bytes
        assert!(char_len_within("Zoë", 3, 3));
    }

    #[test]
    fn test_phone_bounds_constants() {
        assert_eq!(PHONE_MIN_LEN, 10);
        assert_eq!(PHONE_MAX_LEN, 20);
    }
}
