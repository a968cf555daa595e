//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Normalize a WhatsApp number to the bare international format.
/// `08123...` becomes `628123...`; a leading `+` and any spaces or dashes
/// are stripped.
pub fn normalize_whatsapp_number(number: &str) -> String {
    let stripped: String = number
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();

    if let Some(rest) = stripped.strip_prefix("08") {
        return format!("628{}", rest);
    }
    stripped.trim_start_matches('+').to_string()
}

/// Validate a normalized WhatsApp number
pub fn validate_whatsapp_number(number: &str) -> Result<(), String> {
    static WHATSAPP_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = WHATSAPP_REGEX
        .get_or_init(|| Regex::new(r"^62\d{9,14}$").expect("Failed to compile WhatsApp regex"));

    if !regex.is_match(number) {
        return Err("Invalid WhatsApp number format (example: 6281234567890)".to_string());
    }

    Ok(())
}

/// Validate a new password together with its confirmation
pub fn validate_password(password: &str, confirm: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password != confirm {
        return Err("Password and confirmation do not match".to_string());
    }

    if password.len() < 6 {
        return Err("Password must be at least 6 characters long".to_string());
    }

    Ok(())
}

/// Validate a username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() > 64 {
        return Err("Username must be at most 64 characters long".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_prefix_becomes_international() {
        assert_eq!(normalize_whatsapp_number("081234567890"), "6281234567890");
    }

    #[test]
    fn plus_and_separators_are_stripped() {
        assert_eq!(normalize_whatsapp_number("+62 812-3456-7890"), "6281234567890");
        assert_eq!(normalize_whatsapp_number(" 6281234567890 "), "6281234567890");
    }

    #[test]
    fn normalized_numbers_pass_validation() {
        assert!(validate_whatsapp_number("6281234567890").is_ok());
        assert!(validate_whatsapp_number("081234567890").is_err());
        assert!(validate_whatsapp_number("62812").is_err());
        assert!(validate_whatsapp_number("628123456789012345").is_err());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("secret1", "secret1").is_ok());
        assert!(validate_password("", "").is_err());
        assert!(validate_password("secret1", "secret2").is_err());
        assert!(validate_password("abc", "abc").is_err());
    }
}
