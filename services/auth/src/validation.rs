//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Normalize an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err("Password must contain at least one letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }

    Ok(())
}

/// Validate a display name, returning it trimmed
pub fn validate_full_name(full_name: &str) -> Result<String, String> {
    let trimmed = full_name.trim();

    if trimmed.chars().count() < 2 {
        return Err("Full name must be at least 2 characters long".to_string());
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_rules() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.org").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@x").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("pass12").is_ok());
        assert_eq!(
            validate_password("pa12").unwrap_err(),
            "Password must be at least 6 characters long"
        );
        assert_eq!(
            validate_password("123456").unwrap_err(),
            "Password must contain at least one letter"
        );
        assert_eq!(
            validate_password("password").unwrap_err(),
            "Password must contain at least one digit"
        );
    }

    #[test]
    fn test_full_name_rules() {
        assert_eq!(validate_full_name("  Ada  ").unwrap(), "Ada");
        assert!(validate_full_name(" A ").is_err());
        assert!(validate_full_name("").is_err());
    }
}
