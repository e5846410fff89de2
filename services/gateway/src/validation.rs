//! Validation of chat input

use regex::Regex;
use std::sync::OnceLock;

/// Longest accepted chat message, in characters
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// Validate a chat message, returning it trimmed
pub fn validate_message(message: &str) -> Result<String, String> {
    let trimmed = message.trim();

    if trimmed.is_empty() {
        return Err("Message cannot be empty".to_string());
    }

    if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(format!(
            "Message too long (max {MAX_MESSAGE_LENGTH} characters)"
        ));
    }

    Ok(trimmed.to_string())
}

/// Validate a client supplied conversation id
///
/// Ids end up in object keys, so only URL and path safe characters pass.
pub fn validate_conversation_id(conversation_id: &str) -> Result<(), String> {
    static ID_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = ID_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_-]{1,128}$").expect("Failed to compile conversation id regex")
    });

    if !regex.is_match(conversation_id) {
        return Err("Invalid conversation id".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_rules() {
        assert_eq!(validate_message("  hello \n").unwrap(), "hello");
        assert_eq!(
            validate_message("   ").unwrap_err(),
            "Message cannot be empty"
        );
        assert!(validate_message(&"a".repeat(MAX_MESSAGE_LENGTH)).is_ok());
        assert_eq!(
            validate_message(&"a".repeat(MAX_MESSAGE_LENGTH + 1)).unwrap_err(),
            "Message too long (max 4000 characters)"
        );
    }

    #[test]
    fn test_conversation_id_rules() {
        assert!(validate_conversation_id("9b2c3f4e-1a2b-4c5d-8e9f-0a1b2c3d4e5f").is_ok());
        assert!(validate_conversation_id("my_chat-1").is_ok());
        assert!(validate_conversation_id("").is_err());
        assert!(validate_conversation_id("../other").is_err());
        assert!(validate_conversation_id("a/b").is_err());
        assert!(validate_conversation_id(&"a".repeat(129)).is_err());
    }
}
