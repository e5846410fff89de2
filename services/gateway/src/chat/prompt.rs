//! Prompt assembly

use crate::models::{Message, Role};

/// Number of most recent turns included in a prompt
pub const HISTORY_WINDOW: usize = 10;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant for this organization. \
Provide accurate, professional, and helpful responses. \
Keep responses concise but informative. \
Do not share sensitive information or engage in inappropriate content. \
If you're unsure about something, say so rather than guessing.";

/// Build the single prompt sent to the model
pub fn build_prompt(system_prompt: &str, history: &[Message], message: &str) -> String {
    let recent = &history[history.len().saturating_sub(HISTORY_WINDOW)..];

    if recent.is_empty() {
        return format!(
            "System: {system_prompt}\n\nUser: {message}\n\nPlease respond as the assistant:"
        );
    }

    let transcript = recent
        .iter()
        .map(|m| match m.role {
            Role::User => format!("User: {}", m.content),
            Role::Assistant => format!("Assistant: {}", m.content),
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "System: {system_prompt}\n\nPrevious conversation:\n{transcript}\n\n\
         Current user message: {message}\n\nPlease respond as the assistant:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_without_history() {
        assert_eq!(
            build_prompt("Be nice.", &[], "hello"),
            "System: Be nice.\n\nUser: hello\n\nPlease respond as the assistant:"
        );
    }

    #[test]
    fn test_prompt_with_history() {
        let history = vec![
            Message::new("1", Role::User, "hi"),
            Message::new("2", Role::Assistant, "hello"),
        ];

        assert_eq!(
            build_prompt("Be nice.", &history, "how are you?"),
            "System: Be nice.\n\nPrevious conversation:\nUser: hi\nAssistant: hello\n\n\
             Current user message: how are you?\n\nPlease respond as the assistant:"
        );
    }

    #[test]
    fn test_prompt_keeps_last_ten_turns() {
        let history: Vec<_> = (0..15)
            .map(|i| Message::new(i.to_string(), Role::User, format!("turn {i}")))
            .collect();

        let prompt = build_prompt("S", &history, "now");
        assert!(!prompt.contains("turn 4\n"));
        assert!(prompt.contains("User: turn 5\n"));
        assert!(prompt.contains("User: turn 14\n"));
        assert_eq!(prompt.matches("User: turn").count(), HISTORY_WINDOW);
    }
}
