//! Conversation document stored per user and the summaries derived from it

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest preview shown in a conversation listing, in characters
pub const PREVIEW_LENGTH: usize = 100;

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Full conversation document as persisted in object storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub conversation_id: String,
    pub user_id: String,
    pub messages: Vec<Message>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(conversation_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            user_id: user_id.into(),
            messages: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Append messages whose ids are not present yet, keeping their order
    ///
    /// Returns the number of messages actually appended.
    pub fn merge_messages(&mut self, incoming: &[Message]) -> usize {
        let mut seen: HashSet<String> = self.messages.iter().map(|m| m.id.clone()).collect();
        let before = self.messages.len();

        for message in incoming {
            if seen.insert(message.id.clone()) {
                self.messages.push(message.clone());
            }
        }

        self.messages.len() - before
    }

    /// Content of the first user message, if any
    pub fn first_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Listing entry for a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub conversation_id: String,
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
    pub preview: String,
}

impl From<&Conversation> for ConversationSummary {
    fn from(conversation: &Conversation) -> Self {
        let preview = match conversation.first_user_message() {
            Some(content) => preview_of(content),
            None => "No messages".to_string(),
        };

        Self {
            conversation_id: conversation.conversation_id.clone(),
            updated_at: conversation.updated_at,
            message_count: conversation.messages.len(),
            preview,
        }
    }
}

fn preview_of(content: &str) -> String {
    if content.chars().count() > PREVIEW_LENGTH {
        let truncated: String = content.chars().take(PREVIEW_LENGTH).collect();
        format!("{truncated}...")
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str, role: Role, content: &str) -> Message {
        Message::new(id, role, content)
    }

    #[test]
    fn test_merge_skips_known_ids() {
        let mut conversation = Conversation::new("c1", "a@x.com");
        let a = msg("a", Role::User, "hi");
        let b = msg("b", Role::Assistant, "hello");
        let c = msg("c", Role::User, "bye");

        assert_eq!(conversation.merge_messages(&[a.clone(), b.clone()]), 2);
        assert_eq!(conversation.merge_messages(&[b.clone(), c.clone()]), 1);

        let ids: Vec<_> = conversation.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_merge_dedupes_within_batch() {
        let mut conversation = Conversation::new("c1", "a@x.com");
        let a = msg("a", Role::User, "hi");

        assert_eq!(conversation.merge_messages(&[a.clone(), a]), 1);
        assert_eq!(conversation.messages.len(), 1);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_value(msg("a", Role::Assistant, "x")).unwrap();
        assert_eq!(json["role"], "assistant");
    }

    #[test]
    fn test_summary_preview() {
        let mut conversation = Conversation::new("c1", "a@x.com");
        assert_eq!(ConversationSummary::from(&conversation).preview, "No messages");

        conversation.merge_messages(&[
            msg("a", Role::Assistant, "greeting"),
            msg("b", Role::User, "hello"),
        ]);
        let summary = ConversationSummary::from(&conversation);
        assert_eq!(summary.preview, "hello");
        assert_eq!(summary.message_count, 2);
    }

    #[test]
    fn test_long_preview_is_truncated() {
        let mut conversation = Conversation::new("c1", "a@x.com");
        conversation.merge_messages(&[msg("a", Role::User, &"é".repeat(150))]);

        let preview = ConversationSummary::from(&conversation).preview;
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), PREVIEW_LENGTH + 3);

        let mut exact = Conversation::new("c2", "a@x.com");
        exact.merge_messages(&[msg("a", Role::User, &"x".repeat(100))]);
        assert_eq!(ConversationSummary::from(&exact).preview, "x".repeat(100));
    }
}
