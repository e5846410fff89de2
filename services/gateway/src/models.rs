//! Request and response payloads for the chat endpoints

pub mod conversation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use conversation::{Conversation, ConversationSummary, Message, Role};

/// Default page size for the conversation listing
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Body of `POST /api/chat/send`
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Reply returned by `POST /api/chat/send`
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: String,
    /// Id of the stored user message
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Query parameters for the conversation listing
#[derive(Debug, Default, Deserialize)]
pub struct ConversationListQuery {
    pub limit: Option<usize>,
}

impl ConversationListQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT)
    }
}

/// Response for `GET /api/chat/conversations`
///
/// `total` counts every conversation of the caller, not just the returned page.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationSummary>,
    pub total: usize,
}
