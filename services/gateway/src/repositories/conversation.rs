//! Conversation repository backed by an object store
//!
//! Each conversation is one JSON document at
//! `conversations/{user_id}/{conversation_id}.json`. Writes are a plain
//! read-merge-write with no locking, so concurrent writers to the same
//! conversation resolve as last writer wins.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use common::storage::ObjectStore;
use tracing::{error, info, warn};

use crate::models::{Conversation, ConversationSummary, Message};

const KEY_PREFIX: &str = "conversations";

/// Conversation repository
#[derive(Clone)]
pub struct ConversationRepository {
    store: Arc<dyn ObjectStore>,
}

impl ConversationRepository {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Object key of a conversation document
    pub fn object_key(user_id: &str, conversation_id: &str) -> String {
        format!("{KEY_PREFIX}/{user_id}/{conversation_id}.json")
    }

    fn user_prefix(user_id: &str) -> String {
        format!("{KEY_PREFIX}/{user_id}/")
    }

    /// Merge `new_messages` into the stored conversation and write it back
    ///
    /// Failures are logged and reported as `false`; callers decide whether a
    /// lost write matters.
    pub async fn save(&self, conversation_id: &str, user_id: &str, new_messages: &[Message]) -> bool {
        if user_id.trim().is_empty() {
            error!("User ID is required for saving conversation {}", conversation_id);
            return false;
        }

        match self.merge_and_write(conversation_id, user_id, new_messages).await {
            Ok(conversation) => {
                info!(
                    "Saved conversation {} for user {} ({} messages)",
                    conversation_id,
                    user_id,
                    conversation.messages.len()
                );
                true
            }
            Err(e) => {
                error!(
                    "Failed to save conversation {} for user {}: {:#}",
                    conversation_id, user_id, e
                );
                false
            }
        }
    }

    async fn merge_and_write(
        &self,
        conversation_id: &str,
        user_id: &str,
        new_messages: &[Message],
    ) -> Result<Conversation> {
        let mut conversation = self
            .get(conversation_id, user_id)
            .await?
            .unwrap_or_else(|| Conversation::new(conversation_id, user_id));

        conversation.merge_messages(new_messages);
        conversation.updated_at = Utc::now();

        let body = serde_json::to_vec_pretty(&conversation)
            .context("Failed to serialize conversation")?;
        let metadata = vec![
            ("user_id".to_string(), user_id.to_string()),
            ("conversation_id".to_string(), conversation_id.to_string()),
            ("updated_at".to_string(), conversation.updated_at.to_rfc3339()),
            (
                "message_count".to_string(),
                conversation.messages.len().to_string(),
            ),
        ];

        self.store
            .put(&Self::object_key(user_id, conversation_id), body, &metadata)
            .await?;

        Ok(conversation)
    }

    /// Fetch a conversation, `None` if it does not exist
    pub async fn get(&self, conversation_id: &str, user_id: &str) -> Result<Option<Conversation>> {
        self.load(&Self::object_key(user_id, conversation_id)).await
    }

    async fn load(&self, key: &str) -> Result<Option<Conversation>> {
        let Some(body) = self.store.get(key).await? else {
            return Ok(None);
        };

        let conversation = serde_json::from_slice(&body)
            .with_context(|| format!("Failed to parse conversation document {key}"))?;
        Ok(Some(conversation))
    }

    /// Summaries of every conversation of a user, most recently updated first
    ///
    /// Documents that cannot be read or parsed are skipped.
    pub async fn list(&self, user_id: &str) -> Result<Vec<ConversationSummary>> {
        let keys = self.store.list(&Self::user_prefix(user_id)).await?;
        let mut summaries = Vec::with_capacity(keys.len());

        for key in keys.iter().filter(|key| key.ends_with(".json")) {
            match self.load(key).await {
                Ok(Some(conversation)) => summaries.push(ConversationSummary::from(&conversation)),
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable conversation {}: {:#}", key, e),
            }
        }

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    /// Delete a conversation, `false` if it did not exist
    pub async fn delete(&self, conversation_id: &str, user_id: &str) -> Result<bool> {
        let key = Self::object_key(user_id, conversation_id);

        if !self.store.exists(&key).await? {
            return Ok(false);
        }

        self.store.delete(&key).await?;
        info!("Deleted conversation {} for user {}", conversation_id, user_id);
        Ok(true)
    }
}
