//! Application state shared across handlers

use auth::AuthService;

use crate::{chat::ChatResponder, repositories::ConversationRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub conversation_repository: ConversationRepository,
    pub chat_responder: ChatResponder,
}
