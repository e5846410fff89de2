//! Repositories for the gateway service

pub mod conversation;

pub use conversation::ConversationRepository;
