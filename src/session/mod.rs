//! Per-user chat sessions
//!
//! A [`Session`] owns one conversation: the index built from the last upload,
//! the chain answering over it and the chat history. The [`SessionManager`]
//! hands sessions to request handlers and expires idle ones.

pub mod controller;
pub mod history;
pub mod manager;

pub use controller::ChatExport;
pub use controller::Session;
pub use controller::SessionState;
pub use controller::SessionStatus;
pub use history::ChatHistory;
pub use history::ConversationTurn;
pub use history::Role;
pub use manager::SessionManager;
