//! CLI command handlers module
//!
//! This module is organized by functional domains:
//! - chat: Interactive chat and one-shot questions over local files
//! - serve: API server
//! - info: Configuration display

pub mod chat;
pub mod info;
pub mod serve;

// Re-export all public handlers
pub use chat::*;
pub use info::*;
pub use serve::*;
