pub mod api;
pub mod cli;
pub mod config;
pub mod documents;
pub mod embeddings;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod rag;
pub mod session;

#[cfg(test)]
pub mod tests;

pub use config::AppConfig;
pub use errors::*;
