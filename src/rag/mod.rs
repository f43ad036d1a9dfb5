//! RAG (Retrieval-Augmented Generation) module
//!
//! This module provides end-to-end question answering over uploaded documents:
//! - Vector index construction from passages
//! - Semantic retrieval of the closest passages
//! - Context assembly from retrieved passages
//! - LLM-based answer generation, with optional conversational memory
//!
//! # Examples
//!
//! ```rust,no_run
//! use docchat::config::AppConfig;
//! use docchat::documents::UploadedFile;
//! use docchat::rag::RagService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = RagService::new(&config)?;
//!
//!     let file = UploadedFile::new("notes.txt", Some("text/plain"), b"The sky is blue.".to_vec());
//!     let (chain, _report) = service.index_documents(vec![file]).await?;
//!
//!     let response = service.query(&chain, "What color is the sky?", &[]).await?;
//!     println!("Answer: {}", response.answer);
//!     println!("Sources: {} passages", response.sources.len());
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod generator;
pub mod index;
pub mod pipeline;
pub mod retriever;

pub use context::ContextAssembler;
pub use generator::AnswerGenerator;
pub use generator::AnswerRequest;
pub use generator::GeneratorMode;
pub use generator::LlmAnswerGenerator;
pub use index::VectorIndex;
pub use pipeline::ConversationChain;
pub use pipeline::IndexReport;
pub use pipeline::RagResponse;
pub use pipeline::RagService;
pub use retriever::Retriever;
use serde::Serialize;

/// Passage returned by a similarity search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Position of the passage in the indexed document
    pub position: usize,
    pub text: String,
    /// Cosine similarity to the query
    pub score: f32,
}
