//! Complete RAG pipeline: Extract -> Chunk -> Index, then Retrieve -> Generate

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use tracing::info;

use crate::config::AppConfig;
use crate::documents::extract_batch;
use crate::documents::Chunker;
use crate::documents::FileReport;
use crate::documents::UploadedFile;
use crate::embeddings::has_embeddable_text;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingService;
use crate::errors::DocChatError;
use crate::errors::Result;
use crate::llm::ChatModel;
use crate::llm::LlmService;
use crate::rag::AnswerGenerator;
use crate::rag::AnswerRequest;
use crate::rag::LlmAnswerGenerator;
use crate::rag::Retriever;
use crate::rag::SearchResult;
use crate::rag::VectorIndex;
use crate::session::ConversationTurn;

/// An index together with the generator that answers over it
#[derive(Clone)]
pub struct ConversationChain {
    index: Arc<VectorIndex>,
    generator: Arc<dyn AnswerGenerator>,
}

impl ConversationChain {
    pub fn new(index: VectorIndex, generator: Arc<dyn AnswerGenerator>) -> Self {
        Self {
            index: Arc::new(index),
            generator,
        }
    }

    #[must_use]
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    #[must_use]
    pub fn generator(&self) -> &dyn AnswerGenerator {
        self.generator.as_ref()
    }
}

/// Summary of an indexed upload batch
#[derive(Debug, Clone, Serialize)]
pub struct IndexReport {
    pub files: Vec<FileReport>,
    pub passages: usize,
    pub characters: usize,
}

/// Answer plus the passages it was generated from
#[derive(Debug, Clone, Serialize)]
pub struct RagResponse {
    pub answer: String,
    pub sources: Vec<SearchResult>,
    pub question: String,
    /// Rewritten question, when it differs from the one asked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standalone_question: Option<String>,
}

/// Complete RAG service
pub struct RagService {
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    retriever: Retriever,
    generator: Arc<dyn AnswerGenerator>,
    embedding_concurrency: usize,
}

impl RagService {
    /// Create a new RAG service
    ///
    /// # Errors
    /// - Embedding service configuration errors (invalid API keys, endpoints)
    /// - LLM service configuration errors
    /// - Invalid chunking parameters
    pub fn new(config: &AppConfig) -> Result<Self> {
        let embedder: Arc<dyn Embedder> = Arc::new(EmbeddingService::new(config)?);
        let model: Arc<dyn ChatModel> = Arc::new(LlmService::new(config)?);
        let generator = Arc::new(LlmAnswerGenerator::from_config(model, config));

        Self::from_services(config, embedder, generator)
    }

    /// Create from existing services
    pub fn from_services(
        config: &AppConfig,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Result<Self> {
        let chunker = Chunker::from_config(&config.chunking)?;
        let retriever = Retriever::new(Arc::clone(&embedder), config.retrieval.top_k);

        Ok(Self {
            chunker,
            embedder,
            retriever,
            generator,
            embedding_concurrency: config.embeddings.concurrency,
        })
    }

    /// Extract, chunk and embed an upload batch into a fresh chain.
    ///
    /// # Errors
    /// - `EmptyDocument` when no file yields any text
    /// - Embedding failures; nothing is returned for a partial build
    pub async fn index_documents(
        &self,
        files: Vec<UploadedFile>,
    ) -> Result<(ConversationChain, IndexReport)> {
        info!("Indexing {} uploaded files", files.len());

        let extraction = tokio::task::spawn_blocking(move || extract_batch(&files))
            .await
            .map_err(|e| DocChatError::Custom(format!("Extraction task failed: {e}")))?;

        // Passages with nothing to embed are dropped but keep their positions
        let passages: Vec<_> = self
            .chunker
            .split(&extraction.text)
            .into_iter()
            .filter(|p| has_embeddable_text(&p.text))
            .collect();
        if passages.is_empty() {
            return Err(DocChatError::EmptyDocument);
        }
        debug!("Split documents into {} passages", passages.len());

        let index =
            VectorIndex::build(&passages, self.embedder.as_ref(), self.embedding_concurrency)
                .await?;

        let report = IndexReport {
            files: extraction.files,
            passages: index.len(),
            characters: extraction.text.chars().count(),
        };
        info!(
            "Indexed {} passages from {} characters",
            report.passages, report.characters
        );

        Ok((
            ConversationChain::new(index, Arc::clone(&self.generator)),
            report,
        ))
    }

    /// Answer a question against a chain.
    ///
    /// # Errors
    /// - `EmptyQuestion` for blank input
    /// - `EmptyIndex` when the chain holds no passages
    /// - Embedding or generation failures
    pub async fn query(
        &self,
        chain: &ConversationChain,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<RagResponse> {
        let question = question.trim();
        if !has_embeddable_text(question) {
            return Err(DocChatError::EmptyQuestion);
        }
        if chain.index().is_empty() {
            return Err(DocChatError::EmptyIndex);
        }

        info!("Processing RAG query: {}", question);

        let standalone = chain
            .generator()
            .standalone_question(question, history)
            .await?;

        debug!("Step 1: Retrieving passages");
        let sources = self.retriever.retrieve(chain.index(), &standalone).await?;

        debug!("Step 2: Generating answer");
        let answer = chain
            .generator()
            .answer(AnswerRequest {
                question: &standalone,
                context: &sources,
                history,
            })
            .await?;

        info!("RAG query completed successfully");

        Ok(RagResponse {
            answer,
            sources,
            question: question.to_string(),
            standalone_question: (standalone != question).then_some(standalone),
        })
    }

    #[must_use]
    pub const fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    #[must_use]
    pub const fn chunker(&self) -> &Chunker {
        &self.chunker
    }
}
