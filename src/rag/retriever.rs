//! Retrieval of the passages closest to a question

use std::sync::Arc;

use tracing::debug;

use crate::embeddings::Embedder;
use crate::errors::DocChatError;
use crate::errors::Result;
use crate::rag::SearchResult;
use crate::rag::VectorIndex;

/// Default number of passages handed to the answer generator
pub const DEFAULT_TOP_K: usize = 4;

/// Retriever for semantic search over a session's index
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(embedder: Arc<dyn Embedder>, top_k: usize) -> Self {
        Self {
            embedder,
            top_k: top_k.max(1),
        }
    }

    #[must_use]
    pub const fn top_k(&self) -> usize {
        self.top_k
    }

    /// Semantic search with the configured `k`
    pub async fn retrieve(&self, index: &VectorIndex, query: &str) -> Result<Vec<SearchResult>> {
        self.semantic_search(index, query, self.top_k).await
    }

    /// Semantic search using vector embeddings
    pub async fn semantic_search(
        &self,
        index: &VectorIndex,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        // Checked before embedding so an empty index costs no API call
        if index.is_empty() {
            return Err(DocChatError::EmptyIndex);
        }

        debug!("Performing semantic search: {}", query);
        let query_embedding = self.embedder.embed(query).await?;
        let results = index.search(&query_embedding, limit)?;

        debug!("Retrieved {} passages", results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Chunker;
    use crate::tests::fakes::KeywordEmbedder;

    async fn index_of(texts: &[&str], embedder: &KeywordEmbedder) -> VectorIndex {
        let chunker = Chunker::default();
        let passages: Vec<_> = texts
            .iter()
            .enumerate()
            .map(|(position, text)| {
                let mut passage = chunker.split(text).remove(0);
                passage.position = position;
                passage
            })
            .collect();
        VectorIndex::build(&passages, embedder, 4).await.unwrap()
    }

    #[tokio::test]
    async fn test_empty_index_skips_embedding_call() {
        let embedder = Arc::new(KeywordEmbedder::default());
        let retriever = Retriever::new(embedder.clone(), 4);

        let result = retriever.retrieve(&VectorIndex::default(), "anything").await;
        assert!(matches!(result, Err(DocChatError::EmptyIndex)));
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_most_similar_first() {
        let embedder = Arc::new(KeywordEmbedder::default());
        let index = index_of(
            &[
                "Grass grows green in spring.",
                "The sky is blue.",
                "Rivers flow to the sea.",
            ],
            &embedder,
        )
        .await;

        let retriever = Retriever::new(embedder, 4);
        let results = retriever.retrieve(&index, "sky blue").await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].text, "The sky is blue.");
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_returns_min_of_k_and_passages() {
        let embedder = Arc::new(KeywordEmbedder::default());
        let texts: Vec<String> = (0..6).map(|i| format!("passage number {i}")).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let index = index_of(&refs, &embedder).await;

        let retriever = Retriever::new(embedder, 4);
        assert_eq!(retriever.retrieve(&index, "passage").await.unwrap().len(), 4);
        assert_eq!(
            retriever
                .semantic_search(&index, "passage", 10)
                .await
                .unwrap()
                .len(),
            6
        );
    }
}
