//! In-memory vector index over document passages

use futures::stream;
use futures::StreamExt;
use futures::TryStreamExt;
use tracing::debug;
use tracing::info;

use crate::documents::Passage;
use crate::embeddings::Embedder;
use crate::errors::DocChatError;
use crate::errors::Result;
use crate::rag::SearchResult;

/// One indexed passage and its embedding
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub position: usize,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Passages plus embeddings, ordered by passage position.
///
/// Built once per upload and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimension: usize,
}

impl VectorIndex {
    /// Embed every passage and build the index.
    ///
    /// Requests run up to `concurrency` at a time; results are matched back to
    /// passages by position. Any embedding failure fails the whole build.
    pub async fn build(
        passages: &[Passage],
        embedder: &dyn Embedder,
        concurrency: usize,
    ) -> Result<Self> {
        info!("Building vector index over {} passages", passages.len());

        // Requests are created up front so the stream holds no borrowing closure
        let requests: Vec<_> = passages
            .iter()
            .map(|passage| embedder.embed(&passage.text))
            .collect();
        let embeddings: Vec<Vec<f32>> = stream::iter(requests)
            .buffered(concurrency.max(1))
            .try_collect()
            .await?;

        let entries = passages
            .iter()
            .zip(embeddings)
            .map(|(passage, embedding)| IndexEntry {
                position: passage.position,
                text: passage.text.clone(),
                embedding,
            })
            .collect();

        let index = Self::from_entries(entries)?;
        debug!(
            "Vector index ready: {} entries, dimension {}",
            index.len(),
            index.dimension
        );
        Ok(index)
    }

    /// Assemble an index from already-embedded entries
    pub fn from_entries(mut entries: Vec<IndexEntry>) -> Result<Self> {
        let dimension = entries.first().map_or(0, |e| e.embedding.len());

        if !entries.is_empty() && dimension == 0 {
            return Err(DocChatError::EmbeddingService(
                "Embedding service returned an empty vector".to_string(),
            ));
        }
        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimension) {
            return Err(DocChatError::EmbeddingService(format!(
                "Inconsistent embedding dimensions: expected {dimension}, got {} for passage {}",
                bad.embedding.len(),
                bad.position
            )));
        }

        entries.sort_by_key(|e| e.position);
        Ok(Self { entries, dimension })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Stored passage texts in document order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.text.as_str())
    }

    /// Top `k` entries by cosine similarity, best first, earlier passage on ties
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if self.entries.is_empty() {
            return Err(DocChatError::EmptyIndex);
        }
        if query.len() != self.dimension {
            return Err(DocChatError::EmbeddingService(format!(
                "Query embedding has {} dimensions, index has {}",
                query.len(),
                self.dimension
            )));
        }

        let mut results: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                position: entry.position,
                text: entry.text.clone(),
                score: cosine_similarity(query, &entry.embedding),
            })
            .collect();

        // Entries are already in position order and sort_by is stable
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);
        Ok(results)
    }
}

/// Cosine similarity; zero when either vector has zero magnitude
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
