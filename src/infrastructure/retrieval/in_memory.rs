//! In-memory vector index

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::ingestion::Chunk;
use crate::domain::retrieval::{cosine_similarity, EmbeddingProvider, ScoredChunk, VectorIndex};
use crate::domain::DomainError;

#[derive(Debug, Clone)]
struct IndexedChunk {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// Brute-force cosine similarity index held in memory
///
/// Chunks with no similarity to the query (score <= 0) are never returned.
#[derive(Debug)]
pub struct InMemoryVectorIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    entries: RwLock<Vec<IndexedChunk>>,
}

impl InMemoryVectorIndex {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn add(&self, chunks: Vec<Chunk>) -> Result<usize, DomainError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(DomainError::internal(format!(
                "Embedder {} returned {} vectors for {} chunks",
                self.embedder.provider_name(),
                vectors.len(),
                chunks.len()
            )));
        }

        let count = chunks.len();
        let mut entries = self.entries.write().await;
        entries.extend(
            chunks
                .into_iter()
                .zip(vectors)
                .map(|(chunk, vector)| IndexedChunk { chunk, vector }),
        );

        debug!(added = count, total = entries.len(), "Chunks indexed");
        Ok(count)
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredChunk>, DomainError> {
        let query_vector = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::internal("Embedder returned no vector for the query"))?;

        let entries = self.entries.read().await;

        let mut scored: Vec<ScoredChunk> = entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&query_vector, &entry.vector),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
