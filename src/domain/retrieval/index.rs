//! Vector index trait

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;

use crate::domain::ingestion::Chunk;
use crate::domain::DomainError;

/// A retrieved chunk with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Similarity search over indexed chunks
#[async_trait]
pub trait VectorIndex: Send + Sync + Debug {
    /// Index chunks, returning how many were added
    async fn add(&self, chunks: Vec<Chunk>) -> Result<usize, DomainError>;

    /// Top `top_k` chunks by similarity, best first
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredChunk>, DomainError>;

    /// Drop everything indexed so far
    async fn clear(&self) -> Result<(), DomainError>;

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
