//! Retrieval domain: embeddings and vector similarity search over chunks

mod embedding;
mod index;

pub use embedding::{cosine_similarity, EmbeddingProvider};
pub use index::{ScoredChunk, VectorIndex};
