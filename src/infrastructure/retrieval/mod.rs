//! Retrieval infrastructure: local embeddings and an in-memory vector index

mod hashing;
mod in_memory;

pub use hashing::{HashingEmbedder, DEFAULT_DIMENSIONS};
pub use in_memory::InMemoryVectorIndex;
