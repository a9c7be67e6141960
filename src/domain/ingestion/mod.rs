//! Ingestion domain: supported file types, document loading and chunking

mod chunker;
mod file_type;
mod loader;

pub use chunker::{Chunk, ChunkingConfig, ChunkingStrategy};
pub use file_type::FileType;
pub use loader::{DocumentLoader, DocumentSegment};
