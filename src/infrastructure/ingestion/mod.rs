//! Document ingestion infrastructure: loading files and splitting them into chunks

pub mod chunkers;
mod loader;

pub use chunkers::RecursiveChunker;
pub use loader::FileDocumentLoader;
