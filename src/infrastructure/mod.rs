//! Infrastructure layer - External service implementations

pub mod ingestion;
pub mod llm;
pub mod logging;
pub mod retrieval;
pub mod search;
pub mod session;
pub mod workflow;
