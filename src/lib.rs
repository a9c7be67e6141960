//! Legal Assist
//!
//! Legal assistance agents built on a shared staged-workflow engine:
//! - Conversational drafting of NDAs, contracts and lease agreements
//! - Legal clarification through web search and summarisation
//! - Question answering over an uploaded document
//!
//! Every agent runs against an ordered pool of LLM backends and falls back to
//! the next backend when one fails.

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use domain::{BackendPool, EmbeddingProvider};
use infrastructure::{
    ingestion::{FileDocumentLoader, RecursiveChunker},
    llm::{BackendFactory, HttpClient},
    retrieval::{HashingEmbedder, InMemoryVectorIndex},
    search::DuckDuckGoSearch,
    session::FileSessionStore,
    workflow::{ClarificationAgent, DocumentQaAgent, DraftingAgent},
};
use tracing::info;

/// Build the backend pool from configuration, reading API keys from the environment
pub fn create_backend_pool(config: &AppConfig) -> Arc<BackendPool> {
    let pool = BackendFactory::build_pool_from_env(&config.backends());
    info!(backends = ?pool.names(), "Backend pool initialized");
    Arc::new(pool)
}

/// Drafting agent persisting sessions under the configured directory
pub fn create_drafting_agent(config: &AppConfig) -> anyhow::Result<DraftingAgent> {
    let store = Arc::new(FileSessionStore::new(&config.drafting.sessions_dir)?);
    let agent = DraftingAgent::new(create_backend_pool(config), store, config.drafting.generation())?;
    Ok(agent)
}

/// Clarification agent searching DuckDuckGo
pub fn create_clarification_agent(config: &AppConfig) -> anyhow::Result<ClarificationAgent> {
    let client = HttpClient::with_timeout(Duration::from_secs(config.search.timeout_secs))?;
    let search = Arc::new(DuckDuckGoSearch::with_endpoint(client, config.search.endpoint.clone()));

    let agent = ClarificationAgent::new(create_backend_pool(config), search, config.clarification.clone())?;
    Ok(agent)
}

/// Document QA agent with a local hashing embedder and in-memory index
pub fn create_document_qa_agent(config: &AppConfig) -> anyhow::Result<DocumentQaAgent> {
    let embedder: Arc<dyn EmbeddingProvider> =
        Arc::new(HashingEmbedder::new(config.document_qa.embedding_dimensions));

    let agent = DocumentQaAgent::new(
        create_backend_pool(config),
        Arc::new(FileDocumentLoader::new()),
        Arc::new(RecursiveChunker::new()),
        Arc::new(InMemoryVectorIndex::new(embedder)),
        config.document_qa.clone(),
    )?;
    Ok(agent)
}
