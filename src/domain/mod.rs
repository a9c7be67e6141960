//! Domain layer - Core business logic and entities

pub mod backend;
pub mod drafting;
pub mod error;
pub mod ingestion;
pub mod llm;
pub mod prompt;
pub mod retrieval;
pub mod search;
pub mod session;
pub mod workflow;

pub use backend::{Backend, BackendEntry, BackendPool, FallbackOutcome, FallbackPolicy, GenerationSettings};
pub use drafting::{identify_document_type, DocumentType, FieldSpec};
pub use error::DomainError;
pub use ingestion::{Chunk, ChunkingConfig, ChunkingStrategy, DocumentLoader, DocumentSegment, FileType};
pub use llm::{
    FinishReason, LlmProvider, LlmRequest, LlmRequestBuilder, LlmResponse, Message, MessageRole, Usage,
};
pub use prompt::{PromptTemplate, TemplateError};
pub use retrieval::{cosine_similarity, EmbeddingProvider, ScoredChunk, VectorIndex};
pub use search::{SearchProvider, SearchResult, SummaryMode, ValidationDecision, ValidationPolicy};
pub use session::{ConversationTurn, SessionId, SessionRecord, SessionStore};
pub use workflow::{
    RunOutcome, StagedWorkflow, StepTrace, Transition, WorkflowEngine, WorkflowError, WorkflowRun,
    WorkflowState,
};
