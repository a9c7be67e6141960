//! Document question answering: load, split, index, retrieve, answer

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info, warn};

use super::prompts;
use crate::config::DocumentQaConfig;
use crate::domain::prompt::render_template;
use crate::domain::{
    BackendPool, Chunk, ChunkingStrategy, DocumentLoader, DocumentSegment, FallbackPolicy, FileType,
    ScoredChunk, SessionId, StagedWorkflow, Transition, VectorIndex, WorkflowEngine, WorkflowError,
    WorkflowState,
};

pub const NO_DOCUMENTS_MESSAGE: &str = "No documents loaded. Please upload a document first.";
pub const NO_CONTEXT_MESSAGE: &str = "No relevant context found for the query";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QaStep {
    Load,
    Split,
    Index,
    Retrieve,
    Answer,
    FallbackAnswer,
}

impl fmt::Display for QaStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::Split => "split",
            Self::Index => "index",
            Self::Retrieve => "retrieve",
            Self::Answer => "answer",
            Self::FallbackAnswer => "fallback_answer",
        };
        write!(f, "{}", name)
    }
}

/// Document to ingest before answering
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentUpload {
    pub path: PathBuf,
    pub declared_type: String,
}

/// Working artifact of the document QA workflow
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QaProgress {
    pub upload: Option<DocumentUpload>,
    pub segments: Vec<DocumentSegment>,
    pub chunks: Vec<Chunk>,
    pub context: Vec<ScoredChunk>,
}

/// Outcome of one question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QaResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QaResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            answer: None,
            error: Some(message.into()),
        }
    }

    fn from_state(state: WorkflowState<QaProgress>) -> Self {
        Self {
            success: state.is_success(),
            answer: state.final_result,
            error: state.error,
        }
    }
}

/// The document QA step graph
#[derive(Debug)]
pub struct DocumentQaWorkflow {
    pool: Arc<BackendPool>,
    loader: Arc<dyn DocumentLoader>,
    chunker: Arc<dyn ChunkingStrategy>,
    index: Arc<dyn VectorIndex>,
    config: DocumentQaConfig,
}

impl DocumentQaWorkflow {
    pub fn new(
        pool: Arc<BackendPool>,
        loader: Arc<dyn DocumentLoader>,
        chunker: Arc<dyn ChunkingStrategy>,
        index: Arc<dyn VectorIndex>,
        config: DocumentQaConfig,
    ) -> Self {
        Self {
            pool,
            loader,
            chunker,
            index,
            config,
        }
    }

    async fn load(&self, state: &mut WorkflowState<QaProgress>) -> Transition<QaStep> {
        let Some(upload) = state.step_output.upload.clone() else {
            state.fail("No document provided");
            return Transition::Done;
        };

        let file_type = match FileType::parse(&upload.declared_type) {
            Ok(file_type) => file_type,
            Err(e) => {
                state.fail(e.to_string());
                return Transition::Done;
            }
        };

        match self.loader.load(&upload.path, file_type).await {
            Ok(segments) if segments.is_empty() => {
                state.fail("No text could be extracted from the document");
                Transition::Done
            }
            Ok(segments) => {
                info!(path = %upload.path.display(), file_type = %file_type, segments = segments.len(), "Document loaded");
                state.step_output.segments = segments;
                Transition::Next(QaStep::Split)
            }
            Err(e) => {
                warn!(path = %upload.path.display(), error = %e, "Document loading failed");
                state.fail(e.to_string());
                Transition::Done
            }
        }
    }

    fn split(&self, state: &mut WorkflowState<QaProgress>) -> Transition<QaStep> {
        let config = self.config.chunking();
        let segments = std::mem::take(&mut state.step_output.segments);
        let mut chunks = Vec::new();

        for segment in &segments {
            match self.chunker.split(&segment.text, &config) {
                Ok(pieces) => {
                    for piece in pieces {
                        chunks.push(Chunk::new(piece, chunks.len(), segment.source.clone()));
                    }
                }
                Err(e) => {
                    state.fail(format!("Failed to split document: {}", e));
                    return Transition::Done;
                }
            }
        }

        if chunks.is_empty() {
            state.fail("No text could be extracted from the document");
            return Transition::Done;
        }

        info!(strategy = self.chunker.name(), chunks = chunks.len(), "Document split");
        state.step_output.chunks = chunks;
        Transition::Next(QaStep::Index)
    }

    async fn index(&self, state: &mut WorkflowState<QaProgress>) -> Transition<QaStep> {
        let chunks = std::mem::take(&mut state.step_output.chunks);

        if let Err(e) = self.index.clear().await {
            state.fail(format!("Failed to reset the document index: {}", e));
            return Transition::Done;
        }

        match self.index.add(chunks).await {
            Ok(count) => {
                info!(count, "Chunks indexed");
                Transition::Next(QaStep::Retrieve)
            }
            Err(e) => {
                state.fail(format!("Failed to index document: {}", e));
                Transition::Done
            }
        }
    }

    async fn retrieve(&self, state: &mut WorkflowState<QaProgress>) -> Transition<QaStep> {
        match self.index.search(&state.input, self.config.top_k).await {
            Ok(context) if context.is_empty() => {
                state.fail(NO_CONTEXT_MESSAGE);
                Transition::Done
            }
            Ok(context) => {
                info!(retrieved = context.len(), "Context retrieved");
                state.step_output.context = context;
                Transition::Next(QaStep::Answer)
            }
            Err(e) => {
                state.fail(format!("Failed to retrieve context: {}", e));
                Transition::Done
            }
        }
    }

    fn system_prompt(&self, context: &[ScoredChunk]) -> Result<String, String> {
        let context = context
            .iter()
            .map(|scored| scored.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut values = HashMap::new();
        values.insert("context".to_string(), context);
        render_template(prompts::DOCUMENT_QA_SYSTEM, &values).map_err(|e| e.to_string())
    }

    async fn answer(&self, state: &mut WorkflowState<QaProgress>) -> Transition<QaStep> {
        let system = match self.system_prompt(&state.step_output.context) {
            Ok(system) => system,
            Err(e) => {
                state.fail(format!("Failed to build answer prompt: {}", e));
                return Transition::Done;
            }
        };
        let Some(entry) = self.pool.first() else {
            state.fail("No language model backend is available");
            return Transition::Done;
        };
        state.active_backend = entry.name().to_string();

        let request = self.config.generation().request(Some(system.as_str()), state.input.clone());
        match entry.backend().generate(request).await {
            Ok(answer) if !answer.is_empty() => {
                state.finish(answer);
                Transition::Done
            }
            Ok(_) => {
                state.record_error(format!("{} returned an empty answer", entry.name()));
                Transition::Next(QaStep::FallbackAnswer)
            }
            Err(e) => {
                warn!(backend = entry.name(), error = %e, "Answer generation failed");
                state.record_error(e.to_string());
                Transition::Next(QaStep::FallbackAnswer)
            }
        }
    }

    /// Ask every backend except the one `answer` already tried
    async fn fallback_answer(&self, state: &mut WorkflowState<QaProgress>) -> Transition<QaStep> {
        let system = match self.system_prompt(&state.step_output.context) {
            Ok(system) => system,
            Err(e) => {
                state.fail(format!("Failed to build answer prompt: {}", e));
                return Transition::Done;
            }
        };

        let request = self.config.generation().request(Some(system.as_str()), state.input.clone());
        match FallbackPolicy::generate_after(&self.pool, &state.active_backend, &request, |text| !text.is_empty())
            .await
        {
            Ok(outcome) => {
                info!(backend = %outcome.backend, "Fallback backend answered");
                state.active_backend = outcome.backend;
                state.finish(outcome.text);
            }
            Err(e) => {
                error!(error = %e, "Answer generation failed on every backend");
                state.fail("Failed to generate answer with all available LLMs");
            }
        }

        Transition::Done
    }
}

#[async_trait]
impl StagedWorkflow for DocumentQaWorkflow {
    type Step = QaStep;
    type Output = QaProgress;

    fn name(&self) -> &'static str {
        "document_qa"
    }

    async fn run_step(&self, step: QaStep, state: &mut WorkflowState<QaProgress>) -> Transition<QaStep> {
        match step {
            QaStep::Load => self.load(state).await,
            QaStep::Split => self.split(state),
            QaStep::Index => self.index(state).await,
            QaStep::Retrieve => self.retrieve(state).await,
            QaStep::Answer => self.answer(state).await,
            QaStep::FallbackAnswer => self.fallback_answer(state).await,
        }
    }
}

/// Answers questions about the most recently uploaded document
#[derive(Debug)]
pub struct DocumentQaAgent {
    workflow: DocumentQaWorkflow,
    index: Arc<dyn VectorIndex>,
    engine: WorkflowEngine,
}

impl DocumentQaAgent {
    /// Fails with a configuration error when the pool has no backend
    pub fn new(
        pool: Arc<BackendPool>,
        loader: Arc<dyn DocumentLoader>,
        chunker: Arc<dyn ChunkingStrategy>,
        index: Arc<dyn VectorIndex>,
        config: DocumentQaConfig,
    ) -> Result<Self, WorkflowError> {
        pool.ensure_available()?;

        Ok(Self {
            workflow: DocumentQaWorkflow::new(pool, loader, chunker, index.clone(), config),
            index,
            engine: WorkflowEngine::new(),
        })
    }

    /// Ingest the document at `path`, replacing anything indexed before, then answer `query`
    pub async fn process_document_and_query(
        &self,
        path: impl AsRef<Path>,
        file_type: &str,
        query: &str,
    ) -> QaResult {
        let mut state = Self::state(query);
        state.step_output.upload = Some(DocumentUpload {
            path: path.as_ref().to_path_buf(),
            declared_type: file_type.to_string(),
        });

        self.run(QaStep::Load, state).await
    }

    /// Answer `query` against the documents already indexed
    pub async fn ask(&self, query: &str) -> QaResult {
        if self.index.is_empty().await {
            return QaResult::failure(NO_DOCUMENTS_MESSAGE);
        }

        self.run(QaStep::Retrieve, Self::state(query)).await
    }

    fn state(query: &str) -> WorkflowState<QaProgress> {
        WorkflowState::new(SessionId::generate().as_str(), query.trim())
    }

    async fn run(&self, entry: QaStep, mut state: WorkflowState<QaProgress>) -> QaResult {
        if state.input.is_empty() {
            return QaResult::failure("Question must not be empty");
        }

        if let Err(e) = self.engine.drive(&self.workflow, entry, &mut state).await {
            warn!(error = %e, "Document QA workflow aborted");
        }

        QaResult::from_state(state)
    }
}
