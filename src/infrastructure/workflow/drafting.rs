//! Conversational document drafting agent
//!
//! Each call to [`DraftingAgent::respond`] is one user turn: the session is
//! loaded, the workflow runs until it needs the next answer (or finishes) and
//! the session is written back.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use super::prompts;
use crate::domain::drafting::{
    format_collected_info, identify_document_type, render_document, CLARIFICATION_QUESTION,
    DATE_FORMAT,
};
use crate::domain::prompt::render_template;
use crate::domain::session::{ConversationTurn, SessionId, SessionRecord, SessionStore};
use crate::domain::{
    BackendPool, DocumentType, FallbackPolicy, GenerationSettings, StagedWorkflow, Transition,
    WorkflowEngine, WorkflowError, WorkflowState,
};

pub const LLM_MARKER_PREFIX: &str = "[Generated by LLM";
pub const TEMPLATE_MARKER: &str = "[Generated by predefined template]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftingStep {
    IdentifyDocument,
    AskQuestion,
    ProcessAnswer,
    GenerateDocument,
}

impl fmt::Display for DraftingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::IdentifyDocument => "identify_document",
            Self::AskQuestion => "ask_question",
            Self::ProcessAnswer => "process_answer",
            Self::GenerateDocument => "generate_document",
        };
        write!(f, "{}", name)
    }
}

/// Working artifact of the drafting workflow
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftingProgress {
    pub document_type: Option<DocumentType>,
    pub current_question: Option<String>,
    pub pending_field: Option<String>,
    pub conversation_history: Vec<ConversationTurn>,
}

/// What the caller sees after one turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftingTurn {
    pub session_id: String,
    pub document_type: Option<DocumentType>,
    pub is_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DraftingTurn {
    fn from_record(record: &SessionRecord) -> Self {
        Self {
            session_id: record.session_id.to_string(),
            document_type: record.document_type,
            is_complete: record.is_complete,
            current_question: record.current_question.clone(),
            final_document: record.final_document.clone(),
            error_message: record.error_message.clone(),
        }
    }
}

/// The drafting step graph
#[derive(Debug)]
pub struct DraftingWorkflow {
    pool: Arc<BackendPool>,
    generation: GenerationSettings,
}

impl DraftingWorkflow {
    pub fn new(pool: Arc<BackendPool>, generation: GenerationSettings) -> Self {
        Self { pool, generation }
    }

    fn identify(state: &mut WorkflowState<DraftingProgress>) -> Transition<DraftingStep> {
        if state.step_output.document_type.is_some() {
            return Transition::Next(DraftingStep::AskQuestion);
        }

        match identify_document_type(&state.input) {
            Some(doc_type) => {
                info!(session_id = %state.session_id, document_type = %doc_type, "Document type identified");
                state.step_output.document_type = Some(doc_type);
                Transition::Next(DraftingStep::AskQuestion)
            }
            None => {
                state.step_output.current_question = Some(CLARIFICATION_QUESTION.to_string());
                state.step_output.pending_field = None;
                Transition::Pause
            }
        }
    }

    fn ask(state: &mut WorkflowState<DraftingProgress>) -> Transition<DraftingStep> {
        let Some(doc_type) = state.step_output.document_type else {
            return Transition::Next(DraftingStep::IdentifyDocument);
        };

        match doc_type.next_missing_field(&state.collected) {
            Some(field) => {
                state.step_output.current_question = Some(field.prompt());
                state.step_output.pending_field = Some(field.key.to_string());
                Transition::Pause
            }
            None => {
                state.step_output.current_question = None;
                state.step_output.pending_field = None;
                Transition::Next(DraftingStep::GenerateDocument)
            }
        }
    }

    fn process_answer(state: &mut WorkflowState<DraftingProgress>) -> Transition<DraftingStep> {
        let answer = state.input.trim().to_string();
        if answer.is_empty() {
            return Transition::Pause;
        }

        let progress = &mut state.step_output;
        let (Some(doc_type), Some(field)) = (progress.document_type, progress.pending_field.take())
        else {
            return Transition::Next(DraftingStep::AskQuestion);
        };

        if doc_type.field(&field).is_none() {
            warn!(field = %field, document_type = %doc_type, "Pending field is not part of the schema");
            return Transition::Next(DraftingStep::AskQuestion);
        }

        let question = progress.current_question.take().unwrap_or_default();
        progress.conversation_history.push(ConversationTurn {
            question,
            answer: answer.clone(),
        });
        state.collected.insert(field, answer);

        Transition::Next(DraftingStep::AskQuestion)
    }

    async fn generate(&self, state: &mut WorkflowState<DraftingProgress>) -> Transition<DraftingStep> {
        let Some(doc_type) = state.step_output.document_type else {
            state.fail("Cannot generate a document before its type is known");
            return Transition::Done;
        };

        let date = Local::now().format(DATE_FORMAT).to_string();

        match self.generate_with_llm(doc_type, &state.collected, &date, &state.active_backend).await {
            Ok((text, backend)) => {
                state.finish(format!("{}\n\n{} ({})]", text, LLM_MARKER_PREFIX, backend));
                state.active_backend = backend;
            }
            Err(e) => {
                warn!(error = %e, "LLM document generation failed, using predefined template");
                match render_document(doc_type, &state.collected, &date) {
                    Ok(document) => state.finish(format!("{}\n\n{}", document, TEMPLATE_MARKER)),
                    Err(e) => state.fail(format!("Error generating document: {}", e)),
                }
            }
        }

        Transition::Done
    }

    async fn generate_with_llm(
        &self,
        doc_type: DocumentType,
        collected: &HashMap<String, String>,
        date: &str,
        start: &str,
    ) -> Result<(String, String), WorkflowError> {
        let values = HashMap::from([
            ("document_type".to_string(), doc_type.display_name().to_string()),
            ("collected_info".to_string(), format_collected_info(doc_type, collected)),
            ("date".to_string(), date.to_string()),
        ]);
        let prompt = render_template(prompts::DOCUMENT_GENERATION, &values)
            .map_err(|e| WorkflowError::configuration(e.to_string()))?;

        let request = self.generation.request(Some(prompts::DRAFTING_SYSTEM), prompt);
        let outcome = FallbackPolicy::generate(&self.pool, start, &request, is_usable_document).await?;

        Ok((outcome.text, outcome.backend))
    }
}

/// Generated text counts when it is non-empty and not an error report
fn is_usable_document(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && !text.to_lowercase().starts_with("error")
}

#[async_trait]
impl StagedWorkflow for DraftingWorkflow {
    type Step = DraftingStep;
    type Output = DraftingProgress;

    fn name(&self) -> &'static str {
        "drafting"
    }

    async fn run_step(
        &self,
        step: DraftingStep,
        state: &mut WorkflowState<DraftingProgress>,
    ) -> Transition<DraftingStep> {
        match step {
            DraftingStep::IdentifyDocument => Self::identify(state),
            DraftingStep::AskQuestion => Self::ask(state),
            DraftingStep::ProcessAnswer => Self::process_answer(state),
            DraftingStep::GenerateDocument => self.generate(state).await,
        }
    }
}

/// Session-backed front of the drafting workflow
#[derive(Debug)]
pub struct DraftingAgent {
    workflow: DraftingWorkflow,
    store: Arc<dyn SessionStore>,
    engine: WorkflowEngine,
}

impl DraftingAgent {
    /// Fails with a configuration error when the pool has no backend
    pub fn new(
        pool: Arc<BackendPool>,
        store: Arc<dyn SessionStore>,
        generation: GenerationSettings,
    ) -> Result<Self, WorkflowError> {
        pool.ensure_available()?;

        Ok(Self {
            workflow: DraftingWorkflow::new(pool, generation),
            store,
            engine: WorkflowEngine::new(),
        })
    }

    /// Handle one user turn for `session_id`
    pub async fn respond(&self, session_id: &str, input: &str) -> Result<DraftingTurn, WorkflowError> {
        let id = SessionId::new(session_id)?;
        let mut record = self.store.get_or_create(&id).await;

        if record.is_complete {
            return Ok(DraftingTurn::from_record(&record));
        }

        let entry = match (&record.document_type, &record.pending_field) {
            (None, _) => DraftingStep::IdentifyDocument,
            (Some(_), Some(_)) => DraftingStep::ProcessAnswer,
            (Some(_), None) => DraftingStep::AskQuestion,
        };

        let mut state = Self::state_from_record(&record, input);
        let run = self.engine.drive(&self.workflow, entry, &mut state).await;

        Self::apply_state(&mut record, state);
        let record = self.store.save(record).await?;
        run?;

        Ok(DraftingTurn::from_record(&record))
    }

    /// Stored record of a session, created if unseen
    pub async fn session(&self, session_id: &str) -> Result<SessionRecord, WorkflowError> {
        let id = SessionId::new(session_id)?;
        Ok(self.store.get_or_create(&id).await)
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<bool, WorkflowError> {
        let id = SessionId::new(session_id)?;
        Ok(self.store.delete(&id).await?)
    }

    pub async fn list_sessions(&self) -> Result<Vec<SessionId>, WorkflowError> {
        Ok(self.store.list().await?)
    }

    fn state_from_record(record: &SessionRecord, input: &str) -> WorkflowState<DraftingProgress> {
        let mut state = WorkflowState::new(record.session_id.as_str(), input);
        state.collected = record.collected_info.clone();
        state.step_output = DraftingProgress {
            document_type: record.document_type,
            current_question: record.current_question.clone(),
            pending_field: record.pending_field.clone(),
            conversation_history: record.conversation_history.clone(),
        };
        state
    }

    fn apply_state(record: &mut SessionRecord, state: WorkflowState<DraftingProgress>) {
        let progress = state.step_output;

        record.document_type = progress.document_type;
        record.collected_info = state.collected;
        record.conversation_history = progress.conversation_history;
        record.is_complete = state.complete;
        record.final_document = state.final_result;
        record.error_message = state.error;

        if state.complete {
            record.current_question = None;
            record.pending_field = None;
        } else {
            record.current_question = progress.current_question;
            record.pending_field = progress.pending_field;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::Backend;
    use crate::infrastructure::session::InMemorySessionStore;

    fn pool(providers: Vec<(&str, Arc<MockLlmProvider>)>) -> Arc<BackendPool> {
        let pool = providers.into_iter().fold(BackendPool::new(), |pool, (name, provider)| {
            pool.with_backend(name, Backend::new(provider, "test-model"))
        });
        Arc::new(pool)
    }

    fn agent(providers: Vec<(&str, Arc<MockLlmProvider>)>) -> DraftingAgent {
        DraftingAgent::new(
            pool(providers),
            Arc::new(InMemorySessionStore::new()),
            GenerationSettings::default(),
        )
        .unwrap()
    }

    fn failing(name: &'static str) -> Arc<MockLlmProvider> {
        Arc::new(MockLlmProvider::new(name).with_error("HTTP 503"))
    }

    const NDA_ANSWERS: [&str; 8] = [
        "Alice Corp",
        "Bob LLC",
        "Evaluating a partnership",
        "2 years",
        "Ontario",
        "1 King St, Toronto",
        "2 Queen St, Ottawa",
        "Public information",
    ];

    async fn answer_all(agent: &DraftingAgent, session: &str, answers: &[&str]) -> DraftingTurn {
        let mut turn = None;
        for answer in answers {
            turn = Some(agent.respond(session, answer).await.unwrap());
        }
        turn.unwrap()
    }

    #[tokio::test]
    async fn test_nda_request_asks_for_disclosing_party() {
        let groq = Arc::new(MockLlmProvider::new("groq").with_response("unused"));
        let agent = agent(vec![("groq", groq.clone())]);

        let turn = agent.respond("s1", "Draft an NDA between Alice and Bob").await.unwrap();

        assert_eq!(turn.document_type, Some(DocumentType::Nda));
        assert!(!turn.is_complete);
        assert!(turn.current_question.unwrap().starts_with("Who is the Disclosing Party"));
        assert_eq!(groq.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_request_asks_for_clarification() {
        let agent = agent(vec![("groq", failing("groq"))]);

        let turn = agent.respond("s1", "Help me with some paperwork").await.unwrap();
        assert_eq!(turn.document_type, None);
        assert!(!turn.is_complete);
        assert_eq!(turn.current_question.as_deref(), Some(CLARIFICATION_QUESTION));

        let turn = agent.respond("s1", "A rental agreement please").await.unwrap();
        assert_eq!(turn.document_type, Some(DocumentType::Lease));
        assert_eq!(turn.current_question, Some(DocumentType::Lease.fields()[0].prompt()));
    }

    #[tokio::test]
    async fn test_asks_every_field_in_schema_order() {
        let groq = Arc::new(MockLlmProvider::new("groq").with_response("SERVICE AGREEMENT ..."));
        let agent = agent(vec![("groq", groq.clone())]);
        let fields = DocumentType::Contract.fields();

        let mut turn = agent.respond("s1", "I need a contract").await.unwrap();
        let mut asked = Vec::new();

        for (i, field) in fields.iter().enumerate() {
            assert!(!turn.is_complete, "completed before all fields were answered");
            let question = turn.current_question.clone().unwrap();
            assert_eq!(question, field.prompt());
            asked.push(question);

            turn = agent.respond("s1", &format!("answer {}", i)).await.unwrap();
        }

        assert!(turn.is_complete);
        assert_eq!(asked.len(), fields.len());
        assert_eq!(groq.calls(), 1);

        let document = turn.final_document.unwrap();
        assert!(document.starts_with("SERVICE AGREEMENT ..."));
        assert!(document.ends_with("[Generated by LLM (groq)]"));

        let record = agent.session("s1").await.unwrap();
        assert_eq!(record.conversation_history.len(), fields.len());
        assert_eq!(record.collected_info["party_1"], "answer 0");
        assert_eq!(record.conversation_history[0].question, fields[0].prompt());
    }

    #[tokio::test]
    async fn test_falls_back_to_second_backend() {
        let gemini = Arc::new(MockLlmProvider::new("gemini").with_response("NON-DISCLOSURE AGREEMENT"));
        let agent = agent(vec![("groq", failing("groq")), ("gemini", gemini.clone())]);

        agent.respond("s1", "nda").await.unwrap();
        let turn = answer_all(&agent, "s1", &NDA_ANSWERS).await;

        assert!(turn.is_complete);
        assert!(turn.final_document.unwrap().ends_with("[Generated by LLM (gemini)]"));
        assert_eq!(gemini.calls(), 1);
    }

    #[tokio::test]
    async fn test_template_fallback_when_all_backends_fail() {
        let agent = agent(vec![("groq", failing("groq")), ("gemini", failing("gemini"))]);

        agent.respond("s1", "nda").await.unwrap();
        let turn = answer_all(&agent, "s1", &NDA_ANSWERS).await;

        assert!(turn.is_complete);
        assert!(turn.error_message.is_none());
        let document = turn.final_document.unwrap();
        assert!(document.contains("Alice Corp (Address: 1 King St, Toronto)"));
        assert!(document.contains("Additional exclusions: Public information"));
        assert!(document.ends_with(TEMPLATE_MARKER));
    }

    #[tokio::test]
    async fn test_error_reply_is_not_usable() {
        let groq = Arc::new(MockLlmProvider::new("groq").with_response("Error: quota exceeded"));
        let agent = agent(vec![("groq", groq)]);

        agent.respond("s1", "lease").await.unwrap();
        let answers = ["Landlord Inc", "Tenant", "1 Main St", "$1,500", "12 months", "$1,500", "May 1"];
        let turn = answer_all(&agent, "s1", &answers).await;

        assert!(turn.final_document.unwrap().ends_with(TEMPLATE_MARKER));
    }

    #[tokio::test]
    async fn test_completed_session_replays_document() {
        let agent = agent(vec![("groq", Arc::new(MockLlmProvider::new("groq").with_response("DOC")))]);

        agent.respond("s1", "nda").await.unwrap();
        let done = answer_all(&agent, "s1", &NDA_ANSWERS).await;
        let replay = agent.respond("s1", "anything else?").await.unwrap();

        assert_eq!(replay, done);
    }

    #[tokio::test]
    async fn test_empty_answer_repeats_question() {
        let agent = agent(vec![("groq", failing("groq"))]);

        let first = agent.respond("s1", "lease").await.unwrap();
        let again = agent.respond("s1", "   ").await.unwrap();

        assert_eq!(first.current_question, again.current_question);
        assert!(agent.session("s1").await.unwrap().collected_info.is_empty());
    }

    #[tokio::test]
    async fn test_progress_is_persisted_between_turns() {
        let agent = agent(vec![("groq", failing("groq"))]);

        agent.respond("s1", "lease").await.unwrap();
        agent.respond("s1", "Property Management LLC").await.unwrap();

        let record = agent.session("s1").await.unwrap();
        assert_eq!(record.collected_info["landlord"], "Property Management LLC");
        assert_eq!(record.pending_field.as_deref(), Some("tenant"));
        assert_eq!(record.conversation_history.len(), 1);
    }

    #[tokio::test]
    async fn test_identification_is_idempotent() {
        let workflow = DraftingWorkflow::new(pool(vec![("groq", failing("groq"))]), GenerationSettings::default());
        let mut state: WorkflowState<DraftingProgress> = WorkflowState::new("s1", "actually a lease");
        state.step_output.document_type = Some(DocumentType::Nda);
        let before = state.clone();

        let transition = workflow.run_step(DraftingStep::IdentifyDocument, &mut state).await;

        assert_eq!(transition, Transition::Next(DraftingStep::AskQuestion));
        assert_eq!(state, before);
    }

    #[tokio::test]
    async fn test_sessions_are_listed_and_deleted() {
        let agent = agent(vec![("groq", failing("groq"))]);
        agent.respond("a", "nda").await.unwrap();
        agent.respond("b", "lease").await.unwrap();

        let ids: Vec<String> = agent.list_sessions().await.unwrap().iter().map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert!(agent.delete_session("a").await.unwrap());
        assert_eq!(agent.list_sessions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_session_id() {
        let agent = agent(vec![("groq", failing("groq"))]);
        let error = agent.respond("../etc/passwd", "nda").await.unwrap_err();
        assert_eq!(error, WorkflowError::invalid_session_id("../etc/passwd"));
    }

    #[test]
    fn test_empty_pool_is_configuration_error() {
        let error = DraftingAgent::new(
            Arc::new(BackendPool::new()),
            Arc::new(InMemorySessionStore::new()),
            GenerationSettings::default(),
        )
        .unwrap_err();

        assert!(error.is_configuration());
    }
}
