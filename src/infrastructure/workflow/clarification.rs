//! Legal clarification agent: keyword extraction, web search with bounded
//! retry across backends, then summarisation of what was found

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::prompts;
use crate::config::ClarificationConfig;
use crate::domain::prompt::render_template;
use crate::domain::search::{
    build_search_query, combine_content, fallback_keywords, parse_citations, parse_keywords,
};
use crate::domain::{
    BackendPool, ChunkingStrategy, FallbackPolicy, SearchProvider, SearchResult, SessionId,
    StagedWorkflow, SummaryMode, Transition, ValidationDecision, WorkflowEngine, WorkflowError,
    WorkflowState,
};
use crate::infrastructure::ingestion::RecursiveChunker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClarificationStep {
    ExtractKeywords,
    SearchWeb,
    ValidateResults,
    SwitchBackend,
    Summarize,
}

impl fmt::Display for ClarificationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ExtractKeywords => "extract_keywords",
            Self::SearchWeb => "search_web",
            Self::ValidateResults => "validate_results",
            Self::SwitchBackend => "switch_backend",
            Self::Summarize => "summarize",
        };
        write!(f, "{}", name)
    }
}

/// Working artifact of the clarification workflow
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClarificationProgress {
    pub mode: SummaryMode,
    pub keywords: Vec<String>,
    pub results: Vec<SearchResult>,
    pub citations: Vec<String>,
}

/// Structured outcome of one clarification request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClarificationResult {
    pub success: bool,
    pub query: String,
    pub keywords: Vec<String>,
    pub results: Vec<SearchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub citations: Vec<String>,
    pub summary_type: SummaryMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ClarificationResult {
    fn from_state(state: WorkflowState<ClarificationProgress>) -> Self {
        let success = state.is_success();
        let progress = state.step_output;

        Self {
            success,
            query: state.input,
            keywords: progress.keywords,
            results: progress.results,
            summary: state.final_result,
            citations: progress.citations,
            summary_type: progress.mode,
            llm_used: Some(state.active_backend).filter(|b| !b.is_empty()),
            error: state.error,
            timestamp: Utc::now(),
        }
    }
}

/// The clarification step graph
pub struct ClarificationWorkflow {
    pool: Arc<BackendPool>,
    search: Arc<dyn SearchProvider>,
    chunker: RecursiveChunker,
    config: ClarificationConfig,
}

impl fmt::Debug for ClarificationWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClarificationWorkflow")
            .field("pool", &self.pool)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ClarificationWorkflow {
    pub fn new(pool: Arc<BackendPool>, search: Arc<dyn SearchProvider>, config: ClarificationConfig) -> Self {
        Self {
            pool,
            search,
            chunker: RecursiveChunker::new(),
            config,
        }
    }

    fn render(template: &str, values: &[(&str, &str)]) -> Result<String, String> {
        let values: HashMap<String, String> = values
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        render_template(template, &values).map_err(|e| e.to_string())
    }

    async fn extract_keywords(&self, state: &mut WorkflowState<ClarificationProgress>) -> Transition<ClarificationStep> {
        let max = self.config.max_keywords.to_string();

        if let Ok(prompt) = Self::render(
            prompts::KEYWORD_EXTRACTION,
            &[("query", state.input.as_str()), ("max_keywords", max.as_str())],
        ) {
            let request = self.config.generation().request(None, prompt);

            for entry in self.pool.iter() {
                match entry.backend().generate(request.clone()).await {
                    Ok(text) => {
                        let keywords = parse_keywords(&text, self.config.max_keywords);
                        if keywords.is_empty() {
                            warn!(backend = entry.name(), "Backend returned no keywords");
                            continue;
                        }
                        info!(backend = entry.name(), keywords = ?keywords, "Keywords extracted");
                        state.step_output.keywords = keywords;
                        state.active_backend = entry.name().to_string();
                        return Transition::Next(ClarificationStep::SearchWeb);
                    }
                    Err(e) => warn!(backend = entry.name(), error = %e, "Keyword extraction failed"),
                }
            }
        }

        let keywords = fallback_keywords(&state.input, self.config.max_keywords);
        info!(keywords = ?keywords, "Using fallback keyword extraction");
        state.step_output.keywords = keywords;

        Transition::Next(ClarificationStep::SearchWeb)
    }

    async fn search_web(&self, state: &mut WorkflowState<ClarificationProgress>) -> Transition<ClarificationStep> {
        let query = build_search_query(&state.step_output.keywords, &self.config.sites);

        match self.search.search(&query, self.config.max_results).await {
            Ok(results) => {
                info!(query = %query, count = results.len(), "Search finished");
                state.step_output.results = results;
                state.clear_error();
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Search failed");
                state.step_output.results.clear();
                state.record_error(e.to_string());
            }
        }

        Transition::Next(ClarificationStep::ValidateResults)
    }

    fn validate_results(&self, state: &mut WorkflowState<ClarificationProgress>) -> Transition<ClarificationStep> {
        let count = state.step_output.results.len();

        match self.config.validation().evaluate(count, state.error_count) {
            ValidationDecision::Retry => {
                state.error_count += 1;
                info!(count, error_count = state.error_count, "Insufficient results, retrying with another backend");
                Transition::Next(ClarificationStep::SwitchBackend)
            }
            ValidationDecision::Accept => {
                info!(count, "Search results accepted");
                Transition::Next(ClarificationStep::Summarize)
            }
        }
    }

    fn switch_backend(&self, state: &mut WorkflowState<ClarificationProgress>) -> Transition<ClarificationStep> {
        if let Some(next) = self.pool.next_after(&state.active_backend) {
            info!(from = %state.active_backend, to = next.name(), "Switching backend");
            state.active_backend = next.name().to_string();
        }

        Transition::Next(ClarificationStep::SearchWeb)
    }

    /// Shorten long content to the first few chunks
    fn shorten(&self, content: String) -> String {
        if content.chars().count() <= self.config.max_content_length {
            return content;
        }

        match self.chunker.split(&content, &self.config.content_chunking()) {
            Ok(chunks) => chunks
                .into_iter()
                .take(self.config.max_content_chunks)
                .collect::<Vec<_>>()
                .join("\n\n"),
            Err(e) => {
                warn!(error = %e, "Could not chunk search content, truncating");
                content.chars().take(self.config.max_content_length).collect()
            }
        }
    }

    async fn summarize(&self, state: &mut WorkflowState<ClarificationProgress>) -> Transition<ClarificationStep> {
        if state.step_output.results.is_empty() {
            state.fail("No search results to summarize");
            return Transition::Done;
        }

        let content = combine_content(&state.step_output.results, self.config.min_snippet_length);
        if content.is_empty() {
            state.fail("No usable content found in search results");
            return Transition::Done;
        }
        let content = self.shorten(content);

        let template = match state.step_output.mode {
            SummaryMode::Comprehensive => prompts::COMPREHENSIVE_SUMMARY,
            SummaryMode::Quick => prompts::QUICK_ANSWER,
        };
        let prompt = match Self::render(template, &[("content", content.as_str()), ("query", state.input.as_str())]) {
            Ok(prompt) => prompt,
            Err(e) => {
                state.fail(format!("Failed to build summary prompt: {}", e));
                return Transition::Done;
            }
        };

        let min_length = self.config.min_summary_length;
        let request = self.config.generation().request(None, prompt);
        let summary = match FallbackPolicy::generate(&self.pool, &state.active_backend, &request, |text| {
            text.trim().chars().count() > min_length
        })
        .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Summarisation failed on every backend");
                state.fail("Failed to generate summary with all available LLMs");
                return Transition::Done;
            }
        };
        state.active_backend = summary.backend;

        if state.step_output.mode.extracts_citations() {
            state.step_output.citations = self.extract_citations(&content, &state.active_backend).await;
        }

        state.finish(summary.text);
        Transition::Done
    }

    async fn extract_citations(&self, content: &str, start: &str) -> Vec<String> {
        let prompt = match Self::render(prompts::CITATION_EXTRACTION, &[("content", content)]) {
            Ok(prompt) => prompt,
            Err(_) => return Vec::new(),
        };
        let request = self.config.generation().request(None, prompt);

        match FallbackPolicy::generate(&self.pool, start, &request, |text| !text.trim().is_empty()).await {
            Ok(outcome) => parse_citations(&outcome.text, self.config.max_citations),
            Err(e) => {
                warn!(error = %e, "Citation extraction failed");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl StagedWorkflow for ClarificationWorkflow {
    type Step = ClarificationStep;
    type Output = ClarificationProgress;

    fn name(&self) -> &'static str {
        "clarification"
    }

    async fn run_step(
        &self,
        step: ClarificationStep,
        state: &mut WorkflowState<ClarificationProgress>,
    ) -> Transition<ClarificationStep> {
        match step {
            ClarificationStep::ExtractKeywords => self.extract_keywords(state).await,
            ClarificationStep::SearchWeb => self.search_web(state).await,
            ClarificationStep::ValidateResults => self.validate_results(state),
            ClarificationStep::SwitchBackend => self.switch_backend(state),
            ClarificationStep::Summarize => self.summarize(state).await,
        }
    }
}

/// Stateless front of the clarification workflow
#[derive(Debug)]
pub struct ClarificationAgent {
    workflow: ClarificationWorkflow,
    engine: WorkflowEngine,
}

impl ClarificationAgent {
    /// Fails with a configuration error when the pool has no backend
    pub fn new(
        pool: Arc<BackendPool>,
        search: Arc<dyn SearchProvider>,
        config: ClarificationConfig,
    ) -> Result<Self, WorkflowError> {
        pool.ensure_available()?;

        Ok(Self {
            workflow: ClarificationWorkflow::new(pool, search, config),
            engine: WorkflowEngine::new(),
        })
    }

    /// Research `query` and summarise the findings
    pub async fn clarify(&self, query: &str, mode: SummaryMode) -> ClarificationResult {
        let mut state: WorkflowState<ClarificationProgress> =
            WorkflowState::new(SessionId::generate().as_str(), query.trim());
        state.step_output.mode = mode;

        if state.input.is_empty() {
            state.fail("Query must not be empty");
            return ClarificationResult::from_state(state);
        }

        if let Err(e) = self
            .engine
            .drive(&self.workflow, ClarificationStep::ExtractKeywords, &mut state)
            .await
        {
            warn!(error = %e, "Clarification workflow aborted");
        }

        ClarificationResult::from_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::search::MockSearchProvider;
    use crate::domain::{Backend, DomainError, RunOutcome};
    use mockall::Sequence;

    const SUMMARY: &str = "A void contract has no legal effect from the outset, while a voidable contract \
        is valid until one party elects to rescind it.";

    fn snippet(i: usize) -> SearchResult {
        SearchResult::new(
            format!(
                "Result {}: In Canadian law a voidable contract remains binding until rescinded by \
                 the party entitled to avoid it, for example after misrepresentation or undue influence.",
                i
            ),
            "DuckDuckGo Search",
        )
    }

    fn snippets(count: usize) -> Vec<SearchResult> {
        (0..count).map(snippet).collect()
    }

    fn pool(providers: Vec<(&str, Arc<MockLlmProvider>)>) -> Arc<BackendPool> {
        let pool = providers.into_iter().fold(BackendPool::new(), |pool, (name, provider)| {
            pool.with_backend(name, Backend::new(provider, "test-model"))
        });
        Arc::new(pool)
    }

    fn search_returning(batches: Vec<Vec<SearchResult>>) -> Arc<MockSearchProvider> {
        let mut search = MockSearchProvider::new();
        let mut seq = Sequence::new();
        for batch in batches {
            search
                .expect_search()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_, _| Ok(batch.clone()));
        }
        Arc::new(search)
    }

    #[tokio::test]
    async fn test_shortfall_switches_backend_and_searches_again() {
        let groq = Arc::new(MockLlmProvider::new("groq").then_response("void contract, voidable contract"));
        let gemini = Arc::new(MockLlmProvider::new("gemini").with_response(SUMMARY));
        let workflow = ClarificationWorkflow::new(
            pool(vec![("groq", groq.clone()), ("gemini", gemini.clone())]),
            search_returning(vec![snippets(1), snippets(2)]),
            ClarificationConfig::default(),
        );

        let mut state: WorkflowState<ClarificationProgress> =
            WorkflowState::new("s1", "void vs voidable contracts");
        state.step_output.mode = SummaryMode::Quick;
        let run = WorkflowEngine::new()
            .drive(&workflow, ClarificationStep::ExtractKeywords, &mut state)
            .await
            .unwrap();

        assert_eq!(run.outcome, RunOutcome::Completed);
        assert_eq!(
            run.steps(),
            vec![
                "extract_keywords",
                "search_web",
                "validate_results",
                "switch_backend",
                "search_web",
                "validate_results",
                "summarize"
            ]
        );
        assert_eq!(state.error_count, 1);
        assert_eq!(state.active_backend, "gemini");
        assert_eq!(state.step_output.results.len(), 2);
        assert_eq!(state.final_result.as_deref(), Some(SUMMARY));
        assert_eq!(groq.calls(), 1);
        assert_eq!(gemini.calls(), 1);
    }

    #[tokio::test]
    async fn test_summary_after_switch_tries_each_backend_once() {
        let groq = Arc::new(
            MockLlmProvider::new("groq")
                .then_response("void contract")
                .with_response(SUMMARY),
        );
        let gemini = Arc::new(MockLlmProvider::new("gemini").with_error("HTTP 503"));
        let agent = ClarificationAgent::new(
            pool(vec![("groq", groq.clone()), ("gemini", gemini.clone())]),
            search_returning(vec![snippets(1), snippets(2)]),
            ClarificationConfig::default(),
        )
        .unwrap();

        let result = agent.clarify("void contracts", SummaryMode::Quick).await;

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.llm_used.as_deref(), Some("groq"));
        // keywords and summary on groq, one failed summary attempt on gemini
        assert_eq!(groq.calls(), 2);
        assert_eq!(gemini.calls(), 1);
    }

    #[tokio::test]
    async fn test_persistent_shortfall_is_accepted_after_retry_budget() {
        let groq = Arc::new(MockLlmProvider::new("groq").with_response(SUMMARY));
        let gemini = Arc::new(MockLlmProvider::new("gemini").with_response(SUMMARY));
        let agent = ClarificationAgent::new(
            pool(vec![("groq", groq), ("gemini", gemini)]),
            search_returning(vec![snippets(1), snippets(1), snippets(1)]),
            ClarificationConfig::default(),
        )
        .unwrap();

        let result = agent.clarify("Is a verbal contract binding?", SummaryMode::Quick).await;

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.results.len(), 1);
        // two switches: groq -> gemini -> groq
        assert_eq!(result.llm_used.as_deref(), Some("groq"));
    }

    #[tokio::test]
    async fn test_search_errors_count_against_budget() {
        let mut search = MockSearchProvider::new();
        search
            .expect_search()
            .times(3)
            .returning(|_, _| Err(DomainError::search("HTTP 503")));

        let groq = Arc::new(MockLlmProvider::new("groq").with_response("tort, negligence"));
        let agent = ClarificationAgent::new(
            pool(vec![("groq", groq)]),
            Arc::new(search),
            ClarificationConfig::default(),
        )
        .unwrap();

        let result = agent.clarify("Negligence claims", SummaryMode::Quick).await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("No search results to summarize"));
        assert_eq!(result.keywords, vec!["tort", "negligence"]);
    }

    #[tokio::test]
    async fn test_keyword_fallback_when_backends_fail() {
        let groq = Arc::new(MockLlmProvider::new("groq").then_error("down").with_response(SUMMARY));
        let mut search = MockSearchProvider::new();
        search
            .expect_search()
            .withf(|query, max| {
                query == "contract void Canada site:canlii.org OR site:justice.gc.ca" && *max == 5
            })
            .times(1)
            .returning(|_, _| Ok(snippets(3)));

        let agent = ClarificationAgent::new(
            pool(vec![("groq", groq)]),
            Arc::new(search),
            ClarificationConfig::default(),
        )
        .unwrap();

        let result = agent.clarify("Is my contract void?", SummaryMode::Quick).await;

        assert!(result.success);
        assert_eq!(result.keywords, vec!["contract", "void", "Canada"]);
        assert_eq!(result.llm_used.as_deref(), Some("groq"));
    }

    #[tokio::test]
    async fn test_comprehensive_summary_extracts_citations() {
        let groq = Arc::new(
            MockLlmProvider::new("groq")
                .then_response("contract law")
                .then_response(SUMMARY)
                .then_response("1. Sale of Goods Act, RSO 1990, c S.1\n2. Smith v Jones, 2001 SCC 5\n- too short"),
        );
        let agent = ClarificationAgent::new(
            pool(vec![("groq", groq.clone())]),
            search_returning(vec![snippets(3)]),
            ClarificationConfig::default(),
        )
        .unwrap();

        let result = agent.clarify("contract law basics", SummaryMode::Comprehensive).await;

        assert!(result.success);
        assert_eq!(result.summary_type, SummaryMode::Comprehensive);
        assert_eq!(
            result.citations,
            vec!["Sale of Goods Act, RSO 1990, c S.1", "Smith v Jones, 2001 SCC 5"]
        );
        assert_eq!(groq.calls(), 3);
    }

    #[tokio::test]
    async fn test_short_summary_falls_back_to_next_backend() {
        let groq = Arc::new(MockLlmProvider::new("groq").then_response("tort").with_response("Too short."));
        let gemini = Arc::new(MockLlmProvider::new("gemini").with_response(SUMMARY));
        let agent = ClarificationAgent::new(
            pool(vec![("groq", groq), ("gemini", gemini)]),
            search_returning(vec![snippets(2)]),
            ClarificationConfig::default(),
        )
        .unwrap();

        let result = agent.clarify("tort law", SummaryMode::Quick).await;

        assert!(result.success);
        assert_eq!(result.summary.as_deref(), Some(SUMMARY));
        assert_eq!(result.llm_used.as_deref(), Some("gemini"));
    }

    #[tokio::test]
    async fn test_summary_failure_on_every_backend() {
        let groq = Arc::new(MockLlmProvider::new("groq").then_response("tort").with_error("HTTP 500"));
        let agent = ClarificationAgent::new(
            pool(vec![("groq", groq)]),
            search_returning(vec![snippets(2)]),
            ClarificationConfig::default(),
        )
        .unwrap();

        let result = agent.clarify("tort law", SummaryMode::Quick).await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Failed to generate summary with all available LLMs"));
        assert_eq!(result.results.len(), 2);
        assert!(result.summary.is_none());
    }

    #[tokio::test]
    async fn test_short_snippets_are_not_usable_content() {
        let groq = Arc::new(MockLlmProvider::new("groq").with_response("tort"));
        let agent = ClarificationAgent::new(
            pool(vec![("groq", groq)]),
            search_returning(vec![vec![SearchResult::new("tiny", "x"), SearchResult::new("small", "y")]]),
            ClarificationConfig::default(),
        )
        .unwrap();

        let result = agent.clarify("tort law", SummaryMode::Quick).await;

        assert_eq!(result.error.as_deref(), Some("No usable content found in search results"));
    }

    #[tokio::test]
    async fn test_long_content_is_shortened() {
        let groq = Arc::new(MockLlmProvider::new("groq").then_response("contract").with_response(SUMMARY));
        let long: Vec<SearchResult> = (0..5)
            .map(|i| SearchResult::new(format!("Paragraph {} ", i) + &"contract law text ".repeat(120), "src"))
            .collect();
        let config = ClarificationConfig {
            max_results: 5,
            ..ClarificationConfig::default()
        };
        let agent = ClarificationAgent::new(
            pool(vec![("groq", groq.clone())]),
            search_returning(vec![long]),
            config,
        )
        .unwrap();

        let result = agent.clarify("contract law", SummaryMode::Quick).await;

        assert!(result.success);
        let summary_prompt = &groq.prompts()[1];
        assert!(summary_prompt.chars().count() < 8000);
    }

    #[tokio::test]
    async fn test_empty_query() {
        let groq = Arc::new(MockLlmProvider::new("groq").with_response(SUMMARY));
        let agent = ClarificationAgent::new(
            pool(vec![("groq", groq.clone())]),
            Arc::new(MockSearchProvider::new()),
            ClarificationConfig::default(),
        )
        .unwrap();

        let result = agent.clarify("   ", SummaryMode::Quick).await;

        assert!(!result.success);
        assert_eq!(groq.calls(), 0);
    }

    #[test]
    fn test_empty_pool_is_configuration_error() {
        let error = ClarificationAgent::new(
            Arc::new(BackendPool::new()),
            Arc::new(MockSearchProvider::new()),
            ClarificationConfig::default(),
        )
        .unwrap_err();

        assert!(error.is_configuration());
    }
}
