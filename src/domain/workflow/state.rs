use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Mutable record threaded through the steps of one workflow run.
///
/// `final_result` is only set once `complete` is true and `error` is empty; a
/// terminal failure is `complete` with `error` set and no result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState<O> {
    pub session_id: String,
    pub input: String,
    pub collected: HashMap<String, String>,
    pub step_output: O,
    pub active_backend: String,
    pub error: Option<String>,
    pub error_count: u32,
    pub complete: bool,
    pub final_result: Option<String>,
}

impl<O: Default> WorkflowState<O> {
    pub fn new(session_id: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            input: input.into(),
            collected: HashMap::new(),
            step_output: O::default(),
            active_backend: String::new(),
            error: None,
            error_count: 0,
            complete: false,
            final_result: None,
        }
    }
}

impl<O> WorkflowState<O> {
    /// Terminate successfully. An empty result is treated as a failure.
    pub fn finish(&mut self, result: impl Into<String>) {
        let result = result.into();
        if result.trim().is_empty() {
            self.fail("Workflow produced an empty result");
            return;
        }

        self.complete = true;
        self.error = None;
        self.final_result = Some(result);
    }

    /// Terminate with an error and no result
    pub fn fail(&mut self, message: impl Into<String>) {
        self.complete = true;
        self.error = Some(message.into());
        self.final_result = None;
    }

    /// Record a failed attempt without terminating
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn is_success(&self) -> bool {
        self.complete && self.error.is_none() && self.final_result.is_some()
    }
}
