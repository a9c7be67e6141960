use std::fmt::Display;
use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{WorkflowError, WorkflowState};

/// What a step asks the engine to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<S> {
    /// Continue with the given step
    Next(S),
    /// Stop and wait for the next user turn
    Pause,
    /// The workflow reached a terminal state
    Done,
}

/// A fixed graph of named steps over a [`WorkflowState`]
#[async_trait]
pub trait StagedWorkflow: Send + Sync {
    type Step: Copy + Display + Send + Sync;
    type Output: Send;

    fn name(&self) -> &'static str;

    /// Run one step, mutate the state and name the transition.
    ///
    /// Steps record their own failures on the state instead of returning them.
    async fn run_step(
        &self,
        step: Self::Step,
        state: &mut WorkflowState<Self::Output>,
    ) -> Transition<Self::Step>;
}

/// Timing of a single executed step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepTrace {
    pub step: String,
    pub execution_time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Paused,
    Completed,
}

/// Result of driving a workflow until it pauses or completes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowRun {
    pub outcome: RunOutcome,
    pub trace: Vec<StepTrace>,
    pub execution_time_ms: u64,
}

impl WorkflowRun {
    pub fn steps(&self) -> Vec<&str> {
        self.trace.iter().map(|t| t.step.as_str()).collect()
    }
}

/// Driver loop for [`StagedWorkflow`] implementations
#[derive(Debug, Clone, Copy)]
pub struct WorkflowEngine {
    max_transitions: usize,
}

impl Default for WorkflowEngine {
    fn default() -> Self {
        Self {
            max_transitions: Self::DEFAULT_MAX_TRANSITIONS,
        }
    }
}

impl WorkflowEngine {
    pub const DEFAULT_MAX_TRANSITIONS: usize = 32;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_transitions(mut self, max_transitions: usize) -> Self {
        self.max_transitions = max_transitions.max(1);
        self
    }

    /// Run `workflow` from `entry` until a step pauses or finishes.
    ///
    /// If the step budget runs out the state is failed and
    /// [`WorkflowError::TransitionLimit`] is returned.
    pub async fn drive<W: StagedWorkflow>(
        &self,
        workflow: &W,
        entry: W::Step,
        state: &mut WorkflowState<W::Output>,
    ) -> Result<WorkflowRun, WorkflowError> {
        let started = Instant::now();
        let mut trace = Vec::new();
        let mut step = entry;

        info!(workflow = workflow.name(), session_id = %state.session_id, entry = %entry, "Workflow started");

        for _ in 0..self.max_transitions {
            let step_started = Instant::now();
            let transition = workflow.run_step(step, state).await;
            let elapsed = step_started.elapsed().as_millis() as u64;

            trace.push(StepTrace {
                step: step.to_string(),
                execution_time_ms: elapsed,
            });

            match transition {
                Transition::Next(next) => {
                    debug!(workflow = workflow.name(), from = %step, to = %next, elapsed_ms = elapsed, "Step finished");
                    step = next;
                }
                Transition::Pause => {
                    info!(workflow = workflow.name(), step = %step, "Workflow paused awaiting input");
                    return Ok(WorkflowRun {
                        outcome: RunOutcome::Paused,
                        trace,
                        execution_time_ms: started.elapsed().as_millis() as u64,
                    });
                }
                Transition::Done => {
                    if !state.complete {
                        warn!(workflow = workflow.name(), step = %step, "Workflow ended without a terminal state");
                        state.fail(format!("Workflow ended at step '{}' without a result", step));
                    }
                    info!(
                        workflow = workflow.name(),
                        success = state.is_success(),
                        steps = trace.len(),
                        "Workflow completed"
                    );
                    return Ok(WorkflowRun {
                        outcome: RunOutcome::Completed,
                        trace,
                        execution_time_ms: started.elapsed().as_millis() as u64,
                    });
                }
            }
        }

        let error = WorkflowError::transition_limit(workflow.name(), self.max_transitions);
        warn!(workflow = workflow.name(), error = %error, "Aborting workflow");
        state.fail(error.to_string());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum CountStep {
        Increment,
        Check,
    }

    impl fmt::Display for CountStep {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Increment => write!(f, "increment"),
                Self::Check => write!(f, "check"),
            }
        }
    }

    /// Counts to `target`, pausing once at `pause_at`
    struct Counter {
        target: u32,
        pause_at: Option<u32>,
    }

    #[async_trait]
    impl StagedWorkflow for Counter {
        type Step = CountStep;
        type Output = u32;

        fn name(&self) -> &'static str {
            "counter"
        }

        async fn run_step(&self, step: CountStep, state: &mut WorkflowState<u32>) -> Transition<CountStep> {
            match step {
                CountStep::Increment => {
                    state.step_output += 1;
                    Transition::Next(CountStep::Check)
                }
                CountStep::Check => {
                    if Some(state.step_output) == self.pause_at && state.input.is_empty() {
                        return Transition::Pause;
                    }
                    if state.step_output >= self.target {
                        state.finish(state.step_output.to_string());
                        Transition::Done
                    } else {
                        Transition::Next(CountStep::Increment)
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn test_drive_to_completion() {
        let workflow = Counter { target: 2, pause_at: None };
        let mut state = WorkflowState::new("s", "go");

        let run = WorkflowEngine::new()
            .drive(&workflow, CountStep::Increment, &mut state)
            .await
            .unwrap();

        assert_eq!(run.outcome, RunOutcome::Completed);
        assert_eq!(run.steps(), vec!["increment", "check", "increment", "check"]);
        assert_eq!(state.final_result.as_deref(), Some("2"));
        assert!(state.is_success());
    }

    #[tokio::test]
    async fn test_pause_and_resume() {
        let workflow = Counter { target: 3, pause_at: Some(1) };
        let mut state = WorkflowState::new("s", "");
        let engine = WorkflowEngine::new();

        let run = engine.drive(&workflow, CountStep::Increment, &mut state).await.unwrap();
        assert_eq!(run.outcome, RunOutcome::Paused);
        assert!(!state.complete);

        state.input = "continue".to_string();
        let run = engine.drive(&workflow, CountStep::Check, &mut state).await.unwrap();
        assert_eq!(run.outcome, RunOutcome::Completed);
        assert_eq!(state.step_output, 3);
    }

    #[tokio::test]
    async fn test_transition_limit() {
        let workflow = Counter { target: 100, pause_at: None };
        let mut state = WorkflowState::new("s", "go");

        let err = WorkflowEngine::new()
            .with_max_transitions(10)
            .drive(&workflow, CountStep::Increment, &mut state)
            .await
            .unwrap_err();

        assert_eq!(err, WorkflowError::transition_limit("counter", 10));
        assert!(state.complete);
        assert!(state.error.is_some());
    }

    struct Stalls;

    #[async_trait]
    impl StagedWorkflow for Stalls {
        type Step = CountStep;
        type Output = u32;

        fn name(&self) -> &'static str {
            "stalls"
        }

        async fn run_step(&self, _step: CountStep, _state: &mut WorkflowState<u32>) -> Transition<CountStep> {
            Transition::Done
        }
    }

    #[tokio::test]
    async fn test_done_without_result_is_failure() {
        let mut state = WorkflowState::new("s", "go");
        WorkflowEngine::new()
            .drive(&Stalls, CountStep::Check, &mut state)
            .await
            .unwrap();

        assert!(state.complete);
        assert!(!state.is_success());
    }
}
