//! Staged workflow engine
//!
//! A workflow is a small state machine: an enum of steps and a transition
//! function that mutates a [`WorkflowState`] and names the next step. The
//! [`WorkflowEngine`] drives the loop until a step pauses for user input or
//! finishes, and bounds the number of transitions so a faulty graph cannot
//! spin forever.

mod engine;
mod error;
mod state;

pub use engine::{RunOutcome, StagedWorkflow, StepTrace, Transition, WorkflowEngine, WorkflowRun};
pub use error::WorkflowError;
pub use state::WorkflowState;
