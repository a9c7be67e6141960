//! Workflow error types

use thiserror::Error;

use crate::domain::DomainError;

/// Errors raised at the workflow boundary.
///
/// Step failures never surface here; they are recorded on the workflow state.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorkflowError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    #[error("Workflow '{workflow}' exceeded {limit} transitions")]
    TransitionLimit { workflow: String, limit: usize },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl WorkflowError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_session_id(id: impl Into<String>) -> Self {
        Self::InvalidSessionId(id.into())
    }

    pub fn transition_limit(workflow: impl Into<String>, limit: usize) -> Self {
        Self::TransitionLimit {
            workflow: workflow.into(),
            limit,
        }
    }

    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Configuration(_) => true,
            Self::Domain(e) => e.is_configuration(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            WorkflowError::transition_limit("clarification", 32).to_string(),
            "Workflow 'clarification' exceeded 32 transitions"
        );
        assert_eq!(
            WorkflowError::invalid_session_id("../etc").to_string(),
            "Invalid session id: ../etc"
        );
    }

    #[test]
    fn test_configuration_detection() {
        assert!(WorkflowError::configuration("no backend").is_configuration());
        assert!(WorkflowError::from(DomainError::configuration("no backend")).is_configuration());
        assert!(!WorkflowError::from(DomainError::storage("disk full")).is_configuration());
    }
}
