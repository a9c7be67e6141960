//! Session record entity

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::drafting::DocumentType;
use crate::domain::workflow::WorkflowError;

/// Maximum length for session IDs
pub const MAX_SESSION_ID_LENGTH: usize = 128;

/// Session IDs end up in file names, so only a safe character set is allowed
static ID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Validated session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Result<Self, WorkflowError> {
        let id = id.into();
        validate_session_id(&id)?;
        Ok(Self(id))
    }

    /// Fresh random session ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = WorkflowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validate a session ID string
pub fn validate_session_id(id: &str) -> Result<(), WorkflowError> {
    if id.is_empty() || id.len() > MAX_SESSION_ID_LENGTH || !ID_PATTERN.is_match(id) {
        return Err(WorkflowError::invalid_session_id(id));
    }
    Ok(())
}

/// One question asked and the answer the user gave
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
}

/// Persisted projection of a drafting conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub document_type: Option<DocumentType>,
    #[serde(default)]
    pub collected_info: HashMap<String, String>,
    #[serde(default)]
    pub conversation_history: Vec<ConversationTurn>,
    /// Question shown to the user and still awaiting an answer
    #[serde(default)]
    pub current_question: Option<String>,
    /// Schema field the current question asks for
    #[serde(default)]
    pub pending_field: Option<String>,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub final_document: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl SessionRecord {
    pub fn new(session_id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            created_at: now,
            last_updated: now,
            document_type: None,
            collected_info: HashMap::new(),
            conversation_history: Vec::new(),
            current_question: None,
            pending_field: None,
            is_complete: false,
            final_document: None,
            error_message: None,
        }
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    /// True when nothing has been said in this session yet
    pub fn is_fresh(&self) -> bool {
        self.document_type.is_none() && self.conversation_history.is_empty() && self.current_question.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_session_ids() {
        assert!(SessionId::new("abc-123_XYZ").is_ok());
        assert!(SessionId::new("a".repeat(MAX_SESSION_ID_LENGTH)).is_ok());
        assert!(SessionId::new(SessionId::generate().to_string()).is_ok());
    }

    #[test]
    fn test_invalid_session_ids() {
        for id in ["", "../etc/passwd", "a b", "session.json", "ü"] {
            assert_eq!(
                SessionId::new(id).unwrap_err(),
                WorkflowError::invalid_session_id(id)
            );
        }
        assert!(SessionId::new("a".repeat(MAX_SESSION_ID_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_new_record_is_fresh() {
        let record = SessionRecord::new(SessionId::new("s1").unwrap());
        assert!(record.is_fresh());
        assert!(!record.is_complete);
        assert_eq!(record.created_at, record.last_updated);
    }

    #[test]
    fn test_deserialize_rejects_bad_id() {
        let json = r#"{"session_id":"../x","created_at":"2025-01-01T00:00:00Z","last_updated":"2025-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<SessionRecord>(json).is_err());
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let json = r#"{"session_id":"s1","created_at":"2025-01-01T00:00:00Z","last_updated":"2025-01-01T00:00:00Z","document_type":"nda"}"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.document_type, Some(DocumentType::Nda));
        assert!(record.collected_info.is_empty());
    }
}
