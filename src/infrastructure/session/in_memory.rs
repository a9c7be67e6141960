//! In-memory session store

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::session::{SessionId, SessionRecord, SessionStore};
use crate::domain::DomainError;

/// Thread-safe in-memory session store
///
/// Useful for testing and one-off CLI runs. Data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, id: &SessionId) -> SessionRecord {
        if let Ok(sessions) = self.sessions.read() {
            if let Some(record) = sessions.get(id) {
                return record.clone();
            }
        }

        let record = SessionRecord::new(id.clone());
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.entry(id.clone()).or_insert_with(|| record.clone());
        }
        record
    }

    async fn save(&self, mut record: SessionRecord) -> Result<SessionRecord, DomainError> {
        record.touch();

        let mut sessions = self.sessions.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;
        sessions.insert(record.session_id.clone(), record.clone());

        Ok(record)
    }

    async fn delete(&self, id: &SessionId) -> Result<bool, DomainError> {
        let mut sessions = self.sessions.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(sessions.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<SessionId>, DomainError> {
        let sessions = self.sessions.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut ids: Vec<SessionId> = sessions.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
