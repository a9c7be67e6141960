//! Session store trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use super::{SessionId, SessionRecord};
use crate::domain::DomainError;

/// Durable key-value persistence of drafting sessions.
///
/// Each session is expected to be driven by a single client at a time;
/// concurrent writers to the same ID are not coordinated and the last save
/// wins.
#[async_trait]
pub trait SessionStore: Send + Sync + Debug {
    /// Existing record for `id`, or a freshly created one.
    ///
    /// Never fails: an unreadable or corrupt record is treated as absent.
    async fn get_or_create(&self, id: &SessionId) -> SessionRecord;

    /// Overwrite the full record atomically, stamping `last_updated`
    async fn save(&self, record: SessionRecord) -> Result<SessionRecord, DomainError>;

    /// Remove a session, returns true if it existed
    async fn delete(&self, id: &SessionId) -> Result<bool, DomainError>;

    /// IDs of all stored sessions
    async fn list(&self) -> Result<Vec<SessionId>, DomainError>;
}
