//! File-backed session store: one pretty-printed JSON file per session

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::domain::session::{SessionId, SessionRecord, SessionStore};
use crate::domain::DomainError;

const FILE_PREFIX: &str = "session_";
const FILE_SUFFIX: &str = ".json";

/// Stores each session as `session_<id>.json` in a directory.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a reader never observes a partial record.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            DomainError::storage(format!("Failed to create session directory {}: {}", dir.display(), e))
        })?;

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &SessionId) -> PathBuf {
        self.dir.join(format!("{}{}{}", FILE_PREFIX, id, FILE_SUFFIX))
    }

    fn id_from_file_name(name: &str) -> Option<SessionId> {
        let id = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
        SessionId::new(id).ok()
    }

    async fn read(&self, id: &SessionId) -> Result<Option<SessionRecord>, DomainError> {
        let path = self.path_for(id);

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let record: SessionRecord = serde_json::from_str(&contents).map_err(|e| {
            DomainError::storage(format!("Corrupt session file {}: {}", path.display(), e))
        })?;

        if record.session_id != *id {
            return Err(DomainError::storage(format!(
                "Session file {} belongs to session {}",
                path.display(),
                record.session_id
            )));
        }

        Ok(Some(record))
    }

    fn write_atomic(dir: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(contents)?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get_or_create(&self, id: &SessionId) -> SessionRecord {
        match self.read(id).await {
            Ok(Some(record)) => return record,
            Ok(None) => debug!(session_id = %id, "Creating new session"),
            Err(e) => warn!(session_id = %id, error = %e, "Unreadable session, starting over"),
        }

        let record = SessionRecord::new(id.clone());
        match self.save(record.clone()).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!(session_id = %id, error = %e, "Failed to persist new session");
                record
            }
        }
    }

    async fn save(&self, mut record: SessionRecord) -> Result<SessionRecord, DomainError> {
        record.touch();

        let contents = serde_json::to_vec_pretty(&record)
            .map_err(|e| DomainError::storage(format!("Failed to serialize session: {}", e)))?;

        let dir = self.dir.clone();
        let path = self.path_for(&record.session_id);

        tokio::task::spawn_blocking(move || Self::write_atomic(&dir, &path, &contents))
            .await
            .map_err(|e| DomainError::internal(format!("Session writer task failed: {}", e)))?
            .map_err(|e| DomainError::storage(format!("Failed to write session: {}", e)))?;

        debug!(session_id = %record.session_id, "Session saved");
        Ok(record)
    }

    async fn delete(&self, id: &SessionId) -> Result<bool, DomainError> {
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DomainError::storage(format!("Failed to delete session {}: {}", id, e))),
        }
    }

    async fn list(&self) -> Result<Vec<SessionId>, DomainError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list sessions: {}", e)))?;

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list sessions: {}", e)))?
        {
            if let Some(id) = entry.file_name().to_str().and_then(Self::id_from_file_name) {
                ids.push(id);
            }
        }

        ids.sort();
        Ok(ids)
    }
}
