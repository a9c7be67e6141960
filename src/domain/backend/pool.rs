use tracing::{info, warn};

use super::Backend;
use crate::domain::DomainError;

/// A named backend registered in a pool
#[derive(Debug, Clone)]
pub struct BackendEntry {
    name: String,
    backend: Backend,
}

impl BackendEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }
}

/// Ordered set of interchangeable backends
#[derive(Debug, Clone, Default)]
pub struct BackendPool {
    entries: Vec<BackendEntry>,
}

impl BackendPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend from its initialization result.
    ///
    /// A failed initialization is logged and the backend is left out of the
    /// pool. Returns whether the backend was added.
    pub fn register(&mut self, name: impl Into<String>, init: Result<Backend, DomainError>) -> bool {
        let name = name.into();

        if self.get(&name).is_some() {
            warn!(backend = %name, "Backend already registered, ignoring duplicate");
            return false;
        }

        match init {
            Ok(backend) => {
                info!(backend = %name, model = backend.model(), "Backend initialized");
                self.entries.push(BackendEntry { name, backend });
                true
            }
            Err(e) => {
                warn!(backend = %name, error = %e, "Backend failed to initialize");
                false
            }
        }
    }

    /// Builder-style registration of an already initialized backend
    pub fn with_backend(mut self, name: impl Into<String>, backend: Backend) -> Self {
        self.register(name, Ok(backend));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackendEntry> {
        self.entries.iter()
    }

    pub fn first(&self) -> Option<&BackendEntry> {
        self.entries.first()
    }

    pub fn get(&self, name: &str) -> Option<&BackendEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Next backend in round-robin order after `name`.
    ///
    /// Wraps to the first backend when `name` is last, unknown or empty.
    pub fn next_after(&self, name: &str) -> Option<&BackendEntry> {
        if self.entries.is_empty() {
            return None;
        }

        let next_index = self
            .entries
            .iter()
            .position(|e| e.name == name)
            .map(|index| (index + 1) % self.entries.len())
            .unwrap_or(0);

        self.entries.get(next_index)
    }

    /// Fails with a configuration error when no backend could be initialized
    pub fn ensure_available(&self) -> Result<(), DomainError> {
        if self.is_empty() {
            return Err(DomainError::configuration(
                "No language model backend is available. Check the configured API keys.",
            ));
        }
        Ok(())
    }
}
