use tracing::{info, warn};

use super::{BackendEntry, BackendPool};
use crate::domain::{DomainError, LlmRequest};

/// Text produced by the fallback policy and the backend that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackOutcome {
    pub text: String,
    pub backend: String,
}

/// Single-shot fallback across a backend pool
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackPolicy;

impl FallbackPolicy {
    /// Send `request` to the backend named `start` (the first backend when
    /// empty or unknown), then to each following backend in registration
    /// order until one returns a usable result. Each backend is tried at most
    /// once.
    pub async fn generate<F>(
        pool: &BackendPool,
        start: &str,
        request: &LlmRequest,
        is_usable: F,
    ) -> Result<FallbackOutcome, DomainError>
    where
        F: Fn(&str) -> bool,
    {
        pool.ensure_available()?;

        let first = match pool.get(start) {
            Some(entry) => entry,
            None => pool
                .first()
                .ok_or_else(|| DomainError::internal("Backend pool emptied during fallback"))?,
        };

        Self::walk(pool, first, pool.len(), request, is_usable).await
    }

    /// Like [`FallbackPolicy::generate`] for a caller that already tried
    /// `tried` in the same attempt: every other backend is tried once, in
    /// order after it, and `tried` is never called again.
    pub async fn generate_after<F>(
        pool: &BackendPool,
        tried: &str,
        request: &LlmRequest,
        is_usable: F,
    ) -> Result<FallbackOutcome, DomainError>
    where
        F: Fn(&str) -> bool,
    {
        pool.ensure_available()?;

        let remaining = match pool.get(tried) {
            Some(_) => pool.len() - 1,
            None => pool.len(),
        };
        if remaining == 0 {
            return Err(DomainError::provider(
                "fallback",
                format!("No backend left to try after {}", tried),
            ));
        }

        let first = pool
            .next_after(tried)
            .ok_or_else(|| DomainError::internal("Backend pool emptied during fallback"))?;

        Self::walk(pool, first, remaining, request, is_usable).await
    }

    async fn walk<F>(
        pool: &BackendPool,
        first: &BackendEntry,
        attempts: usize,
        request: &LlmRequest,
        is_usable: F,
    ) -> Result<FallbackOutcome, DomainError>
    where
        F: Fn(&str) -> bool,
    {
        let mut current = first;
        let mut last_error = String::new();

        for attempt in 0..attempts {
            match current.backend().generate(request.clone()).await {
                Ok(text) if is_usable(&text) => {
                    if attempt > 0 {
                        info!(backend = current.name(), attempt, "Fallback backend produced a result");
                    }
                    return Ok(FallbackOutcome {
                        text,
                        backend: current.name().to_string(),
                    });
                }
                Ok(_) => {
                    warn!(backend = current.name(), "Backend returned an unusable result");
                    last_error = format!("{} returned an unusable result", current.name());
                }
                Err(e) => {
                    warn!(backend = current.name(), error = %e, "Backend call failed");
                    last_error = e.to_string();
                }
            }

            match pool.next_after(current.name()) {
                Some(next) => current = next,
                None => break,
            }
        }

        Err(DomainError::provider(
            "fallback",
            format!("All {} backends failed. Last error: {}", attempts, last_error),
        ))
    }
}
