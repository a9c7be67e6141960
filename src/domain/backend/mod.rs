//! Backend pool and fallback policy
//!
//! A pool holds interchangeable text-generation backends in registration order.
//! That order is the round-robin cycle used when a backend fails or returns an
//! unusable result.

mod backend;
mod fallback;
mod pool;

pub use backend::{Backend, GenerationSettings};
pub use fallback::{FallbackOutcome, FallbackPolicy};
pub use pool::{BackendEntry, BackendPool};
