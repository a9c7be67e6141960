/// Outcome of checking search results against the quality threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationDecision {
    /// Switch backend and search again
    Retry,
    /// Keep the results, even if below threshold
    Accept,
}

/// Minimum-quality threshold with a bounded retry budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub min_results: usize,
    pub max_errors: u32,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            min_results: 2,
            max_errors: 2,
        }
    }
}

impl ValidationPolicy {
    pub fn new(min_results: usize, max_errors: u32) -> Self {
        Self {
            min_results,
            max_errors,
        }
    }

    /// Retry on a shortfall while the error budget lasts, otherwise accept
    pub fn evaluate(&self, result_count: usize, error_count: u32) -> ValidationDecision {
        if result_count < self.min_results && error_count < self.max_errors {
            ValidationDecision::Retry
        } else {
            ValidationDecision::Accept
        }
    }
}
