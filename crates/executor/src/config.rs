//! Executor configuration.

use std::time::Duration;

/// Configuration for [`SubmissionExecutor`](crate::SubmissionExecutor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Upper bound on waiting for finality after a successful execution.
    pub confirmation_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout: Duration::from_secs(60),
        }
    }
}

impl ExecutorConfig {
    /// Set the confirmation timeout.
    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }
}
