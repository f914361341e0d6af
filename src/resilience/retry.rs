//! Fixed-delay retry.

use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::{GuardError, TransientError};

/// Repeats an upstream call a bounded number of times with a constant delay
/// between failed attempts.
///
/// Only transient failures are retried; exhaustion surfaces
/// [`GuardError::RetriesExhausted`] instead of the last raw error. The final
/// attempt does not sleep before giving up.
#[derive(Debug, Clone)]
pub struct FixedRetry {
    max_attempts: u32,
    delay: Duration,
}

impl FixedRetry {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.delay_ms))
    }

    /// Run the operation until it succeeds or attempts are exhausted.
    ///
    /// Delays suspend the calling task; nothing blocks the scheduler.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, GuardError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransientError>>,
    {
        for attempt in 1..=self.max_attempts {
            tracing::debug!(attempt, max_attempts = self.max_attempts, "retry attempt");
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "retry attempt failed");
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.delay).await;
                    }
                }
            }
        }

        Err(GuardError::RetriesExhausted {
            attempts: self.max_attempts,
        })
    }
}
