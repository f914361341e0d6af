//! Exponential backoff retry.

use std::future::Future;
use std::time::Duration;

use crate::config::BackoffConfig;
use crate::error::{GuardError, TransientError};

/// Retry with a delay that doubles per attempt from a base value.
///
/// Unlike [`FixedRetry`](crate::resilience::retry::FixedRetry), the delay
/// also runs after the final failed attempt before the terminal error is
/// returned. That trailing sleep mirrors the behaviour this service models
/// and is kept on purpose (see DESIGN.md).
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    max_attempts: u32,
    base_delay: Duration,
}

impl ExponentialBackoff {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    pub fn from_config(config: &BackoffConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
        )
    }

    /// Delay after the failed attempt `attempt` (0-indexed): `base * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor)
    }

    /// Run the operation until it succeeds or attempts are exhausted.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, GuardError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransientError>>,
    {
        for attempt in 0..self.max_attempts {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let delay = self.delay_for(attempt);
                    tracing::info!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "backoff attempt failed, waiting"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(GuardError::BackoffExhausted {
            attempts: self.max_attempts,
        })
    }
}
