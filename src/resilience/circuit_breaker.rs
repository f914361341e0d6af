//! Circuit breaker for upstream protection.
//!
//! # States
//! - Closed: normal operation, failures counted
//! - Open: upstream assumed down, calls fail fast until the recovery
//!   deadline passes
//! - Half-Open: derived, not stored: "Open and the recovery timeout has
//!   elapsed since the last failure". Every call arriving in that condition
//!   is treated as a trial against the upstream.
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count reaches threshold
//! Open (deadline passed) → trial call → Closed on success
//! Open (deadline passed) → trial call fails → Open, timer restarts
//! ```
//!
//! Because half-open is re-derived from the timestamp on every call rather
//! than latched, concurrent callers past the deadline may all run trial
//! calls. See DESIGN.md for why this is kept.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::CircuitBreakerConfig;
use crate::error::{GuardError, TransientError};
use crate::observability::metrics;

/// Externally visible breaker state. `HalfOpen` is derived from the
/// recovery deadline, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Stored state, mutated only under the lock.
struct BreakerState {
    open: bool,
    failure_count: u32,
    last_failure: Option<Instant>,
}

/// Failure-tracking state machine wrapping a single upstream call-site.
///
/// Constructed per protected call-site and injected where needed; lives for
/// the process lifetime.
pub struct CircuitBreaker {
    failure_threshold: u32,
    recovery_timeout: Duration,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, recovery_timeout: Duration) -> Self {
        Self {
            failure_threshold,
            recovery_timeout,
            state: Mutex::new(BreakerState {
                open: false,
                failure_count: 0,
                last_failure: None,
            }),
        }
    }

    pub fn from_config(config: &CircuitBreakerConfig) -> Self {
        Self::new(
            config.failure_threshold,
            Duration::from_secs(config.recovery_timeout_secs),
        )
    }

    /// Run one upstream operation under the breaker.
    ///
    /// Fails fast with [`GuardError::CircuitOpen`] while the circuit is open
    /// and the recovery deadline has not passed; otherwise invokes the
    /// operation and records its outcome. The underlying failure is re-raised
    /// to the caller, never swallowed.
    ///
    /// The lock covers the admission check and the outcome recording, but is
    /// released while the operation itself is awaited.
    pub async fn call<T, F, Fut>(&self, operation: F) -> Result<T, GuardError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, TransientError>>,
    {
        {
            let state = self.state.lock().expect("circuit breaker mutex poisoned");
            if state.open {
                let elapsed = state
                    .last_failure
                    .map(|at| at.elapsed())
                    .unwrap_or(Duration::MAX);
                if elapsed <= self.recovery_timeout {
                    metrics::record_circuit_open();
                    return Err(GuardError::CircuitOpen);
                }
                tracing::info!(
                    elapsed_secs = elapsed.as_secs(),
                    "circuit breaker recovery deadline passed, attempting trial call"
                );
            }
        }

        match operation().await {
            Ok(value) => {
                let mut state = self.state.lock().expect("circuit breaker mutex poisoned");
                if state.open {
                    state.open = false;
                    state.failure_count = 0;
                    tracing::info!("circuit breaker closed after successful trial");
                }
                Ok(value)
            }
            Err(err) => {
                let mut state = self.state.lock().expect("circuit breaker mutex poisoned");
                state.failure_count += 1;
                state.last_failure = Some(Instant::now());
                tracing::warn!(
                    failures = state.failure_count,
                    threshold = self.failure_threshold,
                    error = %err,
                    "circuit breaker recorded failure"
                );

                if state.failure_count >= self.failure_threshold && !state.open {
                    state.open = true;
                    tracing::error!(
                        failures = state.failure_count,
                        "failure threshold reached, circuit breaker opening"
                    );
                }
                Err(err.into())
            }
        }
    }

    /// Current state, with half-open derived from the recovery deadline.
    pub fn state(&self) -> CircuitState {
        let state = self.state.lock().expect("circuit breaker mutex poisoned");
        if !state.open {
            return CircuitState::Closed;
        }
        let deadline_passed = state
            .last_failure
            .map(|at| at.elapsed() > self.recovery_timeout)
            .unwrap_or(true);
        if deadline_passed {
            CircuitState::HalfOpen
        } else {
            CircuitState::Open
        }
    }

    pub fn failure_count(&self) -> u32 {
        self.state
            .lock()
            .expect("circuit breaker mutex poisoned")
            .failure_count
    }
}
