//! Error taxonomy for upstream calls and resilience strategies.
//!
//! # Design Decisions
//! - Transient upstream failures (5xx, timeout, connect) are one class;
//!   retry policies only ever retry that class
//! - Each strategy surfaces its own terminal variant after giving up,
//!   never the raw transient error
//! - The circuit breaker re-raises the underlying failure unless it is
//!   short-circuiting, in which case it raises `CircuitOpen`

use axum::http::StatusCode;
use std::time::Duration;

/// A retryable upstream failure: server error, timeout or connection loss.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransientError {
    /// Upstream answered, but with a non-success status.
    #[error("upstream returned HTTP {0}")]
    Status(StatusCode),

    /// Upstream did not answer within the per-attempt deadline.
    #[error("upstream call timed out after {0:?}")]
    Timeout(Duration),

    /// Connection could not be established or was dropped mid-flight.
    #[error("failed to reach upstream: {0}")]
    Connect(String),
}

/// Terminal outcome of a guarded call, as seen by the dispatcher.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GuardError {
    /// The underlying transient failure, surfaced unchanged (direct calls,
    /// breaker re-raise, admitted-but-failed rate-limited calls).
    #[error(transparent)]
    Upstream(#[from] TransientError),

    /// Token bucket empty; the upstream was not contacted.
    #[error("too many requests, rate limit exceeded")]
    RateLimitExceeded,

    /// Circuit is open and the recovery deadline has not passed; the
    /// upstream was not contacted.
    #[error("circuit breaker is open, failing fast")]
    CircuitOpen,

    /// Fixed-delay retry gave up.
    #[error("upstream unavailable after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// Exponential backoff gave up.
    #[error("service unavailable, {attempts} backoff attempts exhausted")]
    BackoffExhausted { attempts: u32 },

    /// Fallback requested but no prior success has ever been cached.
    #[error("upstream unavailable and fallback cache is empty")]
    CacheEmpty,
}

impl GuardError {
    /// HTTP status the dispatcher renders for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GuardError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GuardError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            GuardError::CircuitOpen => StatusCode::SERVICE_UNAVAILABLE,
            GuardError::RetriesExhausted { .. } => StatusCode::GATEWAY_TIMEOUT,
            GuardError::BackoffExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            GuardError::CacheEmpty => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
