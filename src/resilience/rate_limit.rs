//! Token bucket rate limiting.

use std::sync::Mutex;
use tokio::time::Instant;

use crate::config::RateLimitConfig;

/// Mutable bucket state, guarded as a unit.
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// A token bucket shared by every request on the rate-limited path.
///
/// Refill is lazy: each `consume` credits tokens for the time elapsed since
/// the previous call before deciding, so there is no background timer. A
/// rejected call still advances the refill clock.
pub struct TokenBucket {
    capacity: f64,
    fill_rate: f64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Create a full bucket.
    pub fn new(capacity: f64, fill_rate: f64) -> Self {
        Self {
            capacity,
            fill_rate,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.capacity, config.fill_rate)
    }

    /// Try to take one token. Returns false when the bucket is empty;
    /// rejection is a normal outcome, not an error.
    ///
    /// The whole refill-check-subtract sequence runs under one lock so
    /// concurrent callers cannot lose updates.
    pub fn consume(&self) -> bool {
        let mut state = self.state.lock().expect("rate limiter mutex poisoned");

        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.fill_rate).min(self.capacity);
        state.last_refill = now;

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Current token count (inspection only).
    pub fn tokens(&self) -> f64 {
        self.state.lock().expect("rate limiter mutex poisoned").tokens
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }
}
