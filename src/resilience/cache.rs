//! Graceful degradation via a freshness-bounded fallback cache.
//!
//! # Responsibilities
//! - Remember the last successful upstream response and when it was captured
//! - On upstream failure, serve that value annotated with its age
//! - Surface `CacheEmpty` only when no fallback exists
//!
//! # Design Decisions
//! - The cache is advisory: staleness, not consistency, is the concern.
//!   Last-writer-wins on concurrent refreshes is acceptable, so the lock is
//!   held only for the store or the read, never across the upstream call.
//! - Age is computed at read time from the capture timestamp, never stored.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::{GuardError, TransientError};
use crate::observability::metrics;

struct CacheEntry<T> {
    value: T,
    captured_at: Instant,
}

/// What a guarded fetch produced: a live value, or the last known-good one.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    /// The upstream answered; the cache was refreshed.
    Fresh(T),
    /// The upstream failed; this is the cached value and its staleness.
    Cached { value: T, age: Duration },
}

/// Stores the last successful response for use when the upstream fails.
///
/// Empty until the first success; a failure before then is not maskable.
pub struct FallbackCache<T> {
    entry: Mutex<Option<CacheEntry<T>>>,
}

impl<T: Clone> FallbackCache<T> {
    pub fn new() -> Self {
        Self {
            entry: Mutex::new(None),
        }
    }

    /// Attempt the operation, falling back to the cached value on failure.
    ///
    /// A degraded result is a *success* from the caller's point of view;
    /// only an empty cache turns the failure into [`GuardError::CacheEmpty`].
    pub async fn fetch<F, Fut>(&self, operation: F) -> Result<FetchOutcome<T>, GuardError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, TransientError>>,
    {
        match operation().await {
            Ok(value) => {
                let mut entry = self.entry.lock().expect("fallback cache mutex poisoned");
                *entry = Some(CacheEntry {
                    value: value.clone(),
                    captured_at: Instant::now(),
                });
                Ok(FetchOutcome::Fresh(value))
            }
            Err(err) => {
                let entry = self.entry.lock().expect("fallback cache mutex poisoned");
                match entry.as_ref() {
                    Some(cached) => {
                        let age = cached.captured_at.elapsed();
                        tracing::warn!(
                            error = %err,
                            age_secs = age.as_secs_f64(),
                            "upstream failed, serving cached value"
                        );
                        metrics::record_cache_fallback();
                        Ok(FetchOutcome::Cached {
                            value: cached.value.clone(),
                            age,
                        })
                    }
                    None => {
                        tracing::error!(error = %err, "upstream failed and cache is empty");
                        Err(GuardError::CacheEmpty)
                    }
                }
            }
        }
    }

    /// Whether a fallback value exists.
    pub fn is_primed(&self) -> bool {
        self.entry
            .lock()
            .expect("fallback cache mutex poisoned")
            .is_some()
    }
}

impl<T: Clone> Default for FallbackCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
