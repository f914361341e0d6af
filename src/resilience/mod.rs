//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream, per strategy route:
//!     → rate_limit.rs (admit or reject before the call)
//!     → retry.rs / backoff.rs (repeat transient failures, bounded)
//!     → circuit_breaker.rs (track failures, fail fast past threshold)
//!     → cache.rs (serve last known-good value when the call fails)
//! ```
//!
//! # Design Decisions
//! - Each strategy is an independent code path; the dispatcher picks exactly
//!   one per request so their behaviours can be compared
//! - Components are plain injected instances, no process-wide singletons;
//!   tests construct fresh state per case
//! - Shared state (bucket, breaker) serialises its full check-and-update
//!   under a mutex that is never held across an await

pub mod backoff;
pub mod cache;
pub mod circuit_breaker;
pub mod rate_limit;
pub mod retry;

pub use backoff::ExponentialBackoff;
pub use cache::{FallbackCache, FetchOutcome};
pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use rate_limit::TokenBucket;
pub use retry::FixedRetry;
