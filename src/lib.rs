//! Client-side resilience toolkit for one unreliable upstream.
//!
//! Exposes rate limiting, retrying, exponential backoff, circuit breaking
//! and a freshness-bounded fallback cache, each behind its own HTTP route
//! so the strategies can be exercised and compared in isolation.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod upstream;

pub use config::GuardConfig;
pub use error::{GuardError, TransientError};
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
