//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GuardConfig (validated, immutable)
//!     → shared by value with the subsystems that need each section
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; state is process-lifetime only
//! - All fields have defaults so the service runs with no config file at all
//! - Validation separates syntactic (serde) from semantic checks and
//!   reports every violation in one pass

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BackoffConfig, CircuitBreakerConfig, FallbackCacheConfig, GuardConfig, ListenerConfig,
    ObservabilityConfig, RateLimitConfig, RetryConfig, UpstreamConfig,
};
