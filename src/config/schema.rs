//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the guard
//! service. All types derive Serde traits for deserialization from config
//! files, and every field has a default so a minimal (or absent) config
//! still yields a runnable service.

use serde::{Deserialize, Serialize};

/// Root configuration for the guard service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    /// Listener configuration (bind address, request deadline).
    pub listener: ListenerConfig,

    /// The unreliable upstream this service shields callers from.
    pub upstream: UpstreamConfig,

    /// Fixed-delay retry settings (`/retry`).
    pub retry: RetryConfig,

    /// Exponential backoff settings (`/backoff`).
    pub backoff: BackoffConfig,

    /// Circuit breaker settings (`/circuit`).
    pub circuit_breaker: CircuitBreakerConfig,

    /// Token bucket settings (`/ratelimit`).
    pub rate_limit: RateLimitConfig,

    /// Fallback cache settings (`/smart`).
    pub fallback_cache: FallbackCacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Whole-request deadline in seconds. Generous: the slowest strategy
    /// (backoff) can legitimately take many seconds of sleeps and timeouts.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Upstream endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream service.
    pub base_url: String,

    /// Path of the data endpoint, joined onto the base URL.
    pub data_path: String,

    /// Per-attempt timeout in seconds for the retrying strategies.
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            data_path: "/api/data".to_string(),
            request_timeout_secs: 2,
        }
    }
}

/// Fixed-delay retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,

    /// Constant delay between failed attempts in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1000,
        }
    }
}

/// Exponential backoff configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,

    /// Base delay in milliseconds; doubles per attempt.
    pub base_delay_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 500,
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,

    /// Seconds the circuit stays open before a trial call is allowed.
    pub recovery_timeout_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout_secs: 10,
        }
    }
}

/// Token bucket configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum tokens the bucket holds (burst size).
    pub capacity: f64,

    /// Tokens credited per second.
    pub fill_rate: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 2.0,
            fill_rate: 0.5,
        }
    }
}

/// Fallback cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FallbackCacheConfig {
    /// Per-attempt timeout in seconds for the cache-guarded path. Shorter
    /// than the retry paths: a stale answer now beats a fresh one later.
    pub request_timeout_secs: u64,
}

impl Default for FallbackCacheConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 1,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
