//! Configuration validation.
//!
//! Semantic checks on top of what serde already guarantees syntactically.
//! Validation is a pure function over the config and returns every error it
//! finds, not just the first.

use url::Url;

use crate::config::schema::GuardConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a valid socket address")]
    BindAddress(String),

    #[error("upstream.base_url '{url}' is invalid: {reason}")]
    UpstreamUrl { url: String, reason: String },

    #[error("{field} must be at least 1")]
    ZeroAttempts { field: &'static str },

    #[error("rate_limit.capacity must be at least 1 token, got {0}")]
    BucketCapacity(f64),

    #[error("rate_limit.fill_rate must be positive, got {0}")]
    FillRate(f64),

    #[error("{field} must be positive")]
    ZeroDuration { field: &'static str },
}

/// Check the whole config, collecting every violation.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config
        .listener
        .bind_address
        .parse::<std::net::SocketAddr>()
        .is_err()
    {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    match config.upstream.base_url.parse::<Url>() {
        Ok(base) => {
            if base.join(&config.upstream.data_path).is_err() {
                errors.push(ValidationError::UpstreamUrl {
                    url: config.upstream.data_path.clone(),
                    reason: "data_path does not join onto base_url".to_string(),
                });
            }
        }
        Err(e) => errors.push(ValidationError::UpstreamUrl {
            url: config.upstream.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.retry.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts {
            field: "retry.max_attempts",
        });
    }
    if config.backoff.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts {
            field: "backoff.max_attempts",
        });
    }
    if config.circuit_breaker.failure_threshold == 0 {
        errors.push(ValidationError::ZeroAttempts {
            field: "circuit_breaker.failure_threshold",
        });
    }

    if config.rate_limit.capacity < 1.0 {
        errors.push(ValidationError::BucketCapacity(config.rate_limit.capacity));
    }
    if config.rate_limit.fill_rate <= 0.0 {
        errors.push(ValidationError::FillRate(config.rate_limit.fill_rate));
    }

    if config.upstream.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: "upstream.request_timeout_secs",
        });
    }
    if config.fallback_cache.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: "fallback_cache.request_timeout_secs",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
