//! Structured logging.
//!
//! Initialises the tracing subscriber once at startup. The configured level
//! is the default; `RUST_LOG` overrides it for ad-hoc debugging.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ObservabilityConfig;

pub fn init_tracing(config: &ObservabilityConfig) {
    let default_filter = format!("upstream_guard={},tower_http=info", config.log_level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
