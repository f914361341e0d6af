//! HTTP server setup and strategy dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with one handler per resilience strategy
//! - Wire up middleware (timeout, request ID, tracing)
//! - Construct the strategy instances from config and inject them as state
//! - Translate each strategy's outcome into a response (see response.rs)
//!
//! The handlers contain no policy logic of their own: each one picks
//! exactly one strategy, hands it the upstream call, and renders what comes
//! back.

use axum::{extract::State, response::Response, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GuardConfig;
use crate::error::GuardError;
use crate::http::request::UuidRequestId;
use crate::http::response;
use crate::observability::metrics;
use crate::resilience::{CircuitBreaker, ExponentialBackoff, FallbackCache, FixedRetry, TokenBucket};
use crate::upstream::UpstreamClient;

/// Application state injected into handlers.
///
/// The shared-state components (bucket, breaker, cache) are explicit
/// instances behind `Arc`, constructed once in [`HttpServer::new`]; tests
/// build their own with whatever settings a case needs.
#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
    pub cache_upstream: UpstreamClient,
    pub rate_limiter: Arc<TokenBucket>,
    pub breaker: Arc<CircuitBreaker>,
    pub cache: Arc<FallbackCache<Value>>,
    pub retry: FixedRetry,
    pub backoff: ExponentialBackoff,
}

impl AppState {
    pub fn from_config(config: &GuardConfig) -> Result<Self, url::ParseError> {
        let upstream = UpstreamClient::from_config(&config.upstream)?;
        let cache_upstream =
            upstream.with_timeout(Duration::from_secs(config.fallback_cache.request_timeout_secs));

        Ok(Self {
            upstream,
            cache_upstream,
            rate_limiter: Arc::new(TokenBucket::from_config(&config.rate_limit)),
            breaker: Arc::new(CircuitBreaker::from_config(&config.circuit_breaker)),
            cache: Arc::new(FallbackCache::new()),
            retry: FixedRetry::from_config(&config.retry),
            backoff: ExponentialBackoff::from_config(&config.backoff),
        })
    }
}

/// HTTP server exposing the strategy routes.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &GuardConfig) -> Result<Self, url::ParseError> {
        let state = AppState::from_config(config)?;
        Ok(Self::with_state(config, state))
    }

    /// Create a server around pre-built state (tests inject fresh instances
    /// per case this way).
    pub fn with_state(config: &GuardConfig, state: AppState) -> Self {
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GuardConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/unsafe", get(unsafe_handler))
            .route("/retry", get(retry_handler))
            .route("/backoff", get(backoff_handler))
            .route("/circuit", get(circuit_handler))
            .route("/ratelimit", get(ratelimit_handler))
            .route("/smart", get(smart_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Liveness of the guard service itself, not the upstream.
async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Direct passthrough: no strategy, upstream failures surface as 500s.
async fn unsafe_handler(State(state): State<AppState>) -> Response {
    let start = Instant::now();
    match state.upstream.fetch().await {
        Ok(payload) => {
            metrics::record_request("unsafe", 200, start);
            response::upstream_ok(payload)
        }
        Err(err) => {
            let err = GuardError::from(err);
            metrics::record_request("unsafe", err.status_code().as_u16(), start);
            response::guard_error(&err)
        }
    }
}

/// Fixed-delay retry; exhaustion renders 504.
async fn retry_handler(State(state): State<AppState>) -> Response {
    let start = Instant::now();
    match state.retry.execute(|| state.upstream.fetch()).await {
        Ok(payload) => {
            metrics::record_request("retry", 200, start);
            response::upstream_ok(payload)
        }
        Err(err) => {
            metrics::record_request("retry", err.status_code().as_u16(), start);
            response::guard_error(&err)
        }
    }
}

/// Exponential backoff; exhaustion renders 503.
async fn backoff_handler(State(state): State<AppState>) -> Response {
    let start = Instant::now();
    match state.backoff.execute(|| state.upstream.fetch()).await {
        Ok(payload) => {
            metrics::record_request("backoff", 200, start);
            response::upstream_ok(payload)
        }
        Err(err) => {
            metrics::record_request("backoff", err.status_code().as_u16(), start);
            response::guard_error(&err)
        }
    }
}

/// Circuit breaker; any failure on this path renders as 503 "blocked".
async fn circuit_handler(State(state): State<AppState>) -> Response {
    let start = Instant::now();
    match state.breaker.call(|| state.upstream.fetch()).await {
        Ok(payload) => {
            metrics::record_request("circuit", 200, start);
            response::upstream_ok(payload)
        }
        Err(err) => {
            metrics::record_request("circuit", 503, start);
            response::circuit_blocked(&err)
        }
    }
}

/// Token bucket admission, then a single unprotected upstream call.
async fn ratelimit_handler(State(state): State<AppState>) -> Response {
    let start = Instant::now();
    if !state.rate_limiter.consume() {
        tracing::warn!("rate limit exceeded, rejecting before upstream call");
        metrics::record_rate_limited();
        metrics::record_request("ratelimit", 429, start);
        return response::guard_error(&GuardError::RateLimitExceeded);
    }

    match state.upstream.fetch().await {
        Ok(payload) => {
            metrics::record_request("ratelimit", 200, start);
            response::upstream_ok(payload)
        }
        Err(err) => {
            let err = GuardError::from(err);
            metrics::record_request("ratelimit", err.status_code().as_u16(), start);
            response::guard_error(&err)
        }
    }
}

/// Fallback cache: degraded answers are 200s, only an empty cache fails.
async fn smart_handler(State(state): State<AppState>) -> Response {
    let start = Instant::now();
    match state.cache.fetch(|| state.cache_upstream.fetch()).await {
        Ok(outcome) => {
            metrics::record_request("smart", 200, start);
            response::smart_outcome(outcome)
        }
        Err(err) => {
            metrics::record_request("smart", err.status_code().as_u16(), start);
            response::guard_error(&err)
        }
    }
}
