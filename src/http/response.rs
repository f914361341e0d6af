//! Response rendering.
//!
//! # Responsibilities
//! - Render strategy outcomes as JSON bodies with the route's status code
//! - Keep failure bodies to a human-readable message; internal state is
//!   never exposed
//!
//! Age in the degraded response is rounded to one decimal, matching what
//! callers of this service scrape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::time::Duration;

use crate::error::GuardError;
use crate::resilience::FetchOutcome;

/// 200 with the upstream body passed through unchanged.
pub fn upstream_ok(payload: Value) -> Response {
    (StatusCode::OK, Json(payload)).into_response()
}

/// The canonical failure rendering: the error's own status and message.
pub fn guard_error(error: &GuardError) -> Response {
    (
        error.status_code(),
        Json(json!({ "error": error.to_string() })),
    )
        .into_response()
}

/// `/circuit` failure rendering: every error on that path, short-circuit or
/// re-raised upstream failure, is a 503 tagged as blocked by the breaker.
pub fn circuit_blocked(error: &GuardError) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "error": error.to_string(),
            "status": "Circuit Breaker Blocked",
        })),
    )
        .into_response()
}

/// `/smart` success rendering: fresh data, or the cached value annotated
/// with its age. Both are 200s; degradation is hidden from the caller.
pub fn smart_outcome(outcome: FetchOutcome<Value>) -> Response {
    match outcome {
        FetchOutcome::Fresh(data) => (
            StatusCode::OK,
            Json(json!({ "source": "backend", "data": data })),
        )
            .into_response(),
        FetchOutcome::Cached { value, age } => (
            StatusCode::OK,
            Json(json!({
                "source": "cache_fallback",
                "message": "upstream unavailable, serving cached data",
                "cache_age_seconds": round_age(age),
                "data": value,
            })),
        )
            .into_response(),
    }
}

fn round_age(age: Duration) -> f64 {
    (age.as_secs_f64() * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_rounds_to_one_decimal() {
        assert_eq!(round_age(Duration::from_millis(3140)), 3.1);
        assert_eq!(round_age(Duration::from_millis(3160)), 3.2);
        assert_eq!(round_age(Duration::ZERO), 0.0);
    }
}
