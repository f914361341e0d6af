//! End-to-end tests for the strategy routes, with a scripted upstream.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

mod common;

#[tokio::test]
async fn health_reports_healthy_without_upstream() {
    let upstream = common::start_programmable_upstream(|| async { (200, "{}".into()) }).await;
    let (addr, _shutdown) = common::start_guard(common::test_config(upstream)).await;

    let res = common::http_client()
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .expect("guard unreachable");

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn unsafe_passes_upstream_body_through() {
    let upstream = common::start_programmable_upstream(|| async {
        (200, r#"{"id": 123, "info": "payload"}"#.into())
    })
    .await;
    let (addr, _shutdown) = common::start_guard(common::test_config(upstream)).await;

    let res = common::http_client()
        .get(format!("http://{}/unsafe", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["id"], 123);
}

#[tokio::test]
async fn unsafe_maps_upstream_failure_to_500() {
    let upstream =
        common::start_programmable_upstream(|| async { (500, r#"{"error": "boom"}"#.into()) })
            .await;
    let (addr, _shutdown) = common::start_guard(common::test_config(upstream)).await;

    let res = common::http_client()
        .get(format!("http://{}/unsafe", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn retry_recovers_from_two_failures() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let upstream = common::start_programmable_upstream(move || {
        let cc = cc.clone();
        async move {
            if cc.fetch_add(1, Ordering::SeqCst) < 2 {
                (500, r#"{"error": "not yet"}"#.into())
            } else {
                (200, r#"{"id": 3, "info": "third time lucky"}"#.into())
            }
        }
    })
    .await;
    let (addr, _shutdown) = common::start_guard(common::test_config(upstream)).await;

    let start = Instant::now();
    let res = common::http_client()
        .get(format!("http://{}/retry", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["id"], 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // Two failing attempts each waited the configured 50ms delay
    assert!(start.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn retry_exhaustion_returns_504() {
    let upstream =
        common::start_programmable_upstream(|| async { (500, r#"{"error": "down"}"#.into()) })
            .await;
    let (addr, _shutdown) = common::start_guard(common::test_config(upstream)).await;

    let res = common::http_client()
        .get(format!("http://{}/retry", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 504);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("3 attempts"));
}

#[tokio::test]
async fn backoff_exhaustion_returns_503() {
    let upstream =
        common::start_programmable_upstream(|| async { (500, r#"{"error": "down"}"#.into()) })
            .await;
    let mut config = common::test_config(upstream);
    config.backoff.max_attempts = 2;
    let (addr, _shutdown) = common::start_guard(config).await;

    let start = Instant::now();
    let res = common::http_client()
        .get(format!("http://{}/backoff", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 503);
    // Base 20ms + doubled 40ms, including the trailing sleep
    assert!(start.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn backoff_returns_upstream_body_on_recovery() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let upstream = common::start_programmable_upstream(move || {
        let cc = cc.clone();
        async move {
            if cc.fetch_add(1, Ordering::SeqCst) == 0 {
                (503, r#"{"error": "warming up"}"#.into())
            } else {
                (200, r#"{"id": 9}"#.into())
            }
        }
    })
    .await;
    let (addr, _shutdown) = common::start_guard(common::test_config(upstream)).await;

    let res = common::http_client()
        .get(format!("http://{}/backoff", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["id"], 9);
}

#[tokio::test]
async fn ratelimit_admits_burst_then_rejects() {
    let upstream =
        common::start_programmable_upstream(|| async { (200, r#"{"id": 1}"#.into()) }).await;
    let (addr, _shutdown) = common::start_guard(common::test_config(upstream)).await;
    let client = common::http_client();

    // Default bucket: capacity 2, refill 0.5/s
    for _ in 0..2 {
        let res = client
            .get(format!("http://{}/ratelimit", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
    }

    let res = client
        .get(format!("http://{}/ratelimit", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 429);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("rate limit"));
}

#[tokio::test]
async fn ratelimit_admitted_call_maps_upstream_error_to_500() {
    let upstream =
        common::start_programmable_upstream(|| async { (500, r#"{"error": "down"}"#.into()) })
            .await;
    let (addr, _shutdown) = common::start_guard(common::test_config(upstream)).await;

    let res = common::http_client()
        .get(format!("http://{}/ratelimit", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
}

#[tokio::test]
async fn circuit_opens_after_threshold_and_fails_fast() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let upstream = common::start_programmable_upstream(move || {
        let cc = cc.clone();
        async move {
            cc.fetch_add(1, Ordering::SeqCst);
            (500, r#"{"error": "down"}"#.into())
        }
    })
    .await;
    let (addr, _shutdown) = common::start_guard(common::test_config(upstream)).await;
    let client = common::http_client();

    // Threshold is 3: each of these reaches the upstream and fails
    for _ in 0..3 {
        let res = client
            .get(format!("http://{}/circuit", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 503);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["status"], "Circuit Breaker Blocked");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    // Open circuit: rejected without touching the upstream
    let res = client
        .get(format!("http://{}/circuit", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 503);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn smart_serves_fresh_then_degrades_to_cache() {
    let failing = Arc::new(AtomicBool::new(false));
    let fail = failing.clone();
    let upstream = common::start_programmable_upstream(move || {
        let fail = fail.clone();
        async move {
            if fail.load(Ordering::SeqCst) {
                (500, r#"{"error": "down"}"#.into())
            } else {
                (200, r#"{"id": 42, "info": "live"}"#.into())
            }
        }
    })
    .await;
    let (addr, _shutdown) = common::start_guard(common::test_config(upstream)).await;
    let client = common::http_client();

    let res = client
        .get(format!("http://{}/smart", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["source"], "backend");
    assert_eq!(body["data"]["id"], 42);

    // Kill the upstream; the cached value must be served with its age
    failing.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(200)).await;

    let res = client
        .get(format!("http://{}/smart", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["source"], "cache_fallback");
    assert_eq!(body["data"]["id"], 42);
    assert!(body["cache_age_seconds"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn smart_with_empty_cache_returns_503() {
    let upstream =
        common::start_programmable_upstream(|| async { (500, r#"{"error": "down"}"#.into()) })
            .await;
    let (addr, _shutdown) = common::start_guard(common::test_config(upstream)).await;

    let res = common::http_client()
        .get(format!("http://{}/smart", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 503);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("cache"));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let upstream = common::start_programmable_upstream(|| async { (200, "{}".into()) }).await;
    let (addr, _shutdown) = common::start_guard(common::test_config(upstream)).await;

    let res = common::http_client()
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap();

    let id = res
        .headers()
        .get("x-request-id")
        .expect("x-request-id header missing");
    assert!(!id.to_str().unwrap().is_empty());
}
