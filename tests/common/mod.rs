//! Shared utilities for integration testing.
//!
//! The flaky upstream is replaced by a programmable mock whose outcome
//! sequence each test scripts deterministically, instead of relying on
//! randomness.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use upstream_guard::config::GuardConfig;
use upstream_guard::http::{AppState, HttpServer};
use upstream_guard::lifecycle::Shutdown;

/// Start a mock upstream whose per-call status and JSON body come from the
/// supplied closure. Returns the bound address.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        // Linger so the client drains the response before the
                        // unread request bytes trigger a reset on drop
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Config pointed at the given upstream, with delays shrunk so the suite
/// stays fast. Tests override the sections they exercise.
pub fn test_config(upstream_addr: SocketAddr) -> GuardConfig {
    let mut config = GuardConfig::default();
    config.upstream.base_url = format!("http://{}", upstream_addr);
    config.upstream.request_timeout_secs = 1;
    config.fallback_cache.request_timeout_secs = 1;
    config.retry.delay_ms = 50;
    config.backoff.base_delay_ms = 20;
    config
}

/// Spawn the guard server on an ephemeral port. Returns its address and the
/// shutdown handle keeping it alive.
pub async fn start_guard(config: GuardConfig) -> (SocketAddr, Shutdown) {
    let state = AppState::from_config(&config).expect("test config must produce valid state");
    let server = HttpServer::with_state(&config, state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// A reqwest client that will not reuse pooled connections between tests.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
