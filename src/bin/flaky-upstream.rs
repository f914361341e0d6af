//! Simulated unstable upstream.
//!
//! Demo glue for exercising the guard: with the configured probability a
//! data request stalls and then returns a 500; otherwise it answers
//! immediately with a small JSON payload. Not part of the resilience core.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use clap::Parser;
use rand::Rng;
use serde_json::{json, Value};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "flaky-upstream")]
#[command(about = "Deliberately unreliable upstream for resilience demos", long_about = None)]
struct Cli {
    /// Bind address.
    #[arg(short, long, default_value = "0.0.0.0:5000")]
    bind: String,

    /// Probability that a data request fails.
    #[arg(long, default_value_t = 0.7)]
    failure_rate: f64,

    /// Seconds a failing request stalls before answering.
    #[arg(long, default_value_t = 10)]
    stall_secs: u64,
}

#[derive(Clone)]
struct Behaviour {
    failure_rate: f64,
    stall: Duration,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let cli = Cli::parse();
    let behaviour = Behaviour {
        failure_rate: cli.failure_rate,
        stall: Duration::from_secs(cli.stall_secs),
    };

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/data", get(data_handler))
        .with_state(behaviour);

    let listener = TcpListener::bind(&cli.bind).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        failure_rate = cli.failure_rate,
        "Flaky upstream listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn data_handler(State(behaviour): State<Behaviour>) -> Response {
    let roll: f64 = rand::thread_rng().gen();
    if roll < behaviour.failure_rate {
        tracing::warn!(stall_secs = behaviour.stall.as_secs(), "Simulating a stalled failure");
        tokio::time::sleep(behaviour.stall).await;
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal Server Error" })),
        )
            .into_response();
    }

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();

    (
        StatusCode::OK,
        Json(json!({
            "id": 123,
            "info": "critical data from the backend",
            "timestamp": timestamp,
        })),
    )
        .into_response()
}
