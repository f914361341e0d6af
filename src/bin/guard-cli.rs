//! Probe CLI for the guard's strategy routes.

use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "guard-cli")]
#[command(about = "Probe the resilience strategy routes", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Liveness of the guard service itself
    Health,
    /// Direct passthrough, no protection
    Unsafe,
    /// Fixed-delay retry
    Retry,
    /// Exponential backoff
    Backoff,
    /// Circuit breaker
    Circuit,
    /// Token bucket rate limiter
    Ratelimit,
    /// Fallback cache (graceful degradation)
    Smart,
}

impl Commands {
    fn path(&self) -> &'static str {
        match self {
            Commands::Health => "/health",
            Commands::Unsafe => "/unsafe",
            Commands::Retry => "/retry",
            Commands::Backoff => "/backoff",
            Commands::Circuit => "/circuit",
            Commands::Ratelimit => "/ratelimit",
            Commands::Smart => "/smart",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}{}", cli.url, cli.command.path()))
        .send()
        .await?;

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Status: {}", status);
    }

    match res.json::<Value>().await {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(e) => eprintln!("Non-JSON response: {}", e),
    }
    Ok(())
}
