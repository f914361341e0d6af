//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (structured logs)
//!     → Prometheus scrape of the optional metrics endpoint
//! ```

pub mod logging;
pub mod metrics;
