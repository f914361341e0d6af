//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, one route per strategy)
//!     → request.rs (request ID minted/propagated)
//!     → [strategy runs zero or more upstream calls]
//!     → response.rs (outcome rendered as a JSON body + status)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
