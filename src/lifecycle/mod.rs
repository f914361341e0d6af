//! Lifecycle management subsystem.
//!
//! Startup order lives in `main` (config, then observability, then the
//! server); this module owns the other end: a broadcast-based shutdown
//! signal that the server's graceful-shutdown future and any background
//! tasks subscribe to.

pub mod shutdown;

pub use shutdown::Shutdown;
