//! Upstream collaborator access.
//!
//! The upstream is a single network service that fails or stalls with high
//! probability. This module owns the one way the rest of the crate talks to
//! it: a bounded-timeout GET returning parsed JSON or a transient error.

pub mod client;

pub use client::UpstreamClient;
