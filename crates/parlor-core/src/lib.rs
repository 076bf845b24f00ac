//! parlor core: transport-agnostic protocol primitives and error types.
//!
//! This crate defines the wire-level packet contract and the error surface
//! shared by the session runtime and its tests. It intentionally carries no
//! transport or runtime dependencies so it can be reused in multiple
//! contexts (the client, tooling, fixtures).
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `ParlorError`/`Result` so a session
//! never crashes on malformed frames; it fails through its supervisor.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ParlorError, Result};
