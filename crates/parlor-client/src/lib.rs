//! parlor session runtime.
//!
//! This crate wires the connection establisher, the packet loops, and the
//! command surface into a running chat session. It is consumed by the
//! binary (`main.rs`) and by the integration tests.

pub mod config;
pub mod session;
pub mod transport;
