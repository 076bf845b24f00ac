//! Shared error type across parlor crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, ParlorError>;

/// Unified error type used by the protocol core and the session runtime.
///
/// Every background task failure funnels into one of these variants; the
/// session supervisor surfaces the first one to the process owner.
#[derive(Debug, Error)]
pub enum ParlorError {
    /// TCP or TLS handshake failure, or a fatal stream read/write error.
    #[error("transport: {0}")]
    Transport(String),
    /// The WebSocket upgrade handshake was refused or malformed.
    #[error("websocket upgrade: {0}")]
    Upgrade(String),
    /// An inbound frame was not a valid packet envelope.
    #[error("decode: {0}")]
    Decode(String),
    /// An outbound payload or envelope failed to serialize.
    #[error("encode: {0}")]
    Encode(String),
    /// A payload did not match the shape declared by its `type` tag.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
    /// Configuration failed to parse or validate.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// Internal invariant broke (closed queue, lost supervisor).
    #[error("internal: {0}")]
    Internal(String),
}
