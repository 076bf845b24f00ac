//! Connection establishment (TLS dial + WebSocket upgrade).

mod connect;

pub use connect::{connect, connect_with_retry, WsStream, REMOTE_HOST, REMOTE_PORT};
