//! Two-phase connection establisher.
//!
//! The remote endpoint is fixed; only the room name varies, interpolated
//! into the upgrade path. The phases fail distinctly: TCP/TLS as
//! [`ParlorError::Transport`], the WebSocket handshake as
//! [`ParlorError::Upgrade`]. No retry happens here; [`connect_with_retry`]
//! layers the bounded policy on top.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig as TlsConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tokio_tungstenite::{client_async, WebSocketStream};

use parlor_core::{ParlorError, Result};

use crate::config::ConnectSection;

/// Fixed chat platform endpoint.
pub const REMOTE_HOST: &str = "euphoria.io";
pub const REMOTE_PORT: u16 = 443;

/// The upgraded duplex stream a session runs on.
pub type WsStream = WebSocketStream<TlsStream<TcpStream>>;

fn room_url(room: &str) -> String {
    format!("wss://{REMOTE_HOST}/room/{room}/ws")
}

fn tls_config() -> TlsConfig {
    let roots = RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    TlsConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth()
}

/// Dial the platform and upgrade to a room-scoped WebSocket.
pub async fn connect(room: &str) -> Result<WsStream> {
    tracing::debug!(room, host = REMOTE_HOST, "connecting via TLS");
    let tcp = TcpStream::connect((REMOTE_HOST, REMOTE_PORT))
        .await
        .map_err(|e| ParlorError::Transport(format!("tcp connect: {e}")))?;

    let server_name = ServerName::try_from(REMOTE_HOST.to_string())
        .map_err(|e| ParlorError::Transport(format!("invalid server name: {e}")))?;
    let tls = TlsConnector::from(Arc::new(tls_config()))
        .connect(server_name, tcp)
        .await
        .map_err(|e| ParlorError::Transport(format!("tls handshake: {e}")))?;

    let (ws, _response) = client_async(room_url(room), tls)
        .await
        .map_err(|e| ParlorError::Upgrade(e.to_string()))?;

    tracing::debug!(room, "connection complete");
    Ok(ws)
}

/// [`connect`] wrapped in a bounded attempt loop with a fixed delay.
pub async fn connect_with_retry(room: &str, cfg: &ConnectSection) -> Result<WsStream> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match connect(room).await {
            Ok(stream) => return Ok(stream),
            Err(err) if attempt < cfg.attempts => {
                tracing::warn!(
                    %err,
                    attempt,
                    max_attempts = cfg.attempts,
                    "connect failed, retrying"
                );
                tokio::time::sleep(Duration::from_millis(cfg.retry_delay_ms)).await;
            }
            Err(err) => return Err(err),
        }
    }
}
