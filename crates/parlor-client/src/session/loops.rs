//! The session loop tasks and the heartbeat handler.
//!
//! One reader, one writer, one router, cooperating only through the
//! session queues. Each loop runs until a fatal error, a closed queue, or
//! the shutdown signal.

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;

use parlor_core::protocol::types::PingEvent;
use parlor_core::protocol::{self, Packet, PacketType};
use parlor_core::{ParlorError, Result};

use super::SessionHandle;

/// Pull frames off the stream, decode, and forward to the inbound queue in
/// arrival order.
pub(super) async fn receive<R, E>(
    mut read: R,
    inbound: mpsc::Sender<Packet>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()>
where
    R: Stream<Item = std::result::Result<Message, E>> + Unpin,
    E: std::fmt::Display,
{
    loop {
        let incoming = tokio::select! {
            _ = shutdown.changed() => return Ok(()),
            incoming = read.next() => incoming,
        };
        let message = match incoming {
            Some(Ok(message)) => message,
            Some(Err(err)) => return Err(ParlorError::Transport(format!("read: {err}"))),
            None => return Err(ParlorError::Transport("stream closed".into())),
        };
        match message {
            Message::Text(frame) => {
                let packet = protocol::decode(frame.as_str())?;
                if inbound.send(packet).await.is_err() {
                    // Dispatcher is gone; it already reported why.
                    return Ok(());
                }
            }
            Message::Close(_) => {
                return Err(ParlorError::Transport("server closed the connection".into()))
            }
            Message::Binary(_) => {
                return Err(ParlorError::Decode("unexpected binary frame".into()))
            }
            // WebSocket-level ping/pong stays in the transport layer; the
            // protocol's own heartbeat arrives as a text frame.
            _ => {}
        }
    }
}

/// Drain the outbound queue: encode and write one packet per iteration, in
/// enqueue order.
pub(super) async fn write_outbound<W>(
    mut write: W,
    mut outbound: mpsc::Receiver<Packet>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()>
where
    W: Sink<Message> + Unpin,
    W::Error: std::fmt::Display,
{
    loop {
        let packet = tokio::select! {
            _ = shutdown.changed() => return Ok(()),
            maybe = outbound.recv() => match maybe {
                Some(packet) => packet,
                None => return Ok(()),
            },
        };
        tracing::debug!(kind = %packet.kind, id = %packet.id, "sending packet");
        let frame = protocol::encode(&packet)?;
        write
            .send(Message::Text(frame.into()))
            .await
            .map_err(|e| ParlorError::Transport(format!("write: {e}")))?;
    }
}

/// Route inbound packets by tag, in arrival order: heartbeats get
/// answered, every other tag is logged and dropped.
pub(super) async fn dispatch(
    mut inbound: mpsc::Receiver<Packet>,
    handle: SessionHandle,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    loop {
        let packet = tokio::select! {
            _ = shutdown.changed() => return Ok(()),
            maybe = inbound.recv() => match maybe {
                Some(packet) => packet,
                None => return Ok(()),
            },
        };
        tracing::debug!(kind = %packet.kind, id = %packet.id, "dispatching packet");
        match packet.kind {
            PacketType::PingEvent => answer_ping(&packet, &handle).await?,
            ref kind => tracing::info!(%kind, "unhandled packet type"),
        }
    }
}

/// Answer one heartbeat: echo the server timestamp back unchanged.
async fn answer_ping(packet: &Packet, handle: &SessionHandle) -> Result<()> {
    let ping: PingEvent = packet.payload_as(PacketType::PingEvent)?;
    handle.send_ping_reply(ping.time).await
}
