//! Session lifecycle: queue ownership, task supervision, command surface.
//!
//! A session owns the two FIFO queues and the supervisory channel; the
//! stream halves move into the receiver and writer tasks and are touched by
//! nothing else. Every background task reports its terminal error into one
//! shared fatal channel, and [`Session::run`] surfaces the first of them
//! exactly once; recovery policy belongs to the caller, not to the loops.

mod loops;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::{Sink, Stream, StreamExt};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;

use parlor_core::protocol::types::{AuthCommand, NickCommand, PingReply, SendCommand};
use parlor_core::protocol::{Packet, PacketType};
use parlor_core::{ParlorError, Result};

use crate::config::ClientConfig;
use crate::transport;

/// A running chat session.
pub struct Session {
    handle: SessionHandle,
    fatal: mpsc::Receiver<ParlorError>,
}

/// Cloneable command surface handed to external collaborators.
///
/// All sends are fire-and-forget: a command is enqueued and written in
/// order, but no server acknowledgement is awaited or correlated.
#[derive(Clone)]
pub struct SessionHandle {
    outbound: mpsc::Sender<Packet>,
    next_id: Arc<AtomicU64>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl SessionHandle {
    /// Build and enqueue a `send` command. Blocks while the outbound queue
    /// is full.
    pub async fn send_message(&self, content: &str, parent: &str) -> Result<()> {
        tracing::debug!(content, "sending text message");
        self.enqueue(
            PacketType::Send,
            &SendCommand {
                content: content.to_owned(),
                parent: parent.to_owned(),
            },
        )
        .await
    }

    /// Ask every session task to wind down cleanly.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    async fn send_auth(&self, passcode: &str) -> Result<()> {
        tracing::debug!("sending auth");
        self.enqueue(PacketType::Auth, &AuthCommand::passcode(passcode))
            .await
    }

    async fn send_nick(&self, name: &str) -> Result<()> {
        tracing::debug!(name, "sending nick");
        self.enqueue(
            PacketType::Nick,
            &NickCommand {
                name: name.to_owned(),
            },
        )
        .await
    }

    async fn send_ping_reply(&self, time: i64) -> Result<()> {
        self.enqueue(PacketType::PingReply, &PingReply { time }).await
    }

    /// Stamp a fresh envelope id and enqueue. The id varies per packet;
    /// nothing in this core correlates replies by it.
    async fn enqueue<T: Serialize>(&self, kind: PacketType, payload: &T) -> Result<()> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let packet = Packet::command(id, kind, payload)?;
        match self.outbound.send(packet).await {
            Ok(()) => Ok(()),
            // The writer wound down after a shutdown request; drop quietly.
            Err(_) if *self.shutdown.borrow() => Ok(()),
            Err(_) => Err(ParlorError::Internal("outbound queue closed".into())),
        }
    }
}

impl Session {
    /// Connect to the configured room and start the session tasks.
    pub async fn connect(cfg: &ClientConfig) -> Result<Session> {
        let stream = transport::connect_with_retry(&cfg.room, &cfg.connect).await?;
        let (write, read) = stream.split();
        Ok(Session::start(read, write, cfg))
    }

    /// Wire the session loops onto an established duplex stream.
    ///
    /// Generic over the split halves so tests can substitute channel-backed
    /// fakes for the socket.
    pub fn start<R, W, E>(read: R, write: W, cfg: &ClientConfig) -> Session
    where
        R: Stream<Item = std::result::Result<Message, E>> + Unpin + Send + 'static,
        E: std::fmt::Display + Send + 'static,
        W: Sink<Message> + Unpin + Send + 'static,
        W::Error: std::fmt::Display + Send,
    {
        let (inbound_tx, inbound_rx) = mpsc::channel(cfg.session.inbound_depth);
        let (outbound_tx, outbound_rx) = mpsc::channel(cfg.session.outbound_depth);
        let (fatal_tx, fatal_rx) = mpsc::channel(8);
        let shutdown = Arc::new(watch::channel(false).0);

        let handle = SessionHandle {
            outbound: outbound_tx,
            next_id: Arc::new(AtomicU64::new(1)),
            shutdown: Arc::clone(&shutdown),
        };

        supervise(
            "receiver",
            &fatal_tx,
            loops::receive(read, inbound_tx, shutdown.subscribe()),
        );
        supervise(
            "outbound",
            &fatal_tx,
            loops::write_outbound(write, outbound_rx, shutdown.subscribe()),
        );
        supervise(
            "dispatch",
            &fatal_tx,
            loops::dispatch(inbound_rx, handle.clone(), shutdown.subscribe()),
        );

        // Startup commands go out concurrently, fire-and-forget.
        if let Some(passcode) = cfg.auth_passcode() {
            let h = handle.clone();
            let passcode = passcode.to_owned();
            supervise("auth", &fatal_tx, async move { h.send_auth(&passcode).await });
        }
        let h = handle.clone();
        let nick = cfg.nick.clone();
        supervise("nick", &fatal_tx, async move { h.send_nick(&nick).await });

        Session {
            handle,
            fatal: fatal_rx,
        }
    }

    /// Cloneable command surface for external collaborators.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Run until the first background task dies or shutdown is requested.
    ///
    /// A fatal error is surfaced exactly once, after the remaining tasks
    /// are asked to wind down. `Ok(())` means every task exited cleanly
    /// following a [`SessionHandle::shutdown`] call.
    pub async fn run(mut self) -> Result<()> {
        match self.fatal.recv().await {
            Some(err) => {
                self.handle.shutdown();
                Err(err)
            }
            None => Ok(()),
        }
    }
}

/// Spawn a session task whose terminal error is routed into the shared
/// supervisory channel.
fn supervise<F>(task: &'static str, fatal: &mpsc::Sender<ParlorError>, fut: F)
where
    F: std::future::Future<Output = Result<()>> + Send + 'static,
{
    let fatal = fatal.clone();
    tokio::spawn(async move {
        if let Err(err) = fut.await {
            tracing::error!(task, %err, "session task failed");
            let _ = fatal.send(err).await;
        }
    });
}
