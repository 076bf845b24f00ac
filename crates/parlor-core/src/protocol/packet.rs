//! Packet envelope (JSON).
//!
//! The envelope stores `data` as `RawValue` to enable lazy parsing: the
//! dispatcher routes on the tag alone, and handlers commit to a payload
//! shape via [`Packet::payload_as`].

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{ParlorError, Result};

/// Packet tag. Determines the schema of the envelope's `data` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PacketType {
    /// Outbound room authentication (`auth`).
    Auth,
    /// Outbound display-name change (`nick`).
    Nick,
    /// Outbound chat message (`send`).
    Send,
    /// Outbound heartbeat answer (`ping-reply`).
    PingReply,
    /// Inbound server heartbeat (`ping-event`).
    PingEvent,
    /// Any tag this core does not consume; carried through verbatim.
    Other(String),
}

impl PacketType {
    /// Wire spelling of the tag.
    pub fn as_str(&self) -> &str {
        match self {
            PacketType::Auth => "auth",
            PacketType::Nick => "nick",
            PacketType::Send => "send",
            PacketType::PingReply => "ping-reply",
            PacketType::PingEvent => "ping-event",
            PacketType::Other(tag) => tag,
        }
    }
}

impl From<String> for PacketType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "auth" => PacketType::Auth,
            "nick" => PacketType::Nick,
            "send" => PacketType::Send,
            "ping-reply" => PacketType::PingReply,
            "ping-event" => PacketType::PingEvent,
            _ => PacketType::Other(tag),
        }
    }
}

impl From<PacketType> for String {
    fn from(kind: PacketType) -> Self {
        match kind {
            PacketType::Other(tag) => tag,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The wire envelope: one JSON object per text frame.
///
/// Extra top-level fields on inbound frames are ignored; missing `id` or
/// `type` is a [`ParlorError::Decode`].
#[derive(Debug, Serialize, Deserialize)]
pub struct Packet {
    /// Envelope identifier. The session stamps a fresh one on every
    /// outbound packet; nothing in this core correlates replies by it.
    pub id: String,
    /// Tag that determines the shape of `data` (field name `type` in JSON).
    #[serde(rename = "type")]
    pub kind: PacketType,
    /// Payload, stored as raw JSON (lazy parsing).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Box<RawValue>>,
}

impl Packet {
    /// Build a fresh outbound envelope around `payload`.
    pub fn command<T: Serialize>(id: u64, kind: PacketType, payload: &T) -> Result<Packet> {
        let data = serde_json::value::to_raw_value(payload)
            .map_err(|e| ParlorError::Encode(format!("{kind} payload: {e}")))?;
        Ok(Packet {
            id: id.to_string(),
            kind,
            data: Some(data),
        })
    }

    /// Decode `data` as the payload shape declared by `expected`.
    ///
    /// Fails with [`ParlorError::ProtocolViolation`] if the packet carries
    /// a different tag, no data at all, or data of the wrong shape.
    pub fn payload_as<T: DeserializeOwned>(&self, expected: PacketType) -> Result<T> {
        if self.kind != expected {
            return Err(ParlorError::ProtocolViolation(format!(
                "expected {expected} packet, got {}",
                self.kind
            )));
        }
        let raw = self
            .data
            .as_ref()
            .ok_or_else(|| ParlorError::ProtocolViolation(format!("{expected} packet has no data")))?;
        serde_json::from_str(raw.get())
            .map_err(|e| ParlorError::ProtocolViolation(format!("{expected} payload: {e}")))
    }
}

/// Decode one frame into a packet envelope. The payload stays raw.
pub fn decode(frame: &str) -> Result<Packet> {
    serde_json::from_str(frame).map_err(|e| ParlorError::Decode(e.to_string()))
}

/// Encode a packet envelope into its frame text.
pub fn encode(packet: &Packet) -> Result<String> {
    serde_json::to_string(packet).map_err(|e| ParlorError::Encode(e.to_string()))
}
