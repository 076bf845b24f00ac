//! Payload shapes for the tags this core produces or consumes.

use serde::{Deserialize, Serialize};

/// `data` for an `auth` command.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthCommand {
    /// Auth mechanism (field name `type` in JSON). Rooms only offer the
    /// shared-passcode mechanism.
    #[serde(rename = "type")]
    pub mechanism: String,
    pub passcode: String,
}

impl AuthCommand {
    /// Passcode-mechanism auth.
    pub fn passcode(passcode: impl Into<String>) -> Self {
        Self {
            mechanism: "passcode".to_owned(),
            passcode: passcode.into(),
        }
    }
}

/// `data` for a `nick` command.
#[derive(Debug, Serialize, Deserialize)]
pub struct NickCommand {
    pub name: String,
}

/// `data` for a `send` command. `parent` is the id of the message being
/// replied to; empty for a top-level message.
#[derive(Debug, Serialize, Deserialize)]
pub struct SendCommand {
    pub content: String,
    pub parent: String,
}

/// `data` of an inbound `ping-event`: the server clock, Unix seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PingEvent {
    pub time: i64,
}

/// `data` for a `ping-reply`: echoes the event's timestamp unchanged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PingReply {
    pub time: i64,
}
