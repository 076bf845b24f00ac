use serde::Deserialize;

use parlor_core::{ParlorError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Room to join; interpolated into the upgrade path.
    pub room: String,

    /// Display name announced at startup.
    pub nick: String,

    /// Room passcode. Absent or empty means the room is public and no auth
    /// command is ever sent.
    #[serde(default)]
    pub passcode: Option<String>,

    #[serde(default)]
    pub connect: ConnectSection,

    #[serde(default)]
    pub session: SessionSection,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.room.is_empty() {
            return Err(ParlorError::InvalidConfig("room must not be empty".into()));
        }
        if self.nick.is_empty() {
            return Err(ParlorError::InvalidConfig("nick must not be empty".into()));
        }
        self.connect.validate()?;
        self.session.validate()?;
        Ok(())
    }

    /// Passcode to authenticate with, if one is configured.
    pub fn auth_passcode(&self) -> Option<&str> {
        self.passcode.as_deref().filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectSection {
    /// Connection attempts before giving up. With 1, the first failure is
    /// reported straight to the caller.
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for ConnectSection {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl ConnectSection {
    pub fn validate(&self) -> Result<()> {
        if self.attempts == 0 {
            return Err(ParlorError::InvalidConfig(
                "connect.attempts must be at least 1".into(),
            ));
        }
        if !(100..=60000).contains(&self.retry_delay_ms) {
            return Err(ParlorError::InvalidConfig(
                "connect.retry_delay_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }
}

fn default_attempts() -> u32 {
    1
}
fn default_retry_delay_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSection {
    /// Outbound queue depth. A full queue blocks command senders until the
    /// writer drains it; this is the session's only backpressure.
    #[serde(default = "default_queue_depth")]
    pub outbound_depth: usize,

    #[serde(default = "default_queue_depth")]
    pub inbound_depth: usize,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            outbound_depth: default_queue_depth(),
            inbound_depth: default_queue_depth(),
        }
    }
}

impl SessionSection {
    pub fn validate(&self) -> Result<()> {
        if self.outbound_depth == 0 || self.inbound_depth == 0 {
            return Err(ParlorError::InvalidConfig(
                "session queue depths must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_queue_depth() -> usize {
    32
}
