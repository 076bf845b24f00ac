//! Client config loader (strict parsing).

pub mod schema;

use std::fs;

use parlor_core::{ParlorError, Result};

pub use schema::{ClientConfig, ConnectSection, SessionSection};

pub fn load_from_file(path: &str) -> Result<ClientConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ParlorError::InvalidConfig(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ClientConfig> {
    let cfg: ClientConfig =
        serde_yaml::from_str(s).map_err(|e| ParlorError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg = load_from_str("room: welcome\nnick: parlor\n").unwrap();
        assert_eq!(cfg.connect.attempts, 1);
        assert_eq!(cfg.connect.retry_delay_ms, 5000);
        assert_eq!(cfg.session.outbound_depth, 32);
        assert!(cfg.auth_passcode().is_none());
    }

    #[test]
    fn empty_passcode_counts_as_absent() {
        let cfg = load_from_str("room: welcome\nnick: parlor\npasscode: \"\"\n").unwrap();
        assert!(cfg.auth_passcode().is_none());
    }

    #[test]
    fn configured_passcode_is_exposed() {
        let cfg = load_from_str("room: private\nnick: parlor\npasscode: hunter2\n").unwrap();
        assert_eq!(cfg.auth_passcode(), Some("hunter2"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(load_from_str("room: welcome\nnick: parlor\nrome: oops\n").is_err());
    }

    #[test]
    fn empty_room_fails_validation() {
        let err = load_from_str("room: \"\"\nnick: parlor\n").unwrap_err();
        assert!(matches!(err, ParlorError::InvalidConfig(_)));
    }

    #[test]
    fn zero_connect_attempts_fail_validation() {
        let err =
            load_from_str("room: welcome\nnick: parlor\nconnect:\n  attempts: 0\n").unwrap_err();
        assert!(matches!(err, ParlorError::InvalidConfig(_)));
    }

    #[test]
    fn zero_queue_depth_fails_validation() {
        let err = load_from_str("room: welcome\nnick: parlor\nsession:\n  outbound_depth: 0\n")
            .unwrap_err();
        assert!(matches!(err, ParlorError::InvalidConfig(_)));
    }
}
