//! Inbound frame classification.
//!
//! [`Frame::classify`] is the single point where raw frame text meets the
//! wire format; every other component consumes the typed [`Frame`] and
//! stays ignorant of JSON.
//!
//! # Discriminator
//!
//! Frames carrying a `"type"` field are classified by its value:
//!
//! | `type` | Variant |
//! |--------|---------|
//! | `alert` | [`Frame::Alert`] |
//! | `connection_status` | [`Frame::ConnectionStatus`] |
//! | `error` | [`Frame::Error`] |
//! | `config_change` | [`Frame::ConfigChange`] |
//! | anything else, or absent | [`Frame::Packet`] |
//!
//! The default-to-packet rule is by construction, not a fallback hack:
//! the wire protocol does not tag ordinary packet frames, so "untagged"
//! is the packet discriminator. A tagged frame whose body does not match
//! its declared type is a protocol error and the caller drops it.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

use super::alert::Alert;
use super::packet::Packet;

// ============================================================================
// CaptureUpdate
// ============================================================================

/// Payload of a `config_change` frame.
///
/// Broadcast by the backend after capture settings are applied; the
/// client mirrors it passively (no acknowledgement, no side effects).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureUpdate {
    /// Interface now being captured.
    pub interface: String,

    /// BPF filter now in effect, empty when unfiltered.
    #[serde(default)]
    pub bpf_filter: String,

    /// When the change was applied, seconds since the epoch.
    #[serde(default)]
    pub timestamp: f64,
}

// ============================================================================
// Frame
// ============================================================================

/// A classified inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// An ordinary packet record (the untagged default).
    Packet(Packet),

    /// An anomaly alert.
    Alert(Alert),

    /// Informational connection status; logged, never stored.
    ConnectionStatus {
        /// Raw frame body, for diagnostics.
        params: Value,
    },

    /// Server-reported stream error; transitions the connection state.
    Error {
        /// Server-provided description, empty if absent.
        message: String,
    },

    /// Capture configuration changed server-side.
    ConfigChange(CaptureUpdate),
}

impl Frame {
    /// Classifies one raw text frame.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Json`] if the payload is not well-formed JSON
    /// - [`crate::Error::Protocol`] if a tagged frame is missing
    ///   required fields for its declared type, or an untagged frame is
    ///   not a valid packet record
    ///
    /// Errors here never carry past the router boundary: the caller logs
    /// one diagnostic and drops the frame with no other state change.
    pub fn classify(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;

        // Owned so the arms below can consume `value`.
        let discriminator = value
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_owned);

        match discriminator.as_deref() {
            Some("alert") => serde_json::from_value(value)
                .map(Self::Alert)
                .map_err(|e| Error::protocol(format!("alert frame: {e}"))),

            Some("connection_status") => Ok(Self::ConnectionStatus { params: value }),

            Some("error") => Ok(Self::Error {
                message: value
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }),

            Some("config_change") => serde_json::from_value(value)
                .map(Self::ConfigChange)
                .map_err(|e| Error::protocol(format!("config_change frame: {e}"))),

            // No discriminator, or one this client does not recognize:
            // packet frames are untagged on the wire.
            _ => serde_json::from_value(value)
                .map(Self::Packet)
                .map_err(|e| Error::protocol(format!("packet frame: {e}"))),
        }
    }

    /// Returns a short label for logging.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Packet(_) => "packet",
            Self::Alert(_) => "alert",
            Self::ConnectionStatus { .. } => "connection_status",
            Self::Error { .. } => "error",
            Self::ConfigChange(_) => "config_change",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::protocol::alert::AlertLevel;

    #[test]
    fn test_classify_untagged_packet() {
        let text = r#"{
            "ts": 1700000000.0,
            "src": "10.0.0.1",
            "dst": "10.0.0.2",
            "proto": "UDP",
            "length": 128,
            "sport": 5353,
            "dport": 5353,
            "summary": "UDP 10.0.0.1:5353 > 10.0.0.2:5353"
        }"#;

        match Frame::classify(text).expect("classify") {
            Frame::Packet(packet) => assert_eq!(packet.proto, "UDP"),
            other => panic!("expected packet, got {}", other.kind()),
        }
    }

    #[test]
    fn test_classify_alert() {
        let text = r#"{
            "type": "alert",
            "level": "warning",
            "message": "Traffic spike",
            "timestamp": 1700000000.0,
            "meta": {"window_start": 1699999940.0}
        }"#;

        match Frame::classify(text).expect("classify") {
            Frame::Alert(alert) => assert_eq!(alert.level, AlertLevel::Warning),
            other => panic!("expected alert, got {}", other.kind()),
        }
    }

    #[test]
    fn test_classify_connection_status() {
        let text = r#"{"type": "connection_status", "clients": 2}"#;

        match Frame::classify(text).expect("classify") {
            Frame::ConnectionStatus { params } => {
                assert_eq!(params.get("clients").and_then(Value::as_u64), Some(2));
            }
            other => panic!("expected connection_status, got {}", other.kind()),
        }
    }

    #[test]
    fn test_classify_error_frame() {
        let text = r#"{"type": "error", "message": "capture thread died"}"#;

        match Frame::classify(text).expect("classify") {
            Frame::Error { message } => assert_eq!(message, "capture thread died"),
            other => panic!("expected error, got {}", other.kind()),
        }
    }

    #[test]
    fn test_classify_error_frame_without_message() {
        let text = r#"{"type": "error"}"#;

        match Frame::classify(text).expect("classify") {
            Frame::Error { message } => assert!(message.is_empty()),
            other => panic!("expected error, got {}", other.kind()),
        }
    }

    #[test]
    fn test_classify_config_change() {
        let text = r#"{
            "type": "config_change",
            "interface": "eth0",
            "bpf_filter": "tcp port 443",
            "timestamp": 1700000000.0
        }"#;

        match Frame::classify(text).expect("classify") {
            Frame::ConfigChange(update) => {
                assert_eq!(update.interface, "eth0");
                assert_eq!(update.bpf_filter, "tcp port 443");
            }
            other => panic!("expected config_change, got {}", other.kind()),
        }
    }

    #[test]
    fn test_classify_unknown_tag_falls_through_to_packet() {
        // An unrecognized tag is parsed as a packet; this one is not a
        // valid packet record, so it surfaces as a protocol-level error.
        let text = r#"{"type": "anomaly_config_change", "window_size": 60}"#;
        assert!(Frame::classify(text).is_err());
    }

    #[test]
    fn test_classify_rejects_garbage() {
        assert!(Frame::classify("not json at all").is_err());
        assert!(Frame::classify("").is_err());
        assert!(Frame::classify("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_classify_rejects_malformed_alert() {
        // Tagged as alert but missing `level`/`timestamp`.
        let text = r#"{"type": "alert", "message": "incomplete"}"#;
        let err = Frame::classify(text).expect_err("must fail");
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_classify_rejects_malformed_config_change() {
        let text = r#"{"type": "config_change", "bpf_filter": "tcp"}"#;
        assert!(Frame::classify(text).is_err());
    }
}
