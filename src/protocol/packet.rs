//! Packet record type.
//!
//! One [`Packet`] is produced per captured network packet and streamed to
//! the client as an untagged JSON object. Packets are immutable once
//! received: the buffer replaces them wholesale on eviction, never in
//! place.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// Packet
// ============================================================================

/// A single captured packet as delivered over the stream.
///
/// # Format
///
/// ```json
/// {
///   "ts": 1700000000.123,
///   "src": "192.168.1.10",
///   "dst": "93.184.216.34",
///   "proto": "TCP",
///   "length": 60,
///   "sport": 54321,
///   "dport": 443,
///   "summary": "TCP 192.168.1.10:54321 > 93.184.216.34:443"
/// }
/// ```
///
/// `sport`/`dport` are absent for protocols without ports (e.g. ICMP).
/// Note there is deliberately no `type` field: packet frames are the
/// untagged default shape on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    /// Capture timestamp, seconds since the Unix epoch.
    pub ts: f64,

    /// Source address (IPv4 or IPv6).
    pub src: String,

    /// Destination address (IPv4 or IPv6).
    pub dst: String,

    /// Protocol name (TCP, UDP, ICMP, ...).
    pub proto: String,

    /// Packet length in bytes.
    pub length: u32,

    /// Source port, if the protocol carries ports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sport: Option<u16>,

    /// Destination port, if the protocol carries ports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dport: Option<u16>,

    /// Human-readable one-line summary.
    pub summary: String,
}

impl Packet {
    /// Returns the capture timestamp in milliseconds since the epoch.
    ///
    /// Alert correlation windows are expressed in epoch-ms; this is the
    /// comparison key.
    #[inline]
    #[must_use]
    pub fn ts_millis(&self) -> f64 {
        self.ts * 1000.0
    }

    /// Returns `true` if the packet carries transport-layer ports.
    #[inline]
    #[must_use]
    pub fn has_ports(&self) -> bool {
        self.sport.is_some() || self.dport.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_parse_full() {
        let json_str = r#"{
            "ts": 1700000000.5,
            "src": "10.0.0.1",
            "dst": "10.0.0.2",
            "proto": "TCP",
            "length": 1500,
            "sport": 443,
            "dport": 51234,
            "summary": "TCP 10.0.0.1:443 > 10.0.0.2:51234"
        }"#;

        let packet: Packet = serde_json::from_str(json_str).expect("parse packet");
        assert_eq!(packet.src, "10.0.0.1");
        assert_eq!(packet.proto, "TCP");
        assert_eq!(packet.length, 1500);
        assert_eq!(packet.sport, Some(443));
        assert!(packet.has_ports());
    }

    #[test]
    fn test_packet_parse_portless() {
        let json_str = r#"{
            "ts": 1700000001.0,
            "src": "10.0.0.1",
            "dst": "10.0.0.2",
            "proto": "ICMP",
            "length": 84,
            "summary": "ICMP echo request"
        }"#;

        let packet: Packet = serde_json::from_str(json_str).expect("parse packet");
        assert_eq!(packet.sport, None);
        assert_eq!(packet.dport, None);
        assert!(!packet.has_ports());
    }

    #[test]
    fn test_packet_parse_missing_required_field() {
        // No `ts` field: not a valid packet.
        let json_str = r#"{
            "src": "10.0.0.1",
            "dst": "10.0.0.2",
            "proto": "TCP",
            "length": 60,
            "summary": "truncated"
        }"#;

        assert!(serde_json::from_str::<Packet>(json_str).is_err());
    }

    #[test]
    fn test_ts_millis() {
        let packet = Packet {
            ts: 1000.5,
            src: "a".into(),
            dst: "b".into(),
            proto: "UDP".into(),
            length: 1,
            sport: None,
            dport: None,
            summary: String::new(),
        };
        assert_eq!(packet.ts_millis(), 1_000_500.0);
    }

    #[test]
    fn test_packet_serialize_omits_absent_ports() {
        let packet = Packet {
            ts: 1.0,
            src: "a".into(),
            dst: "b".into(),
            proto: "ICMP".into(),
            length: 84,
            sport: None,
            dport: None,
            summary: "ICMP".into(),
        };
        let json = serde_json::to_string(&packet).expect("serialize");
        assert!(!json.contains("sport"));
        assert!(!json.contains("dport"));
    }
}
