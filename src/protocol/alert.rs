//! Anomaly alert types.
//!
//! Alerts are emitted by the backend's anomaly detector when the traffic
//! rate deviates from the rolling baseline (z-score test). They arrive
//! tagged with `"type": "alert"` and carry the detection window metadata
//! used for packet correlation.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// AlertLevel
// ============================================================================

/// Severity of an anomaly alert.
///
/// The detector grades by z-score magnitude: mild deviations are
/// `Info`, sustained ones `Warning`, extreme ones `Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Mild deviation, informational only.
    Info,
    /// Notable deviation worth operator attention.
    Warning,
    /// Extreme deviation, likely an incident.
    Critical,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

// ============================================================================
// AlertMeta
// ============================================================================

/// Detection metadata attached to an alert.
///
/// All fields are optional on the wire; correlation requires
/// `window_start` (see [`crate::monitor::AlertFilter`]).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertMeta {
    /// Start of the detection window, seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_start: Option<f64>,

    /// Packets observed in the detection window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_count: Option<u64>,

    /// Z-score that triggered the alert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,

    /// Z-score threshold in effect when the alert fired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

// ============================================================================
// Alert
// ============================================================================

/// An anomaly alert as delivered over the stream.
///
/// Immutable once received. The client retains at most the 10 most
/// recent alerts, newest first.
///
/// # Format
///
/// ```json
/// {
///   "type": "alert",
///   "level": "warning",
///   "message": "Traffic spike: 340 packets/s (z=3.4)",
///   "timestamp": 1700000000.0,
///   "meta": {
///     "window_start": 1699999940.0,
///     "packet_count": 340,
///     "z_score": 3.4,
///     "threshold": 3.0
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Alert severity.
    pub level: AlertLevel,

    /// Human-readable description.
    pub message: String,

    /// When the alert was generated, seconds since the epoch.
    pub timestamp: f64,

    /// Detection metadata.
    #[serde(default)]
    pub meta: AlertMeta,
}

impl Alert {
    /// Returns `true` if this alert carries enough metadata to be
    /// correlated with a packet window.
    #[inline]
    #[must_use]
    pub fn is_correlatable(&self) -> bool {
        self.meta.window_start.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
