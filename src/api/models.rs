//! REST request and response models.
//!
//! Mirrors the backend's JSON shapes for the configuration, AI
//! explanation, and status endpoints.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// NetworkInterface
// ============================================================================

/// One capturable network interface, as listed by `GET /interfaces`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    /// Interface name (e.g. `eth0`, `wlan0`).
    pub name: String,

    /// Human-readable description, if the backend provides one.
    #[serde(default)]
    pub description: Option<String>,

    /// Whether the interface is currently up.
    #[serde(default)]
    pub is_up: bool,
}

// ============================================================================
// CaptureSettings
// ============================================================================

/// Capture settings request for `POST /capture/settings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Interface to capture on.
    pub iface: String,

    /// BPF filter expression; `None` captures everything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bpf: Option<String>,
}

impl CaptureSettings {
    /// Creates settings for an interface with no filter.
    #[inline]
    #[must_use]
    pub fn for_interface(iface: impl Into<String>) -> Self {
        Self {
            iface: iface.into(),
            bpf: None,
        }
    }

    /// Sets the BPF filter expression.
    #[inline]
    #[must_use]
    pub fn with_filter(mut self, bpf: impl Into<String>) -> Self {
        self.bpf = Some(bpf.into());
        self
    }
}

// ============================================================================
// CaptureAck
// ============================================================================

/// Acknowledgement for applied capture settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CaptureAck {
    /// Always `"success"` on the success path.
    pub status: String,

    /// Human-readable confirmation.
    #[serde(default)]
    pub message: String,

    /// Interface now in effect.
    #[serde(default)]
    pub interface: String,

    /// Filter now in effect, if any.
    #[serde(default)]
    pub bpf_filter: Option<String>,
}

// ============================================================================
// Explanation
// ============================================================================

/// AI explanation of a packet summary, from `POST /ai/explain`.
///
/// Passed through unmodified: the client forwards the packet summary
/// verbatim and does not reinterpret the result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Explanation {
    /// The generated explanation text.
    pub explanation: String,

    /// `true` when the backend answered from its offline mock instead
    /// of a live model.
    #[serde(default)]
    pub is_mock: bool,
}

// ============================================================================
// SystemStatus
// ============================================================================

/// Backend health snapshot from `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SystemStatus {
    /// Overall status (`healthy`, `degraded`, `error`).
    pub status: String,

    /// Whether packet capture is running.
    pub capture_active: bool,

    /// Interface currently being captured, if any.
    #[serde(default)]
    pub current_interface: Option<String>,

    /// BPF filter currently in effect, if any.
    #[serde(default)]
    pub current_filter: Option<String>,

    /// Number of connected stream clients.
    #[serde(default)]
    pub connected_clients: u32,
}

// ============================================================================
// Tests
// ============================================================================
