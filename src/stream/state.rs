//! Connection state machine and reconnection policy.
//!
//! The supervisor owns exactly one [`ConnectionState`] value at any
//! time and is the only writer. Transitions follow the edges:
//!
//! ```text
//! disconnected --connect--> connecting --open--> connected
//! connected --close--> disconnected --timer--> reconnecting --> connecting
//! any state --transport error--> error --timer--> connecting
//! ```
//!
//! There is no terminal state while the stream handle is alive; teardown
//! closes the link and cancels the pending timer, after which no further
//! transitions occur.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Delay before reconnecting after an abnormal close (link dropped
/// without a close handshake).
pub const RECONNECT_AFTER_ABNORMAL: Duration = Duration::from_millis(1000);

/// Delay before reconnecting after a normal, intentional close.
pub const RECONNECT_AFTER_NORMAL: Duration = Duration::from_millis(5000);

/// Delay before reconnecting after a close with any other reason.
pub const RECONNECT_FALLBACK: Duration = Duration::from_millis(3000);

/// Delay before reconnecting after a transport-level error.
pub const RECONNECT_AFTER_ERROR: Duration = Duration::from_millis(5000);

/// WebSocket close code: normal closure.
const CLOSE_NORMAL: u16 = 1000;

/// WebSocket close code: abnormal closure (no close frame received).
const CLOSE_ABNORMAL: u16 = 1006;

// ============================================================================
// ConnectionState
// ============================================================================

/// Lifecycle state of the streaming connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection, none being attempted.
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// The link is open and frames are flowing.
    Connected,
    /// A reconnection timer fired; a new attempt is starting.
    Reconnecting,
    /// The link failed at the transport level; retry pending.
    Error,
}

impl ConnectionState {
    /// Returns `true` if the link is open.
    #[inline]
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Error => "error",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// Reconnect Policy
// ============================================================================

/// Selects the reconnection delay for a close reason.
///
/// `None` means the link ended without a close handshake, which is the
/// abnormal-termination case.
#[inline]
#[must_use]
pub fn reconnect_delay(close_code: Option<u16>) -> Duration {
    match close_code {
        Some(CLOSE_NORMAL) => RECONNECT_AFTER_NORMAL,
        Some(CLOSE_ABNORMAL) | None => RECONNECT_AFTER_ABNORMAL,
        Some(_) => RECONNECT_FALLBACK,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconnect_delay_by_close_code() {
        assert_eq!(reconnect_delay(Some(1006)), Duration::from_millis(1000));
        assert_eq!(reconnect_delay(Some(1000)), Duration::from_millis(5000));
        assert_eq!(reconnect_delay(Some(1001)), Duration::from_millis(3000));
        assert_eq!(reconnect_delay(Some(4000)), Duration::from_millis(3000));
    }

    #[test]
    fn test_missing_close_handshake_is_abnormal() {
        assert_eq!(reconnect_delay(None), RECONNECT_AFTER_ABNORMAL);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ConnectionState::Disconnected.to_string(), "disconnected");
        assert_eq!(ConnectionState::Reconnecting.to_string(), "reconnecting");
    }

    #[test]
    fn test_is_connected() {
        assert!(ConnectionState::Connected.is_connected());
        assert!(!ConnectionState::Connecting.is_connected());
        assert!(!ConnectionState::Error.is_connected());
    }
}
