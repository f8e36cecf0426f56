//! Alert log and alert-to-packet correlation.
//!
//! The log retains the 10 most recent anomaly alerts, newest first.
//! Selecting an alert derives an [`AlertFilter`]: a fixed 60-second
//! window anchored at the alert's detection `window_start`, used to pick
//! out the packets that produced the alert from the live buffer.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::protocol::{Alert, Packet};

// ============================================================================
// Constants
// ============================================================================

/// Maximum retained alerts.
pub const MAX_ALERTS: usize = 10;

/// Correlation window span, milliseconds.
pub const ALERT_WINDOW_MS: f64 = 60_000.0;

// ============================================================================
// AlertFilter
// ============================================================================

/// An active alert correlation window.
///
/// Matches packets whose capture time in epoch-ms lies in the closed
/// interval `[start_ms, end_ms]`, inclusive on both ends. The filter
/// always references an alert that exists (or did exist) in the log;
/// it survives the alert's own eviction.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertFilter {
    /// Window start, milliseconds since the epoch.
    pub start_ms: f64,

    /// Window end, milliseconds since the epoch.
    pub end_ms: f64,

    /// The selected alert.
    pub alert: Alert,
}

impl AlertFilter {
    /// Derives the filter for an alert.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the alert has no
    /// `meta.window_start` to anchor the window.
    pub fn for_alert(alert: &Alert) -> Result<Self> {
        let window_start = alert
            .meta
            .window_start
            .ok_or_else(|| Error::invalid_argument("alert has no correlation window"))?;

        let start_ms = window_start * 1000.0;
        Ok(Self {
            start_ms,
            end_ms: start_ms + ALERT_WINDOW_MS,
            alert: alert.clone(),
        })
    }

    /// Returns `true` if the packet falls inside the window.
    #[inline]
    #[must_use]
    pub fn matches(&self, packet: &Packet) -> bool {
        let ts_ms = packet.ts_millis();
        ts_ms >= self.start_ms && ts_ms <= self.end_ms
    }
}

// ============================================================================
// AlertLog
// ============================================================================

/// Bounded, newest-first anomaly alert log.
#[derive(Debug, Clone, Default)]
pub struct AlertLog {
    /// Newest alert at the front.
    entries: VecDeque<Alert>,
}

impl AlertLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends an alert, truncating to the [`MAX_ALERTS`] most recent.
    pub fn push(&mut self, alert: Alert) {
        self.entries.push_front(alert);
        self.entries.truncate(MAX_ALERTS);
    }

    /// Returns the number of retained alerts.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no alerts are retained.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates retained alerts, newest first.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.entries.iter()
    }

    /// Returns the retained alerts, newest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Alert> {
        self.entries.iter().cloned().collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
