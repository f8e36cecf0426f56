//! Live monitor state: packet history, alerts, throughput, settings.
//!
//! The [`Monitor`] owns every piece of state derived from the stream and
//! is the dispatch point behind frame classification: each classified
//! frame is applied to exactly one consumer. All mutation happens under
//! one lock, driven by the supervisor's single event loop, so the
//! bounded collections are never contended mid-update.
//!
//! # Data Flow
//!
//! ```text
//!                    ┌────────────────────────────────────┐
//!  raw frame ──────► │ Frame::classify                    │
//!                    │   packet ──► buffer + rate + stats │
//!                    │   alert ───► alert log             │
//!                    │   config ──► settings mirror       │
//!                    │   status ──► log only              │
//!                    │   error ───► connection state      │
//!                    │   (malformed ► one diagnostic)     │
//!                    └────────────────────────────────────┘
//! ```
//!
//! Reads return snapshots; the filtered packet view is recomputed from
//! the live buffer on every read, so it always reflects both the current
//! filter and the current buffer contents.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `buffer` | Bounded packet history |
//! | `rate` | Throughput estimation |
//! | `alerts` | Alert log and correlation |

// ============================================================================
// Submodules
// ============================================================================

/// Alert log and alert-to-packet correlation.
pub mod alerts;

/// Bounded packet history buffer.
pub mod buffer;

/// Throughput estimation.
pub mod rate;

// ============================================================================
// Re-exports
// ============================================================================

pub use alerts::{ALERT_WINDOW_MS, AlertFilter, AlertLog, MAX_ALERTS};
pub use buffer::{MAX_PACKETS, PacketBuffer};
pub use rate::{MAX_SAMPLES, RATE_INTERVAL_MS, RateEstimator, TrafficSample};

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::protocol::{Alert, CaptureUpdate, Frame, Packet};

// ============================================================================
// StreamStats
// ============================================================================

/// Cumulative stream statistics since the monitor was created.
///
/// Unlike the packet buffer these are totals, not a window: eviction
/// from the buffer does not decrement them.
#[derive(Debug, Clone, Default)]
pub struct StreamStats {
    /// Total packets received.
    pub total_packets: u64,

    /// Total packet bytes received.
    pub total_bytes: u64,

    /// Packets received per protocol.
    pub protocols: FxHashMap<String, u64>,
}

// ============================================================================
// IngestOutcome
// ============================================================================

/// What one ingested frame did to the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A packet record was buffered.
    Packet,
    /// An alert was logged.
    Alert,
    /// An informational status frame was logged and dropped.
    Status,
    /// The capture settings mirror was overwritten.
    ConfigChange,
    /// The server reported a stream error; the supervisor should
    /// transition the connection state.
    StreamError {
        /// Server-provided description.
        message: String,
    },
    /// The frame was malformed and discarded with no state change.
    Discarded,
}

// ============================================================================
// Monitor
// ============================================================================

/// Shared monitor state handle.
///
/// Cheap to clone; all clones observe the same state. Mutation flows
/// through [`Monitor::ingest`] (the supervisor's event loop) and the
/// two filter operations (operator interaction); everything else is a
/// snapshot read.
#[derive(Debug, Clone)]
pub struct Monitor {
    inner: Arc<Mutex<MonitorState>>,
}

/// The state behind the lock.
#[derive(Debug)]
struct MonitorState {
    buffer: PacketBuffer,
    alerts: AlertLog,
    filter: Option<AlertFilter>,
    rate: RateEstimator,
    stats: StreamStats,
    settings: Option<CaptureUpdate>,
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Monitor {
    /// Creates a monitor with default capacities
    /// ([`MAX_PACKETS`] packets, [`MAX_SAMPLES`] rate samples).
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacities(MAX_PACKETS, MAX_SAMPLES)
    }

    /// Creates a monitor with explicit buffer and history capacities.
    #[must_use]
    pub fn with_capacities(buffer_capacity: usize, history_capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MonitorState {
                buffer: PacketBuffer::new(buffer_capacity),
                alerts: AlertLog::new(),
                filter: None,
                rate: RateEstimator::new(history_capacity),
                stats: StreamStats::default(),
                settings: None,
            })),
        }
    }
}

// ============================================================================
// Monitor - Ingest
// ============================================================================

impl Monitor {
    /// Classifies and applies one raw text frame, stamped with the
    /// current wall clock.
    pub fn ingest(&self, text: &str) -> IngestOutcome {
        self.ingest_at(text, epoch_ms())
    }

    /// Classifies and applies one raw text frame at an explicit time.
    ///
    /// A malformed frame produces exactly one diagnostic and no state
    /// change anywhere; classification errors never escape this
    /// boundary.
    pub fn ingest_at(&self, text: &str, now_ms: u64) -> IngestOutcome {
        let frame = match Frame::classify(text) {
            Ok(frame) => frame,
            Err(error) => {
                warn!(error = %error, "Discarding malformed frame");
                return IngestOutcome::Discarded;
            }
        };

        match frame {
            Frame::Packet(packet) => {
                let mut state = self.inner.lock();
                state.stats.total_packets += 1;
                state.stats.total_bytes += u64::from(packet.length);
                *state
                    .stats
                    .protocols
                    .entry(packet.proto.clone())
                    .or_insert(0) += 1;
                state.rate.record(now_ms);
                state.buffer.push(packet);
                IngestOutcome::Packet
            }

            Frame::Alert(alert) => {
                debug!(level = %alert.level, message = %alert.message, "Anomaly alert received");
                self.inner.lock().alerts.push(alert);
                IngestOutcome::Alert
            }

            Frame::ConnectionStatus { params } => {
                debug!(%params, "Connection status frame");
                IngestOutcome::Status
            }

            Frame::Error { message } => {
                warn!(message = %message, "Server reported stream error");
                IngestOutcome::StreamError { message }
            }

            Frame::ConfigChange(update) => {
                info!(
                    interface = %update.interface,
                    bpf_filter = %update.bpf_filter,
                    "Capture settings changed"
                );
                self.inner.lock().settings = Some(update);
                IngestOutcome::ConfigChange
            }
        }
    }
}

// ============================================================================
// Monitor - Alert Correlation
// ============================================================================

impl Monitor {
    /// Activates the correlation filter for an alert.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if the alert carries no
    /// `meta.window_start`.
    pub fn select_alert(&self, alert: &Alert) -> Result<()> {
        let filter = AlertFilter::for_alert(alert)?;
        debug!(
            start_ms = filter.start_ms,
            end_ms = filter.end_ms,
            "Alert filter activated"
        );
        self.inner.lock().filter = Some(filter);
        Ok(())
    }

    /// Clears the active correlation filter, restoring the full view.
    pub fn clear_filter(&self) {
        self.inner.lock().filter = None;
    }

    /// Returns the active correlation filter, if any.
    #[must_use]
    pub fn active_filter(&self) -> Option<AlertFilter> {
        self.inner.lock().filter.clone()
    }
}

// ============================================================================
// Monitor - Snapshots
// ============================================================================

impl Monitor {
    /// Returns the full packet history, newest first.
    #[must_use]
    pub fn packets(&self) -> Vec<Packet> {
        self.inner.lock().buffer.snapshot()
    }

    /// Returns the number of retained packets.
    #[must_use]
    pub fn packet_count(&self) -> usize {
        self.inner.lock().buffer.len()
    }

    /// Returns the packet view the operator is looking at.
    ///
    /// With no active filter this is the full history; with a filter it
    /// is exactly the packets inside the alert window, newest first. An
    /// empty filtered result is valid and distinct from an empty
    /// buffer - check [`Monitor::packet_count`] to tell them apart.
    #[must_use]
    pub fn visible_packets(&self) -> Vec<Packet> {
        let state = self.inner.lock();
        match &state.filter {
            None => state.buffer.snapshot(),
            Some(filter) => state
                .buffer
                .iter()
                .filter(|packet| filter.matches(packet))
                .cloned()
                .collect(),
        }
    }

    /// Returns the retained alerts, newest first.
    #[must_use]
    pub fn alerts(&self) -> Vec<Alert> {
        self.inner.lock().alerts.snapshot()
    }

    /// Returns the most recently published packets-per-second rate.
    #[must_use]
    pub fn current_rate(&self) -> u32 {
        self.inner.lock().rate.current_rate()
    }

    /// Returns the throughput sample history, oldest first.
    #[must_use]
    pub fn traffic_history(&self) -> Vec<TrafficSample> {
        self.inner.lock().rate.history()
    }

    /// Returns cumulative stream statistics.
    #[must_use]
    pub fn stats(&self) -> StreamStats {
        self.inner.lock().stats.clone()
    }

    /// Returns the last capture settings broadcast by the server.
    #[must_use]
    pub fn capture_settings(&self) -> Option<CaptureUpdate> {
        self.inner.lock().settings.clone()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Current wall-clock time in milliseconds since the epoch.
fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

// ============================================================================
// Tests
// ============================================================================
