//! packetwatch - Real-time network packet monitoring client.
//!
//! This library owns the client side of a live packet monitoring
//! backend: it supervises the streaming connection, classifies inbound
//! frames, and maintains bounded in-memory views that a dashboard can
//! snapshot at any time.
//!
//! # Architecture
//!
//! The client follows a supervisor model:
//!
//! - **Stream side**: one [`PacketStream`] owns one logical WebSocket
//!   connection, its state machine, and its reconnection policy
//! - **Monitor side**: the [`Monitor`] holds the bounded packet buffer,
//!   alert log, throughput history, and the capture settings mirror
//! - **REST side**: [`ApiClient`](api::ApiClient) speaks to the
//!   configuration and AI-explanation endpoints
//!
//! Key design principles:
//!
//! - One event-loop task per stream; all state mutation is serialized
//!   through it, frames processed strictly in arrival order
//! - Hard memory ceilings everywhere: 500 packets, 10 alerts, 60 rate
//!   samples
//! - Transient failures are never fatal: the supervisor reconnects
//!   forever with close-reason-specific delays
//! - Malformed frames cost one log line and nothing else
//!
//! # Quick Start
//!
//! ```no_run
//! use packetwatch::{PacketStream, Result, StreamOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let stream = PacketStream::spawn(StreamOptions::new(
//!         "ws://127.0.0.1:8000/ws/packets",
//!     ))?;
//!     stream.connect()?;
//!
//!     // ... later, from the rendering layer ...
//!     let packets = stream.monitor().packets();
//!     let rate = stream.monitor().current_rate();
//!     println!("{} packets buffered, {} pkt/s", packets.len(), rate);
//!
//!     stream.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | REST collaborator clients |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`monitor`] | Bounded live state: buffer, alerts, rate |
//! | [`protocol`] | Wire message types and frame classification |
//! | [`stream`] | Connection supervision and transport |

// ============================================================================
// Modules
// ============================================================================

/// REST collaborator clients.
///
/// Configuration, AI explanation, and status endpoints.
pub mod api;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Live monitor state.
///
/// The bounded packet buffer, alert log and correlation filter,
/// throughput estimation, and cumulative stream statistics.
pub mod monitor;

/// Wire protocol message types.
///
/// Frame shapes and the single classification point for inbound data.
pub mod protocol;

/// Streaming transport layer.
///
/// Connection supervision, reconnect policy, and the transport seam.
pub mod stream;

// ============================================================================
// Re-exports
// ============================================================================

// Protocol types
pub use protocol::{Alert, AlertLevel, AlertMeta, CaptureUpdate, Frame, Packet};

// Monitor types
pub use monitor::{AlertFilter, Monitor, StreamStats, TrafficSample};

// Stream types
pub use stream::{ConnectionState, PacketStream, StreamOptions};

// REST types
pub use api::ApiClient;

// Error types
pub use error::{Error, Result};
