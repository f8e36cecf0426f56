//! Streaming transport layer.
//!
//! This module owns the live connection to the packet stream endpoint:
//! establishment, supervision, reconnection, and teardown.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                        ┌──────────────────┐
//! │  PacketStream    │                        │  Backend         │
//! │  (handle)        │       WebSocket        │  /ws/packets     │
//! │                  │◄──────────────────────►│                  │
//! │  supervisor task │   ping ──► ◄── pong    │  capture +       │
//! │  → Monitor       │   ◄── packets/alerts   │  anomaly alerts  │
//! └──────────────────┘                        └──────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `PacketStream::spawn` - start the supervisor task (`Disconnected`)
//! 2. `PacketStream::connect` - open the link (`Connecting` → `Connected`)
//! 3. Frames flow into the [`crate::monitor::Monitor`]
//! 4. On close/error - reconnect automatically after the policy delay
//! 5. `PacketStream::shutdown` - close the link, cancel timers, join
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `link` | Transport traits and tokio-tungstenite implementation |
//! | `options` | Stream configuration builder |
//! | `state` | Connection state machine and reconnect policy |
//! | `supervisor` | The supervisor task and `PacketStream` handle |

// ============================================================================
// Submodules
// ============================================================================

/// Transport abstraction and WebSocket implementation.
pub mod link;

/// Stream configuration options.
pub mod options;

/// Connection state machine and reconnection policy.
pub mod state;

/// Connection supervisor and stream event loop.
pub mod supervisor;

// ============================================================================
// Re-exports
// ============================================================================

pub use link::{Connector, LinkEvent, StreamLink, WsConnector};
pub use options::StreamOptions;
pub use state::{
    ConnectionState, RECONNECT_AFTER_ABNORMAL, RECONNECT_AFTER_ERROR, RECONNECT_AFTER_NORMAL,
    RECONNECT_FALLBACK, reconnect_delay,
};
pub use supervisor::PacketStream;
