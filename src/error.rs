//! Error types for the packet stream client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use packetwatch::{PacketStream, Result};
//!
//! async fn example(stream: &PacketStream) -> Result<()> {
//!     stream.connect()?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants | Recovery |
//! |----------|----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidArgument`] | caller fixes input |
//! | Transport | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`], [`Error::WebSocket`] | reconnection policy, automatic |
//! | Protocol | [`Error::Protocol`], [`Error::Json`] | offending frame discarded |
//! | Service | [`Error::InvalidCaptureSettings`], [`Error::CaptureDenied`], [`Error::Server`], [`Error::ServiceTimeout`], [`Error::Http`] | surfaced to caller, never retried |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
/// Transport errors are always recoverable: the connection supervisor
/// retries them without caller involvement. Service errors come from the
/// REST collaborators and are surfaced as-is, categorized by HTTP status.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when stream or client configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid argument passed to an operation.
    ///
    /// Returned when a caller-supplied value cannot be used, e.g. an
    /// alert without a correlation window.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// Streaming connection failed.
    ///
    /// Returned when the WebSocket connection cannot be established.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection attempt timed out.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Streaming connection closed.
    ///
    /// Returned when an operation is attempted against a closed link.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Frame violates the wire protocol.
    ///
    /// Returned when a frame carries a recognized discriminator but is
    /// missing required fields for its declared type.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // Service Errors (REST collaborators)
    // ========================================================================
    /// Capture settings rejected (HTTP 400).
    ///
    /// The interface does not exist or the BPF filter does not compile.
    #[error("Invalid capture settings: {detail}")]
    InvalidCaptureSettings {
        /// Server-provided rejection detail.
        detail: String,
    },

    /// Capture privilege denied (HTTP 403).
    ///
    /// The backend process lacks packet capture privileges.
    #[error("Capture privilege denied: {detail}")]
    CaptureDenied {
        /// Server-provided detail, typically setup instructions.
        detail: String,
    },

    /// Server-side failure (HTTP 5xx or other unexpected status).
    #[error("Server error ({status}): {detail}")]
    Server {
        /// HTTP status code returned.
        status: u16,
        /// Server-provided detail.
        detail: String,
    },

    /// REST request timed out.
    #[error("Service request timed out after {timeout_ms}ms")]
    ServiceTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates an invalid capture settings error.
    #[inline]
    pub fn invalid_capture_settings(detail: impl Into<String>) -> Self {
        Self::InvalidCaptureSettings {
            detail: detail.into(),
        }
    }

    /// Creates a capture privilege error.
    #[inline]
    pub fn capture_denied(detail: impl Into<String>) -> Self {
        Self::CaptureDenied {
            detail: detail.into(),
        }
    }

    /// Creates a server error.
    #[inline]
    pub fn server(status: u16, detail: impl Into<String>) -> Self {
        Self::Server {
            status,
            detail: detail.into(),
        }
    }

    /// Creates a service timeout error.
    #[inline]
    pub fn service_timeout(timeout_ms: u64) -> Self {
        Self::ServiceTimeout { timeout_ms }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a transport-level error.
    ///
    /// Transport errors are handled by the reconnection policy and are
    /// never fatal to the stream.
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this is a protocol-level error.
    ///
    /// Protocol errors are recovered locally by discarding the single
    /// offending frame.
    #[inline]
    #[must_use]
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol { .. } | Self::Json(_))
    }

    /// Returns `true` if this error came from a REST collaborator.
    #[inline]
    #[must_use]
    pub fn is_service(&self) -> bool {
        matches!(
            self,
            Self::InvalidCaptureSettings { .. }
                | Self::CaptureDenied { .. }
                | Self::Server { .. }
                | Self::ServiceTimeout { .. }
                | Self::Http(_)
        )
    }

    /// Returns `true` if this error is recoverable without caller action.
    ///
    /// The connection supervisor retries all transport failures; protocol
    /// failures cost exactly one dropped frame.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.is_transport() || self.is_protocol()
    }
}

// ============================================================================
// Tests
// ============================================================================
