//! Stream configuration options.
//!
//! Provides a type-safe builder for configuring a [`crate::PacketStream`]:
//! endpoint URL and bounded-collection capacities.
//!
//! # Example
//!
//! ```ignore
//! use packetwatch::StreamOptions;
//!
//! let options = StreamOptions::new("ws://127.0.0.1:8000/ws/packets")
//!     .with_buffer_capacity(1000)
//!     .with_history_capacity(120);
//! ```

// ============================================================================
// Imports
// ============================================================================

use url::Url;

use crate::error::{Error, Result};
use crate::monitor::{MAX_PACKETS, MAX_SAMPLES};

// ============================================================================
// StreamOptions
// ============================================================================

/// Configuration for a packet stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOptions {
    /// Streaming endpoint URL (`ws://` or `wss://`).
    pub url: String,

    /// Packet history capacity.
    pub buffer_capacity: usize,

    /// Traffic-rate history capacity.
    pub history_capacity: usize,
}

// ============================================================================
// Constructors
// ============================================================================

impl StreamOptions {
    /// Creates options for an endpoint with default capacities.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            buffer_capacity: MAX_PACKETS,
            history_capacity: MAX_SAMPLES,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl StreamOptions {
    /// Sets the packet history capacity.
    #[inline]
    #[must_use]
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Sets the traffic-rate history capacity.
    #[inline]
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl StreamOptions {
    /// Parses and validates the endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL does not parse or is not a
    /// WebSocket scheme.
    pub fn endpoint(&self) -> Result<Url> {
        let url = Url::parse(&self.url)
            .map_err(|e| Error::config(format!("invalid endpoint url: {e}")))?;

        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(Error::config(format!(
                "endpoint scheme must be ws or wss, got {other}"
            ))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = StreamOptions::new("ws://127.0.0.1:8000/ws/packets");
        assert_eq!(options.buffer_capacity, MAX_PACKETS);
        assert_eq!(options.history_capacity, MAX_SAMPLES);
    }

    #[test]
    fn test_builder_methods() {
        let options = StreamOptions::new("ws://host/ws")
            .with_buffer_capacity(1000)
            .with_history_capacity(120);
        assert_eq!(options.buffer_capacity, 1000);
        assert_eq!(options.history_capacity, 120);
    }

    #[test]
    fn test_endpoint_valid() {
        let options = StreamOptions::new("wss://monitor.example:8000/ws/packets");
        let url = options.endpoint().expect("valid url");
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.path(), "/ws/packets");
    }

    #[test]
    fn test_endpoint_rejects_http_scheme() {
        let options = StreamOptions::new("http://host/ws");
        let err = options.endpoint().expect_err("must fail");
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_endpoint_rejects_garbage() {
        let options = StreamOptions::new("not a url");
        assert!(options.endpoint().is_err());
    }
}
