//! REST collaborator clients.
//!
//! The streaming connection only pushes data; configuration and
//! analysis are request/response and live here.
//!
//! | Endpoint | Method | Purpose |
//! |----------|--------|---------|
//! | `/interfaces` | GET | List capturable interfaces |
//! | `/capture/settings` | POST | Apply interface + BPF filter |
//! | `/ai/explain` | POST | AI explanation of a packet summary |
//! | `/status` | GET | Backend health snapshot |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `client` | The reqwest-based [`ApiClient`] |
//! | `models` | Request/response shapes |

// ============================================================================
// Submodules
// ============================================================================

/// REST client for the backend collaborator endpoints.
pub mod client;

/// REST request and response models.
pub mod models;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::ApiClient;
pub use models::{CaptureAck, CaptureSettings, Explanation, NetworkInterface, SystemStatus};
