//! REST client for the backend collaborator endpoints.
//!
//! The stream carries the live data; everything request/response shaped
//! goes through this client: interface listing, capture settings, AI
//! explanations, and the health snapshot.
//!
//! Failures are categorized, never retried here: HTTP 400 means the
//! settings were rejected, 403 means the backend lacks capture
//! privilege, 5xx is a server fault, and timeouts/transport failures
//! surface as their own variants so callers can present each case
//! distinctly.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

use super::models::{CaptureAck, CaptureSettings, Explanation, NetworkInterface, SystemStatus};

// ============================================================================
// Constants
// ============================================================================

/// Timeout for configuration and status requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for AI explanation requests (model calls are slow).
const EXPLAIN_TIMEOUT: Duration = Duration::from_secs(20);

// ============================================================================
// ApiClient
// ============================================================================

/// Client for the backend's REST endpoints.
///
/// # Example
///
/// ```ignore
/// use packetwatch::api::{ApiClient, CaptureSettings};
///
/// let client = ApiClient::new("http://127.0.0.1:8000")?;
/// let interfaces = client.interfaces().await?;
/// client
///     .apply_capture_settings(&CaptureSettings::for_interface("eth0").with_filter("tcp"))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Base URL of the backend.
    base: Url,
    /// Shared HTTP client.
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for a backend base URL.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the URL does not parse or is not HTTP
    /// - [`Error::Http`] if the HTTP client cannot be built
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::config(format!("invalid API base url: {e}")))?;

        match base.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::config(format!(
                    "API base scheme must be http or https, got {other}"
                )));
            }
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { base, http })
    }

    /// Lists the capturable network interfaces.
    ///
    /// # Errors
    ///
    /// Returns a categorized service error (see module docs).
    pub async fn interfaces(&self) -> Result<Vec<NetworkInterface>> {
        let url = self.endpoint("interfaces")?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(e, REQUEST_TIMEOUT))?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Applies new capture settings (interface and optional BPF filter).
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCaptureSettings`] - rejected interface/filter (400)
    /// - [`Error::CaptureDenied`] - insufficient capture privilege (403)
    /// - [`Error::Server`] - backend fault (5xx)
    /// - [`Error::ServiceTimeout`] / [`Error::Http`] - transport failures
    pub async fn apply_capture_settings(&self, settings: &CaptureSettings) -> Result<CaptureAck> {
        let url = self.endpoint("capture/settings")?;
        debug!(iface = %settings.iface, bpf = ?settings.bpf, "Applying capture settings");

        let response = self
            .http
            .post(url)
            .json(settings)
            .send()
            .await
            .map_err(|e| transport_error(e, REQUEST_TIMEOUT))?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Requests an AI explanation for a packet summary.
    ///
    /// The summary is forwarded verbatim and the result passed through
    /// unmodified.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if the summary is empty
    /// - a categorized service error otherwise (see module docs)
    pub async fn explain(&self, summary: &str) -> Result<Explanation> {
        self.explain_with_context(summary, None).await
    }

    /// Requests an AI explanation with additional analysis context.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::explain`].
    pub async fn explain_with_context(
        &self,
        summary: &str,
        context: Option<&str>,
    ) -> Result<Explanation> {
        if summary.trim().is_empty() {
            return Err(Error::invalid_argument("packet summary is empty"));
        }

        let url = self.endpoint("ai/explain")?;
        let body = match context {
            Some(context) => json!({ "summary": summary, "context": context }),
            None => json!({ "summary": summary }),
        };

        let response = self
            .http
            .post(url)
            .timeout(EXPLAIN_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, EXPLAIN_TIMEOUT))?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Fetches the backend health snapshot.
    ///
    /// # Errors
    ///
    /// Returns a categorized service error (see module docs).
    pub async fn status(&self) -> Result<SystemStatus> {
        let url = self.endpoint("status")?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(e, REQUEST_TIMEOUT))?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Resolves a path against the base URL.
    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| Error::config(format!("invalid endpoint path {path}: {e}")))
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Maps a reqwest transport failure into the crate taxonomy.
fn transport_error(error: reqwest::Error, timeout: Duration) -> Error {
    if error.is_timeout() {
        Error::service_timeout(timeout.as_millis() as u64)
    } else {
        Error::from(error)
    }
}

/// Rejects non-success responses with a categorized error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(categorize(status, &extract_detail(&body, status)))
}

/// Maps an HTTP failure status into the crate taxonomy.
fn categorize(status: StatusCode, detail: &str) -> Error {
    match status.as_u16() {
        400 => Error::invalid_capture_settings(detail),
        403 => Error::capture_denied(detail),
        code => Error::server(code, detail),
    }
}

/// Pulls the backend's `detail` field out of an error body.
///
/// The backend wraps errors as `{"detail": ...}` where `detail` is
/// either a plain string or a structured object; anything else falls
/// back to the raw body or the status line.
fn extract_detail(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body)
        && let Some(detail) = value.get("detail")
    {
        return match detail.as_str() {
            Some(text) => text.to_owned(),
            None => detail.to_string(),
        };
    }

    if body.trim().is_empty() {
        status.to_string()
    } else {
        body.trim().to_owned()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_url() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            ApiClient::new("ws://127.0.0.1:8000"),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_endpoint_join() {
        let client = ApiClient::new("http://127.0.0.1:8000").expect("client");
        let url = client.endpoint("capture/settings").expect("join");
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/capture/settings");
    }

    #[test]
    fn test_categorize_statuses() {
        assert!(matches!(
            categorize(StatusCode::BAD_REQUEST, "bad filter"),
            Error::InvalidCaptureSettings { .. }
        ));
        assert!(matches!(
            categorize(StatusCode::FORBIDDEN, "no privilege"),
            Error::CaptureDenied { .. }
        ));
        assert!(matches!(
            categorize(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            Error::Server { status: 500, .. }
        ));
        assert!(matches!(
            categorize(StatusCode::NOT_FOUND, "missing"),
            Error::Server { status: 404, .. }
        ));
    }

    #[test]
    fn test_extract_detail_string() {
        let detail = extract_detail(
            r#"{"detail": "Interface 'eth9' not found"}"#,
            StatusCode::BAD_REQUEST,
        );
        assert_eq!(detail, "Interface 'eth9' not found");
    }

    #[test]
    fn test_extract_detail_structured() {
        // Privilege errors carry a structured detail object.
        let detail = extract_detail(
            r#"{"detail": {"error": "Insufficient privileges", "platform": "linux"}}"#,
            StatusCode::FORBIDDEN,
        );
        assert!(detail.contains("Insufficient privileges"));
    }

    #[test]
    fn test_extract_detail_fallbacks() {
        assert_eq!(
            extract_detail("plain text error", StatusCode::INTERNAL_SERVER_ERROR),
            "plain text error"
        );
        assert_eq!(
            extract_detail("", StatusCode::INTERNAL_SERVER_ERROR),
            "500 Internal Server Error"
        );
    }

    #[tokio::test]
    async fn test_empty_summary_rejected_locally() {
        let client = ApiClient::new("http://127.0.0.1:8000").expect("client");
        let err = client.explain("   ").await.expect_err("must fail");
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }
}
