//! AI packet explanation via the REST collaborator.
//!
//! Demonstrates:
//! - Checking backend health and listing interfaces
//! - Forwarding a packet summary to the AI explanation endpoint
//! - Distinguishing the categorized service errors
//!
//! Usage:
//!   cargo run --example 002_explain_packet
//!   cargo run --example 002_explain_packet -- "UDP 10.0.0.1:53 > 10.0.0.2:51000"
//!   API_URL=http://host:8000 cargo run --example 002_explain_packet

// ============================================================================
// Imports
// ============================================================================

use packetwatch::api::ApiClient;
use packetwatch::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

const DEFAULT_BASE: &str = "http://127.0.0.1:8000";
const DEFAULT_SUMMARY: &str = "TCP 192.168.1.10:54321 > 93.184.216.34:443";

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let base = std::env::var("API_URL").unwrap_or_else(|_| DEFAULT_BASE.to_owned());
    let summary = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SUMMARY.to_owned());

    println!("=== 002: Explain Packet ===\n");

    let client = ApiClient::new(&base)?;

    // ========================================================================
    // Backend Health
    // ========================================================================

    let status = client.status().await?;
    println!(
        "[Status] {} | capture: {} | interface: {}",
        status.status,
        if status.capture_active { "active" } else { "inactive" },
        status.current_interface.as_deref().unwrap_or("-"),
    );

    let interfaces = client.interfaces().await?;
    println!("[Interfaces] {} available", interfaces.len());
    for iface in &interfaces {
        println!("             {}", iface.name);
    }

    // ========================================================================
    // Explanation
    // ========================================================================

    println!("\n[Explain] {summary}");
    match client.explain(&summary).await {
        Ok(explanation) => {
            let source = if explanation.is_mock { "mock" } else { "model" };
            println!("          ({source}) {}", explanation.explanation);
        }
        Err(Error::ServiceTimeout { timeout_ms }) => {
            println!("          Analysis timed out after {timeout_ms}ms");
        }
        Err(Error::Server { status, detail }) => {
            println!("          Backend failure {status}: {detail}");
        }
        Err(e) => return Err(e),
    }

    Ok(())
}
