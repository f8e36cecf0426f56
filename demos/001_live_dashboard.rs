//! Live packet stream dashboard loop.
//!
//! Demonstrates:
//! - Spawning a supervised stream and connecting
//! - Observing connection state transitions
//! - Reading packet/rate/alert snapshots once per second
//! - Pivoting from the newest alert to its packet window
//!
//! Usage:
//!   cargo run --example 001_live_dashboard
//!   WS_URL=ws://host:8000/ws/packets cargo run --example 001_live_dashboard

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use packetwatch::{PacketStream, Result, StreamOptions};

// ============================================================================
// Constants
// ============================================================================

const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:8000/ws/packets";
const RUN_SECONDS: u64 = 30;

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
    let endpoint = std::env::var("WS_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_owned());

    println!("=== 001: Live Dashboard ===\n");
    println!("[Setup] Endpoint: {endpoint}");

    let stream = PacketStream::spawn(StreamOptions::new(&endpoint))?;
    stream.connect()?;

    // ========================================================================
    // State Observer
    // ========================================================================

    let mut states = stream.state_changes();
    let state_task = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = *states.borrow();
            println!("[State] {state}");
        }
    });

    // ========================================================================
    // Snapshot Loop
    // ========================================================================

    for _ in 0..RUN_SECONDS {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let monitor = stream.monitor();
        println!(
            "[Stream] {:>4} pkt/s | {:>3} buffered | {} alerts",
            monitor.current_rate(),
            monitor.packet_count(),
            monitor.alerts().len(),
        );

        // Pivot to the newest correlatable alert, if any.
        if let Some(alert) = monitor.alerts().into_iter().find(|a| a.is_correlatable()) {
            monitor.select_alert(&alert)?;
            println!(
                "[Alert] {} ({}) -> {} packets in window",
                alert.message,
                alert.level,
                monitor.visible_packets().len(),
            );
            monitor.clear_filter();
        }
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    println!("\n[Teardown] Shutting down...");
    stream.shutdown().await;
    state_task.abort();

    let stats = stream.monitor().stats();
    println!(
        "           {} packets / {} bytes total",
        stats.total_packets, stats.total_bytes
    );
    println!("           Done");

    Ok(())
}
