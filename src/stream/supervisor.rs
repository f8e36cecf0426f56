//! Connection supervisor and stream event loop.
//!
//! [`PacketStream`] owns one logical streaming connection for its whole
//! lifetime. A single spawned task supervises the link: it establishes
//! connections, pumps inbound frames into the [`Monitor`], and survives
//! transient failures by rescheduling itself - there is no maximum retry
//! count.
//!
//! # Event Loop
//!
//! The supervisor task handles:
//!
//! - Connection establishment (with the close-reason reconnect delays)
//! - The liveness probe/ack exchange (`"ping"`/`"pong"`)
//! - Frame ingestion into the monitor, strictly in arrival order
//! - Operator commands (connect, shutdown)
//!
//! Because the loop owns the only reconnect timer, a successful open can
//! never race a stale timer: the timer and the connection are phases of
//! one task, serialized by construction. Teardown breaks the loop,
//! closes the live link, and abandons any pending sleep.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::monitor::{IngestOutcome, Monitor};

use super::link::{Connector, LinkEvent, StreamLink, WsConnector};
use super::options::StreamOptions;
use super::state::{ConnectionState, RECONNECT_AFTER_ERROR, reconnect_delay};

// ============================================================================
// Constants
// ============================================================================

/// Liveness probe sent once immediately after open.
const HEARTBEAT_PROBE: &str = "ping";

/// Liveness acknowledgement; consumed here, never routed.
const HEARTBEAT_ACK: &str = "pong";

// ============================================================================
// StreamCommand
// ============================================================================

/// Operator commands for the supervisor task.
enum StreamCommand {
    /// Open a connection if none is open.
    Connect,
    /// Tear down: close the link, cancel timers, end the task.
    Shutdown,
}

// ============================================================================
// PacketStream
// ============================================================================

/// Handle to a supervised packet stream.
///
/// Spawning creates the supervisor task in the `Disconnected` state;
/// call [`PacketStream::connect`] to start it. All monitor state is
/// reachable through [`PacketStream::monitor`].
///
/// # Example
///
/// ```ignore
/// use packetwatch::{PacketStream, StreamOptions};
///
/// let stream = PacketStream::spawn(StreamOptions::new("ws://127.0.0.1:8000/ws/packets"))?;
/// stream.connect()?;
///
/// // ... read snapshots ...
/// let recent = stream.monitor().packets();
///
/// stream.shutdown().await;
/// ```
pub struct PacketStream {
    /// Channel for sending commands to the supervisor task.
    command_tx: mpsc::UnboundedSender<StreamCommand>,
    /// Observable connection state.
    state_rx: watch::Receiver<ConnectionState>,
    /// Shared monitor state.
    monitor: Monitor,
    /// Supervisor task handle, taken on shutdown.
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PacketStream {
    /// Spawns a supervisor over the production WebSocket transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the endpoint URL is invalid.
    pub fn spawn(options: StreamOptions) -> Result<Self> {
        Self::spawn_with_connector(options, Box::new(WsConnector))
    }

    /// Spawns a supervisor over an injected transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the endpoint URL is invalid.
    pub fn spawn_with_connector(
        options: StreamOptions,
        connector: Box<dyn Connector>,
    ) -> Result<Self> {
        let endpoint = options.endpoint()?;
        let monitor = Monitor::with_capacities(options.buffer_capacity, options.history_capacity);

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);

        let task = tokio::spawn(supervise(
            endpoint,
            connector,
            monitor.clone(),
            state_tx,
            command_rx,
        ));

        Ok(Self {
            command_tx,
            state_rx,
            monitor,
            task: Mutex::new(Some(task)),
        })
    }

    /// Requests a connection.
    ///
    /// No-op if a connection is already open; if a reconnect delay is
    /// pending, it is skipped and the attempt starts immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the stream has been shut
    /// down.
    pub fn connect(&self) -> Result<()> {
        self.command_tx
            .send(StreamCommand::Connect)
            .map_err(|_| Error::ConnectionClosed)
    }

    /// Returns the current connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Returns a receiver that observes every state transition.
    #[inline]
    #[must_use]
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Returns the shared monitor state.
    #[inline]
    #[must_use]
    pub const fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    /// Tears the stream down.
    ///
    /// Closes the active connection, cancels any pending reconnect
    /// timer, and waits for the supervisor task to finish. No background
    /// work outlives this call.
    pub async fn shutdown(&self) {
        let _ = self.command_tx.send(StreamCommand::Shutdown);
        let task = self.task.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}

impl Drop for PacketStream {
    fn drop(&mut self) {
        // Best effort: an explicit shutdown() has already closed the
        // channel; otherwise this stops the supervisor without waiting.
        let _ = self.command_tx.send(StreamCommand::Shutdown);
    }
}

// ============================================================================
// Supervisor Loop
// ============================================================================

/// How a connected session ended.
enum SessionEnd {
    /// Operator shutdown; the supervisor exits.
    Shutdown,
    /// The remote closed the link.
    Closed {
        /// Close code, `None` when the link dropped without a handshake.
        code: Option<u16>,
    },
    /// The link failed at the transport level.
    Failed,
}

/// The supervisor task: the only writer of connection state and the
/// only driver of the monitor.
async fn supervise(
    endpoint: Url,
    connector: Box<dyn Connector>,
    monitor: Monitor,
    state_tx: watch::Sender<ConnectionState>,
    mut command_rx: mpsc::UnboundedReceiver<StreamCommand>,
) {
    debug!(endpoint = %endpoint, "Stream supervisor started");

    // Reconnect timer, present between a failure and the next attempt.
    let mut pending: Option<Duration> = None;

    'supervise: loop {
        // Wait for a reason to connect: an operator command, or the
        // reconnect timer.
        if let Some(delay) = pending.take() {
            debug!(delay_ms = delay.as_millis() as u64, "Reconnection scheduled");
            tokio::select! {
                () = sleep(delay) => publish(&state_tx, ConnectionState::Reconnecting),
                command = command_rx.recv() => match command {
                    Some(StreamCommand::Connect) => {
                        debug!("Operator connect; skipping reconnect delay");
                    }
                    Some(StreamCommand::Shutdown) | None => break 'supervise,
                },
            }
        } else {
            match command_rx.recv().await {
                Some(StreamCommand::Connect) => {}
                Some(StreamCommand::Shutdown) | None => break 'supervise,
            }
        }

        publish(&state_tx, ConnectionState::Connecting);

        // Establish, still responsive to shutdown.
        let mut link = {
            let connect_fut = connector.connect(&endpoint);
            tokio::pin!(connect_fut);
            loop {
                tokio::select! {
                    result = &mut connect_fut => match result {
                        Ok(link) => break link,
                        Err(error) => {
                            warn!(error = %error, "Connection attempt failed");
                            publish(&state_tx, ConnectionState::Error);
                            pending = Some(RECONNECT_AFTER_ERROR);
                            continue 'supervise;
                        }
                    },
                    command = command_rx.recv() => match command {
                        Some(StreamCommand::Connect) => {
                            debug!("Connect ignored; attempt already in flight");
                        }
                        Some(StreamCommand::Shutdown) | None => break 'supervise,
                    },
                }
            }
        };

        publish(&state_tx, ConnectionState::Connected);
        info!(endpoint = %endpoint, "Stream connected");

        if let Err(error) = link.send_text(HEARTBEAT_PROBE).await {
            warn!(error = %error, "Failed to send liveness probe");
            link.close().await;
            publish(&state_tx, ConnectionState::Error);
            pending = Some(RECONNECT_AFTER_ERROR);
            continue;
        }

        let end = drive(link.as_mut(), &monitor, &mut command_rx, &state_tx).await;
        link.close().await;

        match end {
            SessionEnd::Shutdown => break,
            SessionEnd::Closed { code } => {
                debug!(?code, "Stream closed");
                publish(&state_tx, ConnectionState::Disconnected);
                pending = Some(reconnect_delay(code));
            }
            SessionEnd::Failed => {
                publish(&state_tx, ConnectionState::Error);
                pending = Some(RECONNECT_AFTER_ERROR);
            }
        }
    }

    publish(&state_tx, ConnectionState::Disconnected);
    debug!("Stream supervisor terminated");
}

/// Pumps one open link until it ends or the operator shuts down.
///
/// Frames are processed strictly in arrival order; the heartbeat ack is
/// consumed here and never reaches frame classification.
async fn drive(
    link: &mut dyn StreamLink,
    monitor: &Monitor,
    command_rx: &mut mpsc::UnboundedReceiver<StreamCommand>,
    state_tx: &watch::Sender<ConnectionState>,
) -> SessionEnd {
    loop {
        tokio::select! {
            event = link.next_event() => match event {
                LinkEvent::Text(text) => {
                    if text == HEARTBEAT_ACK {
                        trace!("Liveness ack consumed");
                        continue;
                    }
                    if let IngestOutcome::StreamError { .. } = monitor.ingest(&text) {
                        publish(state_tx, ConnectionState::Error);
                    }
                }

                LinkEvent::Closed { code } => return SessionEnd::Closed { code },

                LinkEvent::Failed(error) => {
                    warn!(error = %error, "Transport error on open link");
                    return SessionEnd::Failed;
                }
            },

            command = command_rx.recv() => match command {
                Some(StreamCommand::Connect) => {
                    debug!("Connect ignored; already connected");
                }
                Some(StreamCommand::Shutdown) | None => return SessionEnd::Shutdown,
            },
        }
    }
}

/// Publishes a state transition to all observers.
fn publish(state_tx: &watch::Sender<ConnectionState>, state: ConnectionState) {
    let previous = state_tx.send_replace(state);
    if previous != state {
        debug!(from = %previous, to = %state, "Connection state changed");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::time::Instant;

    // ------------------------------------------------------------------------
    // Scripted fake transport
    // ------------------------------------------------------------------------

    #[derive(Default)]
    struct FakeShared {
        /// Scripted sessions; each is the event sequence one link yields
        /// before pending forever.
        sessions: Mutex<VecDeque<VecDeque<LinkEvent>>>,
        /// When each connect attempt happened.
        connects: Mutex<Vec<Instant>>,
        /// Everything sent over any link.
        sent: Mutex<Vec<String>>,
    }

    #[derive(Clone, Default)]
    struct FakeConnector {
        shared: Arc<FakeShared>,
    }

    impl FakeConnector {
        fn new() -> Self {
            Self::default()
        }

        fn push_session(&self, events: Vec<LinkEvent>) {
            self.shared.sessions.lock().push_back(events.into());
        }

        fn connect_count(&self) -> usize {
            self.shared.connects.lock().len()
        }

        fn gap(&self, n: usize) -> Duration {
            let connects = self.shared.connects.lock();
            connects[n + 1] - connects[n]
        }

        fn sent_texts(&self) -> Vec<String> {
            self.shared.sent.lock().clone()
        }
    }

    #[async_trait]
    impl Connector for FakeConnector {
        async fn connect(&self, _url: &Url) -> Result<Box<dyn StreamLink>> {
            self.shared.connects.lock().push(Instant::now());
            let session = self.shared.sessions.lock().pop_front();
            match session {
                Some(events) => Ok(Box::new(FakeLink {
                    events,
                    shared: Arc::clone(&self.shared),
                })),
                None => Err(Error::connection("no session scripted")),
            }
        }
    }

    struct FakeLink {
        events: VecDeque<LinkEvent>,
        shared: Arc<FakeShared>,
    }

    #[async_trait]
    impl StreamLink for FakeLink {
        async fn send_text(&mut self, text: &str) -> Result<()> {
            self.shared.sent.lock().push(text.to_owned());
            Ok(())
        }

        async fn next_event(&mut self) -> LinkEvent {
            match self.events.pop_front() {
                Some(event) => event,
                // Script exhausted: the link stays open.
                None => futures_util::future::pending().await,
            }
        }

        async fn close(&mut self) {}
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn options() -> StreamOptions {
        StreamOptions::new("ws://127.0.0.1:8000/ws/packets")
    }

    /// Polls a condition, letting paused time auto-advance between
    /// checks. Panics if the condition never holds.
    async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
        for _ in 0..10_000 {
            if condition() {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("condition never held: {what}");
    }

    fn packet_json(ts: f64) -> String {
        format!(
            r#"{{"ts": {ts}, "src": "10.0.0.1", "dst": "10.0.0.2",
                 "proto": "UDP", "length": 64, "summary": "UDP datagram"}}"#
        )
    }

    async fn observed_reconnect_gap(close_code: u16) -> Duration {
        let connector = FakeConnector::new();
        connector.push_session(vec![LinkEvent::Closed {
            code: Some(close_code),
        }]);
        connector.push_session(vec![]);

        let stream = PacketStream::spawn_with_connector(options(), Box::new(connector.clone()))
            .expect("spawn");
        stream.connect().expect("connect");

        wait_until("second connect attempt", || connector.connect_count() == 2).await;
        let gap = connector.gap(0);
        stream.shutdown().await;
        gap
    }

    // ------------------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_initial_state_disconnected() {
        let stream = PacketStream::spawn_with_connector(options(), Box::new(FakeConnector::new()))
            .expect("spawn");
        assert_eq!(stream.state(), ConnectionState::Disconnected);
        stream.shutdown().await;
    }

    #[tokio::test]
    async fn test_spawn_rejects_bad_endpoint() {
        let result = PacketStream::spawn_with_connector(
            StreamOptions::new("not a url"),
            Box::new(FakeConnector::new()),
        );
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_sent_on_open() {
        let connector = FakeConnector::new();
        connector.push_session(vec![]);

        let stream = PacketStream::spawn_with_connector(options(), Box::new(connector.clone()))
            .expect("spawn");
        stream.connect().expect("connect");

        wait_until("connected", || stream.state().is_connected()).await;
        assert_eq!(connector.sent_texts(), vec![HEARTBEAT_PROBE.to_owned()]);

        stream.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_frames_reach_monitor_and_ack_consumed() {
        let connector = FakeConnector::new();
        connector.push_session(vec![
            LinkEvent::Text(HEARTBEAT_ACK.to_owned()),
            LinkEvent::Text(packet_json(1.0)),
            LinkEvent::Text(packet_json(2.0)),
        ]);

        let stream = PacketStream::spawn_with_connector(options(), Box::new(connector))
            .expect("spawn");
        stream.connect().expect("connect");

        wait_until("packets buffered", || stream.monitor().packet_count() == 2).await;
        // The ack is consumed silently: only packets made it into state.
        assert_eq!(stream.monitor().stats().total_packets, 2);

        stream.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_delay_abnormal_close() {
        assert_eq!(
            observed_reconnect_gap(1006).await,
            Duration::from_millis(1000)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_delay_normal_close() {
        assert_eq!(
            observed_reconnect_gap(1000).await,
            Duration::from_millis(5000)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_delay_other_close() {
        assert_eq!(
            observed_reconnect_gap(1011).await,
            Duration::from_millis(3000)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_link_drop_without_handshake_reconnects_fast() {
        let connector = FakeConnector::new();
        connector.push_session(vec![LinkEvent::Closed { code: None }]);
        connector.push_session(vec![]);

        let stream = PacketStream::spawn_with_connector(options(), Box::new(connector.clone()))
            .expect("spawn");
        stream.connect().expect("connect");

        wait_until("second connect attempt", || connector.connect_count() == 2).await;
        assert_eq!(connector.gap(0), Duration::from_millis(1000));

        stream.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_failure_enters_error_and_retries() {
        let connector = FakeConnector::new();
        // No sessions scripted yet: the first attempt fails outright.
        let stream = PacketStream::spawn_with_connector(options(), Box::new(connector.clone()))
            .expect("spawn");
        stream.connect().expect("connect");

        wait_until("error state", || stream.state() == ConnectionState::Error).await;

        connector.push_session(vec![]);
        wait_until("retry attempt", || connector.connect_count() == 2).await;
        assert_eq!(connector.gap(0), RECONNECT_AFTER_ERROR);
        wait_until("connected after retry", || stream.state().is_connected()).await;

        stream.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_on_open_link() {
        let connector = FakeConnector::new();
        connector.push_session(vec![LinkEvent::Failed(Error::connection("reset by peer"))]);
        connector.push_session(vec![]);

        let stream = PacketStream::spawn_with_connector(options(), Box::new(connector.clone()))
            .expect("spawn");
        stream.connect().expect("connect");

        wait_until("second connect attempt", || connector.connect_count() == 2).await;
        assert_eq!(connector.gap(0), RECONNECT_AFTER_ERROR);

        stream.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_is_noop_while_connected() {
        let connector = FakeConnector::new();
        connector.push_session(vec![]);

        let stream = PacketStream::spawn_with_connector(options(), Box::new(connector.clone()))
            .expect("spawn");
        stream.connect().expect("connect");
        wait_until("connected", || stream.state().is_connected()).await;

        stream.connect().expect("connect again");
        // Give the supervisor time to mishandle it, if it were going to.
        sleep(Duration::from_secs(2)).await;

        assert_eq!(connector.connect_count(), 1);
        assert!(stream.state().is_connected());

        stream.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_frame_transitions_state_only() {
        let connector = FakeConnector::new();
        connector.push_session(vec![
            LinkEvent::Text(r#"{"type": "error", "message": "capture died"}"#.to_owned()),
            LinkEvent::Text(packet_json(1.0)),
        ]);

        let stream = PacketStream::spawn_with_connector(options(), Box::new(connector.clone()))
            .expect("spawn");
        stream.connect().expect("connect");

        wait_until("error state", || stream.state() == ConnectionState::Error).await;
        // The link stays open: the following packet still arrives.
        wait_until("packet buffered", || stream.monitor().packet_count() == 1).await;
        assert_eq!(connector.connect_count(), 1);

        stream.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_pending_reconnect() {
        let connector = FakeConnector::new();
        connector.push_session(vec![LinkEvent::Closed { code: Some(1000) }]);

        let stream = PacketStream::spawn_with_connector(options(), Box::new(connector.clone()))
            .expect("spawn");
        stream.connect().expect("connect");

        wait_until("disconnected after close", || {
            stream.state() == ConnectionState::Disconnected && connector.connect_count() == 1
        })
        .await;

        // The 5000ms reconnect timer is pending; shutdown must win.
        stream.shutdown().await;
        assert_eq!(connector.connect_count(), 1);
        assert_eq!(stream.state(), ConnectionState::Disconnected);

        // Commands after teardown fail cleanly.
        assert!(stream.connect().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_connect_skips_pending_delay() {
        let connector = FakeConnector::new();
        connector.push_session(vec![LinkEvent::Closed { code: Some(1000) }]);
        connector.push_session(vec![]);

        let stream = PacketStream::spawn_with_connector(options(), Box::new(connector.clone()))
            .expect("spawn");
        stream.connect().expect("connect");

        wait_until("disconnected after close", || {
            stream.state() == ConnectionState::Disconnected && connector.connect_count() == 1
        })
        .await;

        // Manual connect preempts the 5000ms timer.
        stream.connect().expect("manual connect");
        wait_until("second attempt", || connector.connect_count() == 2).await;
        assert!(connector.gap(0) < Duration::from_millis(5000));

        stream.shutdown().await;
    }
}
