//! Stream session manager.
//!
//! [`StreamSession`] owns exactly one WebSocket connection to the telemetry
//! endpoint. The connection runs in a tokio task that forwards
//! [`SessionEvent`]s through a bounded `mpsc` channel, so the view consumes
//! state changes and frames one at a time, in arrival order, without shared
//! mutable state.
//!
//! The session is a scoped resource: [`StreamSession::close`] (or dropping
//! the session) aborts the task and drops the receiver, after which no
//! further event is delivered.

use std::time::Duration;

use futures_util::StreamExt;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use console_core::{ConnectionState, ReconnectPolicy};

/// Default number of events buffered between the reader task and the view.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

// ── Public types ──────────────────────────────────────────────────────────────

/// One item on the session's event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The connection moved to a new lifecycle state.
    State(ConnectionState),
    /// A text frame arrived. The payload is passed through undecoded.
    Frame(String),
}

/// Connection could not be established or was interrupted.
///
/// Never returned to callers; it is logged and surfaces only as
/// [`ConnectionState::Disconnected`].
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("handshake with {endpoint} failed: {source}")]
    Handshake {
        endpoint: String,
        #[source]
        source: tungstenite::Error,
    },

    #[error("stream from {endpoint} interrupted: {source}")]
    Interrupted {
        endpoint: String,
        #[source]
        source: tungstenite::Error,
    },
}

/// Tunables for a [`StreamSession`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub reconnect: ReconnectPolicy,
    pub channel_capacity: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            reconnect: ReconnectPolicy::Never,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

// ── StreamSession ─────────────────────────────────────────────────────────────

/// One live connection to the telemetry endpoint, scoped to one view.
pub struct StreamSession {
    options: SessionOptions,
    state: ConnectionState,
    /// Set by the first `open`; a session instance is never opened twice.
    endpoint: Option<Url>,
    events: Option<mpsc::Receiver<SessionEvent>>,
    task: Option<JoinHandle<()>>,
}

impl StreamSession {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            state: ConnectionState::Disconnected,
            endpoint: None,
            events: None,
            task: None,
        }
    }

    /// Start connecting to `endpoint`.
    ///
    /// Returns `false` without side effects when this session has already
    /// been opened. Must be called from within a tokio runtime.
    pub fn open(&mut self, endpoint: Url) -> bool {
        if let Some(current) = &self.endpoint {
            tracing::debug!(endpoint = %current, state = %self.state, "open ignored; session already opened");
            return false;
        }

        let (tx, rx) = mpsc::channel(self.options.channel_capacity.max(1));
        let policy = self.options.reconnect;
        let target = endpoint.clone();

        self.state = ConnectionState::Connecting;
        tracing::info!(endpoint = %endpoint, "telemetry session connecting");

        self.task = Some(tokio::spawn(async move {
            run_stream(target, policy, tx).await;
        }));
        self.events = Some(rx);
        self.endpoint = Some(endpoint);
        true
    }

    /// Current lifecycle state as seen by the consumer.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    /// `true` once the session has been closed or was never opened.
    pub fn is_released(&self) -> bool {
        self.events.is_none()
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the session is closed or the connection task has
    /// finished and every buffered event has been delivered.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        let received = self.events.as_mut()?.recv().await;
        match received {
            Some(event) => {
                self.observe(&event);
                Some(event)
            }
            None => {
                self.finish();
                None
            }
        }
    }

    /// Take the next already-buffered event without waiting.
    pub fn try_next_event(&mut self) -> Option<SessionEvent> {
        let received = self.events.as_mut()?.try_recv();
        match received {
            Ok(event) => {
                self.observe(&event);
                Some(event)
            }
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.finish();
                None
            }
        }
    }

    /// Release the connection.
    ///
    /// Idempotent: returns `true` only for the call that actually released
    /// the connection task and event stream.
    pub fn close(&mut self) -> bool {
        let released = self.task.is_some() || self.events.is_some();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.events = None;

        if released {
            tracing::info!(
                endpoint = ?self.endpoint.as_ref().map(Url::as_str),
                previous = %self.state,
                "telemetry session closed"
            );
        }
        self.state = ConnectionState::Disconnected;
        released
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn observe(&mut self, event: &SessionEvent) {
        let SessionEvent::State(next) = event else {
            return;
        };
        if self.state.can_transition_to(*next) {
            tracing::info!(from = %self.state, to = %next, "telemetry session state changed");
            self.state = *next;
        } else {
            tracing::debug!(from = %self.state, to = %next, "ignoring redundant state event");
        }
    }

    /// The connection task ended on its own; keep the handle for `close`.
    fn finish(&mut self) {
        self.events = None;
        self.state = ConnectionState::Disconnected;
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.close();
    }
}

// ── Connection task ───────────────────────────────────────────────────────────

type TelemetrySocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connect, forward frames, and apply the reconnect policy until the policy
/// gives up or the receiver goes away.
async fn run_stream(endpoint: Url, policy: ReconnectPolicy, tx: mpsc::Sender<SessionEvent>) {
    let mut attempt: u32 = 0;

    loop {
        match connect_async(endpoint.as_str()).await {
            Ok((socket, _response)) => {
                attempt = 0;
                if tx
                    .send(SessionEvent::State(ConnectionState::Connected))
                    .await
                    .is_err()
                {
                    return;
                }
                match forward_frames(&endpoint, socket, &tx).await {
                    Ok(()) => tracing::info!(endpoint = %endpoint, "telemetry stream closed by remote"),
                    Err(e) => tracing::warn!(error = %e, "telemetry stream interrupted"),
                }
            }
            Err(source) => {
                let e = TransportError::Handshake {
                    endpoint: endpoint.to_string(),
                    source,
                };
                tracing::warn!(error = %e, "telemetry connection failed");
            }
        }

        if tx
            .send(SessionEvent::State(ConnectionState::Disconnected))
            .await
            .is_err()
        {
            return;
        }

        let Some(delay) = policy.delay_for(attempt) else {
            tracing::debug!(endpoint = %endpoint, "reconnect policy exhausted; session stays disconnected");
            return;
        };
        attempt = attempt.saturating_add(1);
        tracing::info!(
            endpoint = %endpoint,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "scheduling reconnect"
        );
        if !sleep_unless_closed(delay, &tx).await {
            return;
        }

        if tx
            .send(SessionEvent::State(ConnectionState::Connecting))
            .await
            .is_err()
        {
            return;
        }
    }
}

/// Forward every data frame until the remote closes or the transport fails.
async fn forward_frames(
    endpoint: &Url,
    mut socket: TelemetrySocket,
    tx: &mpsc::Sender<SessionEvent>,
) -> Result<(), TransportError> {
    while let Some(message) = socket.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    tracing::warn!(endpoint = %endpoint, "discarding binary frame that is not UTF-8");
                    continue;
                }
            },
            Ok(Message::Close(_)) => return Ok(()),
            Ok(_) => continue,
            Err(source) => {
                return Err(TransportError::Interrupted {
                    endpoint: endpoint.to_string(),
                    source,
                })
            }
        };

        if tx.send(SessionEvent::Frame(text)).await.is_err() {
            return Ok(());
        }
    }
    Ok(())
}

/// Sleep for `delay`, returning early with `false` if the consumer is gone.
async fn sleep_unless_closed(delay: Duration, tx: &mpsc::Sender<SessionEvent>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = tx.closed() => false,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
