//! Chat client — owns the connection, the listeners, and the retry loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::counter;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use hariku_core::{ChatConfig, ChatMessage, HarikuError, ListenerKey, OutboundMessage, UserId};

use crate::reconnect::{RetryWait, wait_for_retry};
use crate::registry::ListenerRegistry;
use crate::socket::{SocketClosed, WsStream, connect_ws, run_socket};

/// Owns one chat connection for a signed-in user.
///
/// `connect` opens the socket and keeps it open: after an unintended close
/// the connection task waits out the configured delay and redials with the
/// same token, indefinitely. `disconnect` hangs up, suppresses any pending
/// redial, and drops every listener.
///
/// All methods are non-blocking; socket work happens on a spawned task.
pub struct ChatClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ChatConfig,
    registry: ListenerRegistry,
    session: Mutex<Option<Session>>,
}

/// One connection generation, created per `connect` call.
///
/// The connected flag lives here, not on the client, so a cancelled old
/// generation can never clobber the state of the one that replaced it.
/// Dropping a session cancels its connection task, so a generation that
/// leaves the slot can never keep redialing.
struct Session {
    outbound_tx: mpsc::Sender<OutboundMessage>,
    cancel: CancellationToken,
    connected: Arc<AtomicBool>,
    _task: JoinHandle<()>,
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl ChatClient {
    /// Create a client. No connection is made until [`connect`].
    ///
    /// [`connect`]: ChatClient::connect
    #[must_use]
    pub fn new(config: ChatConfig) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                config,
                registry: ListenerRegistry::new(),
                session: Mutex::new(None),
            }),
        }
    }

    /// Open the chat connection for `token`.
    ///
    /// Any previous connection is hung up first; a client never holds more
    /// than one socket. Must be called from within a tokio runtime.
    pub fn connect(&self, token: impl Into<String>) {
        let (outbound_tx, outbound_rx) = mpsc::channel(self.inner.config.outbound_capacity);
        let cancel = CancellationToken::new();
        let connected = Arc::new(AtomicBool::new(false));

        // The slot stays locked across the whole swap so racing connect
        // calls serialize; the displaced generation is cancelled by
        // Session::drop, never silently overwritten.
        let mut session = self.inner.session.lock();
        drop(session.take());
        let task = tokio::spawn(run_connection(
            Arc::clone(&self.inner),
            token.into(),
            Arc::clone(&connected),
            outbound_rx,
            cancel.clone(),
        ));
        *session = Some(Session {
            outbound_tx,
            cancel,
            connected,
            _task: task,
        });
    }

    /// Close the connection and drop every listener.
    ///
    /// A connection that is waiting out the retry delay stays down instead
    /// of redialing after the fact.
    pub fn disconnect(&self) {
        self.hang_up();
        self.inner.registry.clear();
        info!("chat disconnected");
    }

    /// Queue a message toward `recipient_id`.
    ///
    /// Dropped with a log line when no connection is open. Sending never
    /// fails loudly and never buffers across a connection gap.
    pub fn send_message(&self, content: impl Into<String>, recipient_id: UserId) {
        let session = self.inner.session.lock();
        let Some(session) = session
            .as_ref()
            .filter(|session| session.connected.load(Ordering::SeqCst))
        else {
            counter!("chat_messages_dropped_total").increment(1);
            warn!(%recipient_id, "send_message while disconnected; message dropped");
            return;
        };

        let outbound = OutboundMessage::new(content, recipient_id);
        if let Err(e) = session.outbound_tx.try_send(outbound) {
            counter!("chat_messages_dropped_total").increment(1);
            warn!(%recipient_id, error = %e, "failed to queue chat message");
        }
    }

    /// Register `listener` for a conversation key, replacing any existing
    /// one for the same key.
    pub fn add_listener<F>(&self, key: impl Into<ListenerKey>, listener: F)
    where
        F: Fn(&ChatMessage) + Send + Sync + 'static,
    {
        self.inner.registry.add(key.into(), Arc::new(listener));
    }

    /// Remove the listener for a conversation key, if any.
    pub fn remove_listener(&self, key: impl Into<ListenerKey>) {
        let _ = self.inner.registry.remove(key.into());
    }

    /// Whether a socket is currently open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner
            .session
            .lock()
            .as_ref()
            .is_some_and(|session| session.connected.load(Ordering::SeqCst))
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.registry.len()
    }

    fn hang_up(&self) {
        // Session::drop cancels the connection task
        drop(self.inner.session.lock().take());
    }
}

impl Drop for ChatClient {
    fn drop(&mut self) {
        // A dropped client must not keep redialing in the background
        self.hang_up();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Connection task
// ─────────────────────────────────────────────────────────────────────────────

/// Dial, pump, wait, redial — until cancelled.
async fn run_connection(
    inner: Arc<ClientInner>,
    token: String,
    connected: Arc<AtomicBool>,
    mut outbound_rx: mpsc::Receiver<OutboundMessage>,
    cancel: CancellationToken,
) {
    let conn_id = Uuid::now_v7();
    let delay = Duration::from_millis(inner.config.reconnect_delay_ms);
    let mut attempt: u64 = 0;

    loop {
        attempt += 1;
        let dialed = tokio::select! {
            dialed = dial(&inner, &token) => dialed,
            () = cancel.cancelled() => {
                debug!(%conn_id, "chat connection hung up mid-dial");
                return;
            }
        };
        match dialed {
            Ok(ws) => {
                drain_stale(&mut outbound_rx);
                connected.store(true, Ordering::SeqCst);
                info!(%conn_id, attempt, "chat connected");

                let closed = run_socket(ws, &mut outbound_rx, &inner.registry, &cancel).await;
                connected.store(false, Ordering::SeqCst);

                match closed {
                    SocketClosed::Cancelled => {
                        debug!(%conn_id, "chat connection hung up");
                        return;
                    }
                    SocketClosed::Remote => warn!(%conn_id, "chat connection lost"),
                }
            }
            Err(e) => warn!(%conn_id, attempt, error = %e, "chat connect failed"),
        }

        // Same fixed delay whether the dial failed or an open socket dropped
        if wait_for_retry(delay, &cancel).await == RetryWait::Cancelled {
            debug!(%conn_id, "pending reconnect cancelled");
            return;
        }
        counter!("chat_reconnects_total").increment(1);
        debug!(%conn_id, attempt, "redialing with the same token");
    }
}

async fn dial(inner: &ClientInner, token: &str) -> Result<WsStream, HarikuError> {
    let url = inner.config.ws_url(token)?;
    Ok(connect_ws(&url).await?)
}

/// Drop anything queued while the link was down.
///
/// The send contract only covers an open connection; replaying a stale
/// backlog onto a fresh socket would deliver messages the caller already
/// saw dropped.
fn drain_stale(outbound_rx: &mut mpsc::Receiver<OutboundMessage>) {
    while let Ok(stale) = outbound_rx.try_recv() {
        counter!("chat_messages_dropped_total").increment(1);
        warn!(recipient = %stale.recipient_id, "dropping message queued while disconnected");
    }
}
