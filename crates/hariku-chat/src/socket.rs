//! WebSocket transport — dial one connection and pump it until it closes.

use futures::{SinkExt, StreamExt};
use metrics::counter;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use hariku_core::{ChatMessage, ConnectionError, ConnectionOperation, OutboundMessage};

use crate::registry::ListenerRegistry;

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Why the socket loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SocketClosed {
    /// The server closed the stream or the transport failed.
    Remote,
    /// We hung up on purpose.
    Cancelled,
}

/// Dial the chat endpoint.
///
/// The URL carries the bearer token in its query string, so it stays out of
/// the logs; only the handshake status is recorded.
pub(crate) async fn connect_ws(url: &str) -> Result<WsStream, ConnectionError> {
    let (ws, response) = connect_async(url).await.map_err(|e| {
        ConnectionError::new(ConnectionOperation::Handshake, "WebSocket connect failed")
            .with_source(e)
    })?;
    debug!(status = %response.status(), "websocket handshake complete");
    Ok(ws)
}

/// Pump one established connection until it closes.
///
/// Outbound messages are drained from `outbound_rx` and serialized onto the
/// sink; inbound text frames are parsed and fanned out through `registry`.
/// Cancellation (or the sender side of `outbound_rx` going away) sends a
/// close frame and returns [`SocketClosed::Cancelled`].
pub(crate) async fn run_socket(
    ws: WsStream,
    outbound_rx: &mut mpsc::Receiver<OutboundMessage>,
    registry: &ListenerRegistry,
    cancel: &CancellationToken,
) -> SocketClosed {
    let (mut ws_tx, mut ws_rx) = ws.split();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                let Some(outbound) = outbound else {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    return SocketClosed::Cancelled;
                };
                let payload = match serde_json::to_string(&outbound) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!(error = %e, "failed to serialize outbound message");
                        continue;
                    }
                };
                if let Err(e) = ws_tx.send(Message::Text(payload.into())).await {
                    warn!(error = %e, "websocket send failed");
                    return SocketClosed::Remote;
                }
                counter!("chat_messages_sent_total").increment(1);
            }
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => handle_frame(&text, registry),
                    Some(Ok(Message::Close(frame))) => {
                        debug!(?frame, "server closed the connection");
                        return SocketClosed::Remote;
                    }
                    // Ping/pong and binary frames carry no chat payload
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "websocket receive failed");
                        return SocketClosed::Remote;
                    }
                    None => {
                        debug!("websocket stream ended");
                        return SocketClosed::Remote;
                    }
                }
            }
            () = cancel.cancelled() => {
                let _ = ws_tx.send(Message::Close(None)).await;
                return SocketClosed::Cancelled;
            }
        }
    }
}

/// Parse an inbound frame and fan it out.
///
/// A frame that does not parse as a chat message is dropped; the connection
/// stays up.
fn handle_frame(text: &str, registry: &ListenerRegistry) {
    match serde_json::from_str::<ChatMessage>(text) {
        Ok(message) => {
            let _ = registry.dispatch(&message);
        }
        Err(e) => {
            counter!("chat_frames_malformed_total").increment(1);
            warn!(error = %e, len = text.len(), "dropping malformed chat frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hariku_core::{ListenerKey, UserId};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry_counting(key: ListenerKey) -> (ListenerRegistry, Arc<AtomicUsize>) {
        let registry = ListenerRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = Arc::clone(&count);
        registry.add(
            key,
            Arc::new(move |_| {
                let _ = count2.fetch_add(1, Ordering::SeqCst);
            }),
        );
        (registry, count)
    }

    #[test]
    fn valid_frame_dispatches() {
        let (registry, count) = registry_counting(ListenerKey::for_user(UserId::new(3)));
        handle_frame(
            r#"{"id":1,"content":"hi","sender_id":7,"recipient_id":3,
                "timestamp":"2025-03-14T09:26:53.589793"}"#,
            &registry,
        );
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn frame_with_extra_fields_dispatches() {
        let (registry, count) = registry_counting(ListenerKey::for_user(UserId::new(3)));
        handle_frame(
            r#"{"id":1,"content":"hi","sender_id":7,"recipient_id":3,
                "timestamp":"2025-03-14T09:26:53.589793","read":false}"#,
            &registry,
        );
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn malformed_frame_is_dropped() {
        let (registry, count) = registry_counting(ListenerKey::TherapistInbox);
        handle_frame("not json at all", &registry);
        handle_frame(r#"{"content":"missing the rest"}"#, &registry);
        handle_frame(r#"{"id":"one","content":"hi","sender_id":7,"recipient_id":3,"timestamp":"t"}"#, &registry);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn socket_closed_equality() {
        assert_eq!(SocketClosed::Remote, SocketClosed::Remote);
        assert_ne!(SocketClosed::Remote, SocketClosed::Cancelled);
    }

    #[tokio::test]
    async fn wss_dial_reaches_the_tls_layer() {
        use std::time::Duration;
        use tokio_tungstenite::tungstenite::Error as WsError;

        // A plain TCP peer that accepts and immediately hangs up. A wss
        // dial against it must fail in the TLS handshake, not in URL
        // validation: an Error::Url here would mean the secure scheme is
        // not dialable at all.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _accept = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                drop(stream);
            }
        });

        let url = format!("wss://127.0.0.1:{port}/ws/chat?token=tok");
        let err = tokio::time::timeout(Duration::from_secs(5), connect_ws(&url))
            .await
            .expect("dial must resolve, not hang")
            .unwrap_err();

        let source = err
            .source
            .as_ref()
            .and_then(|s| s.downcast_ref::<WsError>())
            .expect("handshake failure carries the transport error");
        assert!(
            !matches!(source, WsError::Url(_)),
            "wss scheme was rejected before any I/O: {source:?}"
        );
    }
}
