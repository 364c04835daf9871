//! Listener registry and message fan-out.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::counter;
use parking_lot::RwLock;
use tracing::debug;

use hariku_core::{ChatMessage, ListenerKey};

/// Callback invoked with each message delivered to a registered key.
pub type Listener = Arc<dyn Fn(&ChatMessage) + Send + Sync>;

/// Registry of message listeners keyed by conversation.
///
/// A chat screen registers under the other participant's key; the therapist
/// dashboard registers under [`ListenerKey::TherapistInbox`] to hear every
/// conversation. At most one listener per key: registering again replaces
/// the previous callback.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<HashMap<ListenerKey, Listener>>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `key`, replacing any existing one.
    pub fn add(&self, key: ListenerKey, listener: Listener) {
        let replaced = self.listeners.write().insert(key, listener).is_some();
        debug!(%key, replaced, "listener registered");
    }

    /// Remove the listener for `key`. Returns whether one was present.
    pub fn remove(&self, key: ListenerKey) -> bool {
        let removed = self.listeners.write().remove(&key).is_some();
        debug!(%key, removed, "listener removed");
        removed
    }

    /// Drop every listener.
    pub fn clear(&self) {
        let count = {
            let mut listeners = self.listeners.write();
            let count = listeners.len();
            listeners.clear();
            count
        };
        if count > 0 {
            debug!(count, "listener registry cleared");
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    /// True when no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Deliver `message` to every interested listener.
    ///
    /// Slots are checked in a fixed order: the recipient's key, the sender's
    /// key, the therapist inbox. There is no dedup across slots; when sender
    /// and recipient coincide the same listener fires twice, which keeps a
    /// self-addressed message visible in that one registered view.
    ///
    /// Returns the number of invocations.
    pub fn dispatch(&self, message: &ChatMessage) -> usize {
        let slots = [
            ListenerKey::for_user(message.recipient_id),
            ListenerKey::for_user(message.sender_id),
            ListenerKey::TherapistInbox,
        ];

        // Snapshot under the read lock, invoke outside it, so a callback is
        // free to re-register or remove itself without deadlocking.
        let matched: Vec<Listener> = {
            let listeners = self.listeners.read();
            slots
                .iter()
                .filter_map(|key| listeners.get(key).cloned())
                .collect()
        };

        for listener in &matched {
            listener(message);
        }

        counter!("chat_messages_delivered_total").increment(matched.len() as u64);
        debug!(
            message_id = %message.id,
            sender = %message.sender_id,
            recipient = %message.recipient_id,
            listeners = matched.len(),
            "message dispatched"
        );
        matched.len()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
