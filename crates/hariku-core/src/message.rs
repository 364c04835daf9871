//! Wire types for the chat channel.
//!
//! The backend owns these shapes. Inbound messages arrive both over the
//! WebSocket (the server echoes each stored message to recipient *and*
//! sender) and from the REST history endpoint, with identical JSON.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{MessageId, UserId};

/// A stored chat message as delivered by the backend.
///
/// `timestamp` is an ISO-8601 string produced by the backend and may lack a
/// UTC offset; it is carried verbatim, with [`ChatMessage::timestamp_utc`]
/// as a best-effort parse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Backend-assigned message ID.
    pub id: MessageId,
    /// Message body.
    pub content: String,
    /// Author of the message.
    pub sender_id: UserId,
    /// Addressee of the message.
    pub recipient_id: UserId,
    /// Persistence time, ISO-8601.
    pub timestamp: String,
}

impl ChatMessage {
    /// Parse the timestamp, treating an offset-free value as UTC.
    ///
    /// Returns `None` when the string is not ISO-8601 at all.
    #[must_use]
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(dt.with_timezone(&Utc));
        }
        // Naive isoformat() output, e.g. "2025-03-14T09:26:53.589793"
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// Payload the client writes to the socket to send a message.
///
/// The server fills in `sender_id`, `id`, and `timestamp` when it persists
/// and echoes the message back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Message body.
    pub content: String,
    /// Addressee of the message.
    pub recipient_id: UserId,
}

impl OutboundMessage {
    /// Build an outbound message.
    #[must_use]
    pub fn new(content: impl Into<String>, recipient_id: UserId) -> Self {
        Self {
            content: content.into(),
            recipient_id,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
