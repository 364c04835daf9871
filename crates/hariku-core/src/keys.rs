//! Listener keys addressing per-conversation subscribers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Raw wire value of the therapist catch-all key.
///
/// The mobile frontend registered its therapist-wide inbox listener under
/// the integer `-1`; the typed [`ListenerKey`] keeps that value out of the
/// public API but preserves it at raw-integer boundaries.
pub const INBOX_SENTINEL: i64 = -1;

/// Address of one listener slot in the chat registry.
///
/// A listener is keyed either by the counterpart user of one conversation,
/// or by the therapist-wide inbox that observes traffic from any patient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerKey {
    /// Listener for the conversation with one specific counterpart.
    ForUser(UserId),
    /// Therapist-wide listener receiving every delivered message.
    TherapistInbox,
}

impl ListenerKey {
    /// Key for the conversation with the given counterpart.
    #[must_use]
    pub const fn for_user(id: UserId) -> Self {
        Self::ForUser(id)
    }

    /// Map a raw integer key to its typed form.
    ///
    /// `-1` is the inbox sentinel; anything else addresses a user. The
    /// sentinel can therefore never alias a real conversation key.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        if raw == INBOX_SENTINEL {
            Self::TherapistInbox
        } else {
            Self::ForUser(UserId::new(raw))
        }
    }

    /// The raw integer form used on wire/CLI boundaries.
    #[must_use]
    pub const fn as_raw(self) -> i64 {
        match self {
            Self::ForUser(id) => id.value(),
            Self::TherapistInbox => INBOX_SENTINEL,
        }
    }
}

impl fmt::Display for ListenerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForUser(id) => write!(f, "user:{id}"),
            Self::TherapistInbox => write!(f, "inbox"),
        }
    }
}

impl From<UserId> for ListenerKey {
    fn from(id: UserId) -> Self {
        Self::ForUser(id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
