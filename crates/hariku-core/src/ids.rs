//! Branded ID newtypes for type safety.
//!
//! User and message identifiers are integers assigned by the backend. Each
//! gets a distinct newtype so a message ID cannot be passed where a user ID
//! is expected. The inner value is `i64` to match the backend's integer
//! primary keys.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a backend-assigned identifier.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Return the raw integer value.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Unique identifier for a user (patient or therapist).
    UserId
}

branded_id! {
    /// Unique identifier for a persisted chat message.
    MessageId
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_round_trips_value() {
        let id = UserId::new(42);
        assert_eq!(id.value(), 42);
    }

    #[test]
    fn ids_of_same_value_are_equal() {
        assert_eq!(UserId::new(7), UserId::from(7));
        assert_ne!(UserId::new(7), UserId::new(8));
    }

    #[test]
    fn display_is_plain_integer() {
        let id = UserId::new(123);
        assert_eq!(format!("{id}"), "123");
    }

    #[test]
    fn negative_values_allowed() {
        // Raw wire keys may be negative (the catch-all sentinel).
        let id = UserId::new(-1);
        assert_eq!(id.value(), -1);
    }

    #[test]
    fn into_i64() {
        let id = MessageId::new(99);
        let raw: i64 = id.into();
        assert_eq!(raw, 99);
    }

    #[test]
    fn serde_transparent() {
        let id = UserId::new(5);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "5");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn serde_in_struct() {
        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        struct Pair {
            sender_id: UserId,
            recipient_id: UserId,
        }

        let pair = Pair {
            sender_id: UserId::new(1),
            recipient_id: UserId::new(2),
        };
        let json = serde_json::to_string(&pair).unwrap();
        assert_eq!(json, r#"{"sender_id":1,"recipient_id":2}"#);
        let back: Pair = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pair);
    }

    #[test]
    fn hash_and_eq() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        let _ = set.insert(UserId::new(3));
        let _ = set.insert(UserId::new(3));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn ordering_follows_value() {
        assert!(UserId::new(1) < UserId::new(2));
        assert!(MessageId::new(10) > MessageId::new(9));
    }
}
