//! Response types for the backend's user endpoints.

use hariku_core::UserId;
use serde::{Deserialize, Serialize};

/// Role of a user account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// A journaling patient.
    Patient,
    /// A therapist with an assigned patient roster.
    Therapist,
}

/// The subset of a user record the chat screens need.
///
/// The backend returns richer objects (streak, activity, clinical data);
/// unknown fields are ignored on deserialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend-assigned user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Account role.
    pub role: UserRole,
    /// Avatar image reference, when set.
    #[serde(default)]
    pub image: Option<String>,
}
