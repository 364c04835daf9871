//! Client configuration.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::errors::HarikuError;

/// Default backend base URL (local FastAPI dev server).
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Default delay before redialing after an unintended close, in milliseconds.
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 5000;
/// Default outbound channel capacity (frames buffered toward the writer).
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 64;
/// Default REST request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration for the Hariku client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Backend base URL with an `http` or `https` scheme.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Delay before redialing after an unintended close (default: 5000).
    ///
    /// Fixed cadence: no backoff growth, no jitter, no retry cap.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Outbound channel capacity (default: 64).
    #[serde(default = "default_outbound_capacity")]
    pub outbound_capacity: usize,
    /// REST request timeout in seconds (default: 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}
fn default_reconnect_delay_ms() -> u64 {
    DEFAULT_RECONNECT_DELAY_MS
}
fn default_outbound_capacity() -> usize {
    DEFAULT_OUTBOUND_CAPACITY
}
fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ChatConfig {
    /// Config pointing at the given backend base URL, defaults elsewhere.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Derive the chat WebSocket URL for a bearer token.
    ///
    /// The scheme is swapped `https` → `wss` / `http` → `ws` and the token
    /// is percent-encoded into the query string. Fails when the base URL
    /// carries neither scheme.
    pub fn ws_url(&self, token: &str) -> Result<String, HarikuError> {
        let base = self.base_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https") {
            format!("wss{rest}")
        } else if let Some(rest) = base.strip_prefix("http") {
            format!("ws{rest}")
        } else {
            return Err(HarikuError::config(format!(
                "base URL must start with http or https: {base}"
            )));
        };
        let encoded = utf8_percent_encode(token, NON_ALPHANUMERIC);
        Ok(format!("{ws_base}/ws/chat?token={encoded}"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
