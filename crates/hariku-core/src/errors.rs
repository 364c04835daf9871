//! Error hierarchy for the Hariku client.
//!
//! Built on [`thiserror`]:
//!
//! - [`HarikuError`]: Top-level enum covering all error domains
//! - [`ConnectionError`]: WebSocket transport failures with operation context
//! - [`ApiError`]: REST call failures with endpoint and HTTP status
//!
//! Transport errors never reach chat callers (the connection manager logs
//! and retries); they exist so the socket task and the REST client can
//! report *what* failed with enough context to debug from logs alone.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// HarikuError — top-level error enum
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level error type for the Hariku client.
#[derive(Debug, Error)]
pub enum HarikuError {
    /// WebSocket transport error.
    #[error("{0}")]
    Connection(#[from] ConnectionError),

    /// REST API error.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Configuration error (bad base URL and the like).
    #[error("config error: {message}")]
    Config {
        /// Human-readable message.
        message: String,
    },
}

impl HarikuError {
    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ConnectionError
// ─────────────────────────────────────────────────────────────────────────────

/// Transport operation that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionOperation {
    /// Deriving the WebSocket URL from the configured base.
    Resolve,
    /// Opening the transport and completing the upgrade handshake.
    Handshake,
    /// Writing a frame to the socket.
    Send,
    /// Reading a frame from the socket.
    Receive,
    /// Closing the socket.
    Close,
}

impl fmt::Display for ConnectionOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve => write!(f, "resolve"),
            Self::Handshake => write!(f, "handshake"),
            Self::Send => write!(f, "send"),
            Self::Receive => write!(f, "receive"),
            Self::Close => write!(f, "close"),
        }
    }
}

/// WebSocket transport error.
#[derive(Debug, Error)]
#[error("chat {operation} failed: {message}")]
pub struct ConnectionError {
    /// Operation that failed.
    pub operation: ConnectionOperation,
    /// Human-readable message.
    pub message: String,
    /// Machine-readable error code.
    pub code: String,
    /// Original cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ConnectionError {
    /// Create a new connection error.
    #[must_use]
    pub fn new(operation: ConnectionOperation, message: impl Into<String>) -> Self {
        let op_upper = operation.to_string().to_uppercase();
        Self {
            operation,
            message: message.into(),
            code: format!("CHAT_{op_upper}_ERROR"),
            source: None,
        }
    }

    /// Set the error cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Set a custom error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ApiError
// ─────────────────────────────────────────────────────────────────────────────

/// REST API call failure.
#[derive(Debug, Error)]
#[error("api call {endpoint} failed: {message}")]
pub struct ApiError {
    /// Endpoint path, e.g. `/chat/messages/3`.
    pub endpoint: String,
    /// HTTP status, when a response was received at all.
    pub status: Option<u16>,
    /// Human-readable message.
    pub message: String,
    /// Original cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ApiError {
    /// Create a new API error.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            status: None,
            message: message.into(),
            source: None,
        }
    }

    /// Set the HTTP status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the error cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// True for HTTP 401/403 responses.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status, Some(401 | 403))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
