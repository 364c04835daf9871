//! # hariku-core
//!
//! Foundation types for the Hariku chat client.
//!
//! This crate provides the shared vocabulary the other Hariku crates depend on:
//!
//! - **Branded IDs**: `UserId`, `MessageId` as integer newtypes for type safety
//! - **Listener keys**: `ListenerKey` addressing per-conversation subscribers
//! - **Wire types**: `ChatMessage` (inbound) and `OutboundMessage` (client → server)
//! - **Errors**: `HarikuError` hierarchy via `thiserror`
//! - **Config**: `ChatConfig` with the backend base URL and reconnect cadence
//! - **Logging**: `tracing` subscriber initialization

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod ids;
pub mod keys;
pub mod logging;
pub mod message;

pub use config::ChatConfig;
pub use errors::{ApiError, ConnectionError, ConnectionOperation, HarikuError};
pub use ids::{MessageId, UserId};
pub use keys::ListenerKey;
pub use message::{ChatMessage, OutboundMessage};
