//! # hariku-chat
//!
//! Chat connection manager for the Hariku client: one WebSocket per
//! signed-in user, listener fan-out keyed by conversation, and a fixed
//! redial delay after unintended closes.
//!
//! [`ChatClient`] is the entry point. It owns the socket task and the
//! [`ListenerRegistry`]; screens register listeners for the conversations
//! they show and send messages through the client.

#![deny(unsafe_code)]

pub mod client;
pub mod registry;

mod reconnect;
mod socket;

pub use client::ChatClient;
pub use registry::{Listener, ListenerRegistry};
