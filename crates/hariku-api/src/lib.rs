//! # hariku-api
//!
//! REST client for the chat-adjacent Hariku backend endpoints:
//!
//! - `GET /chat/messages/{other_user_id}` — paged conversation history
//! - `GET /therapist` — the signed-in patient's assigned therapist
//! - `GET /patients` — the signed-in therapist's roster
//!
//! Screens load history over REST before attaching a live listener to the
//! chat connection; the WebSocket only carries messages sent after that
//! point.

#![deny(unsafe_code)]

pub mod client;
pub mod types;

pub use client::ApiClient;
pub use types::{UserProfile, UserRole};
