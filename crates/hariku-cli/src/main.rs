//! # hariku
//!
//! Terminal chat client for the Hariku backend. Connects the chat socket,
//! prints messages for one conversation (or the whole therapist inbox) and
//! sends stdin lines to the chosen counterpart.

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use hariku_api::ApiClient;
use hariku_chat::ChatClient;
use hariku_core::{ChatConfig, ChatMessage, ListenerKey, UserId};

#[derive(Parser, Debug)]
#[command(name = "hariku", about = "Terminal chat client for the Hariku backend")]
struct Cli {
    /// Backend base URL
    #[arg(long, default_value = "http://localhost:8000")]
    server: String,

    /// Bearer token of the signed-in user
    #[arg(long)]
    token: String,

    /// Counterpart user ID; stdin lines are sent to this conversation
    #[arg(
        long,
        value_parser = clap::value_parser!(i64).range(1..),
        conflicts_with = "inbox",
        required_unless_present = "inbox"
    )]
    peer: Option<i64>,

    /// Listen to every conversation instead of one (receive only)
    #[arg(long)]
    inbox: bool,

    /// How many stored messages to print before going live
    #[arg(long, default_value = "20")]
    history: u32,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    hariku_core::logging::init_subscriber(&args.log_level);

    let config = ChatConfig::with_base_url(&args.server);
    let peer = args.peer.map(UserId::new);
    let key = match peer {
        Some(peer) => ListenerKey::for_user(peer),
        None => ListenerKey::TherapistInbox,
    };

    tracing::info!(server = %args.server, %key, "starting hariku chat client");

    if let Some(peer) = peer {
        if args.history > 0 {
            let api = ApiClient::new(&config, args.token.clone())?;
            match api.get_messages(peer, 0, args.history).await {
                Ok(history) => {
                    for message in &history {
                        print_message(message);
                    }
                }
                Err(error) => tracing::warn!(%error, "could not fetch message history"),
            }
        }
    }

    let client = ChatClient::new(config);
    client.add_listener(key, print_message);
    client.connect(args.token);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line.context("Failed to read stdin")? {
                Some(line) => {
                    let text = line.trim();
                    if text.is_empty() {
                        continue;
                    }
                    match peer {
                        Some(peer) => client.send_message(text, peer),
                        None => tracing::warn!("inbox mode is receive-only; pass --peer to send"),
                    }
                }
                None => break,
            },
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for ctrl-c")?;
                break;
            }
        }
    }

    tracing::info!("Shutting down...");
    client.disconnect();
    Ok(())
}

/// Print one message as `[time] sender -> recipient: content`.
fn print_message(message: &ChatMessage) {
    let when = message.timestamp_utc().map_or_else(
        || message.timestamp.clone(),
        |utc| utc.format("%H:%M:%S").to_string(),
    );
    println!(
        "[{when}] {} -> {}: {}",
        message.sender_id, message.recipient_id, message.content
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
