//! Fixed-delay reconnect timing.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Outcome of a reconnect wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryWait {
    /// The full delay elapsed; the caller should redial.
    Elapsed,
    /// The wait was cancelled before the delay elapsed.
    Cancelled,
}

/// Sleep for the reconnect delay, unless cancelled first.
///
/// The delay is the same for every attempt. No backoff growth, no jitter,
/// no attempt cap: an unreachable server is redialed at this fixed cadence
/// until the connection is hung up on purpose.
pub async fn wait_for_retry(delay: Duration, cancel: &CancellationToken) -> RetryWait {
    tokio::select! {
        () = tokio::time::sleep(delay) => RetryWait::Elapsed,
        () = cancel.cancelled() => RetryWait::Cancelled,
    }
}
