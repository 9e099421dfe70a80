//! Outgoing HTTP.

use reqwest::Client;
use std::time::Duration;

/// User agent sent with every outgoing request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the client used for outgoing calls
///
/// There is no overall request timeout. Completion calls are bounded by the
/// retry policy's per-attempt timeout and client-side searches by their
/// cancellation token.
pub fn build_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {}", e);
            Client::new()
        })
}
