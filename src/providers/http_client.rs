use reqwest::Client;
use std::time::Duration;

/// Shared HTTP client profile for the completion provider and the chat channel.
///
/// `timeout_secs` must exceed any server-side long-poll window the caller uses.
pub fn build_http_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}
