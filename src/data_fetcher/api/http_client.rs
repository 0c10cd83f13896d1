//! HTTP client creation and configuration utilities

use reqwest::Client;
use std::time::Duration;

/// Creates the shared HTTP client: request timeout, pooled idle
/// connections per host and the crate user agent.
///
/// Retries are not performed here; they are driven explicitly by the
/// data streams.
pub fn create_http_client_with_timeout(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(crate::constants::HTTP_POOL_MAX_IDLE_PER_HOST)
        .user_agent(crate::constants::USER_AGENT)
        .build()
}

/// Creates an HTTP client for testing with default timeout
#[cfg(test)]
pub fn create_test_http_client() -> Client {
    create_http_client_with_timeout(Duration::from_secs(
        crate::constants::DEFAULT_HTTP_TIMEOUT_SECONDS,
    ))
    .expect("Failed to create test HTTP client")
}
