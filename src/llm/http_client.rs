use reqwest::Client;
use std::time::Duration;

/// Per-call ceiling for a content-generation request.
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(120);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub fn build_provider_client() -> Client {
    build_provider_client_with_timeout(GENERATION_TIMEOUT)
}

pub fn build_provider_client_with_timeout(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|_| Client::new())
}
