//! HTTP client construction for provider calls

use crate::ClientConfig;
use reqwest::Client;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// User agent sent with every vendor request
pub fn user_agent() -> String {
    format!("ai-processor/{}", env!("CARGO_PKG_VERSION"))
}

/// Build the client for one invocation.
///
/// The process handles a single request, so no pooling or keepalive is
/// configured.
pub fn build_client(config: &ClientConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(config.timeout))
        .pool_max_idle_per_host(0)
        .use_rustls_tls()
        .user_agent(user_agent())
        .build()
}
