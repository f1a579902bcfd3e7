//! Shared HTTP client construction for consistent timeout and TLS configuration.

use std::time::Duration;

/// Request timeout applied when the caller does not configure one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Create an HTTP client for model calls.
///
/// Config: 30s connect timeout, `request_timeout` for the whole request, rustls TLS,
/// `documind/{version}` user-agent, redirect limit 10.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_client(request_timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .timeout(request_timeout)
        .user_agent(concat!("documind/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
}
