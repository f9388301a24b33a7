//! Client configuration.

use std::time::Duration;

/// Default login endpoint.
pub const DEFAULT_LOGIN_PATH: &str = "/auth/authenticate";

/// Tunables for a [`FortiSoar`](crate::FortiSoar) client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Verify the server's TLS certificate.
    pub verify_tls: bool,
    /// Per-request timeout, login included.
    pub timeout: Duration,
    /// Path of the username/password login endpoint.
    pub login_path: String,
    /// Delay between export job status checks.
    pub poll_interval: Duration,
    /// Status checks before an export is reported as timed out.
    pub max_export_polls: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            verify_tls: true,
            timeout: Duration::from_secs(30),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            poll_interval: Duration::from_secs(5),
            max_export_polls: 120,
        }
    }
}
