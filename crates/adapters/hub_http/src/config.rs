use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Connection settings for the hub.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Root of the hub, e.g. `http://192.168.1.10`.
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HubConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    #[must_use]
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            username: username.into(),
            password,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
