//! Adapter error types and their mapping onto [`HubError`].

use hcbridge_domain::error::HubError;

/// Failures building the hub client.
#[derive(Debug, thiserror::Error)]
pub enum HubHttpError {
    /// The hub URL cannot carry a path (e.g. `mailto:`).
    #[error("hub url {0} cannot be used as a base url")]
    InvalidUrl(url::Url),

    #[error("failed to build http client")]
    Client(#[from] reqwest::Error),
}

impl From<HubHttpError> for HubError {
    fn from(err: HubHttpError) -> Self {
        HubError::Transport(Box::new(err))
    }
}

/// Classify a reqwest failure: body decoding problems are [`HubError::Decode`],
/// everything else is a transport failure.
pub(crate) fn from_reqwest(err: reqwest::Error) -> HubError {
    if err.is_decode() {
        HubError::Decode(Box::new(err))
    } else {
        HubError::Transport(Box::new(err))
    }
}
