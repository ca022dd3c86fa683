use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// Network or TLS failure. The URL is stripped because it embeds the
    /// bot token.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("chat endpoint returned HTTP {status}: {description}")]
    UnexpectedStatus { status: u16, description: String },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}
