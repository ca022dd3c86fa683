use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("unexpected HTTP status {status} from the generation endpoint")]
    UnexpectedStatus { status: u16 },

    /// The envelope parsed but did not carry a generated text part.
    #[error("unexpected response shape: {0}")]
    MalformedResponse(String),

    /// The body or the generated text is not the expected JSON.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
