//! Client for the chat platform's bot `sendMessage` endpoint.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Serialize;

use crate::error::NotifyError;

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Thin HTTP client for `POST /bot<token>/sendMessage`.
pub struct TelegramClient {
    client: Client,
    base_url: Url,
}

impl TelegramClient {
    /// Creates a client pointed at the production bot API.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(timeout_secs: u64) -> Result<Self, NotifyError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout_secs)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`NotifyError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| NotifyError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Sends `text` with `MarkdownV2` formatting. A 2xx response counts as
    /// delivered.
    ///
    /// # Errors
    ///
    /// - [`NotifyError::Http`] on network failure.
    /// - [`NotifyError::UnexpectedStatus`] on a non-2xx response, carrying the
    ///   platform's error description when it sent one.
    /// - [`NotifyError::InvalidBaseUrl`] if the token makes the URL invalid.
    pub async fn send_message(
        &self,
        bot_token: &str,
        chat_id: &str,
        text: &str,
    ) -> Result<(), NotifyError> {
        // Tokens look like `123:abc`, which `Url::join` would read as a
        // scheme, so the path is appended textually.
        let url = Url::parse(&format!("{}bot{bot_token}/sendMessage", self.base_url)).map_err(
            |e| NotifyError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            },
        )?;

        let response = self
            .client
            .post(url)
            .json(&SendMessageRequest {
                chat_id,
                text,
                parse_mode: "MarkdownV2",
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::UnexpectedStatus {
            status: status.as_u16(),
            description: error_description(&body),
        })
    }
}

/// Extracts `description` from a bot API error body, falling back to a
/// truncated raw body.
fn error_description(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        description: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.description)
        .unwrap_or_else(|| body.chars().take(200).collect())
}

/// Delivery front-end used by the workflow.
///
/// Holds the optional credentials and reduces every outcome to a boolean so
/// the caller only has to decide whether to mark a row as notified.
pub struct Notifier {
    client: TelegramClient,
    bot_token: Option<String>,
    chat_id: Option<String>,
}

impl Notifier {
    #[must_use]
    pub fn new(client: TelegramClient, bot_token: Option<String>, chat_id: Option<String>) -> Self {
        Self {
            client,
            bot_token,
            chat_id,
        }
    }

    /// Sends `text` and reports whether delivery was confirmed.
    ///
    /// Missing credentials short-circuit to `false` without a request.
    pub async fn notify(&self, text: &str) -> bool {
        let (Some(token), Some(chat_id)) = (self.bot_token.as_deref(), self.chat_id.as_deref())
        else {
            tracing::warn!("bot token or chat id not configured; notification not sent");
            return false;
        };

        match self.client.send_message(token, chat_id, text).await {
            Ok(()) => {
                let preview: String = text.chars().take(50).collect();
                tracing::info!(chat_id, preview = %preview, "notification sent");
                true
            }
            Err(e) => {
                tracing::warn!(chat_id, error = %e, "notification failed");
                false
            }
        }
    }
}
