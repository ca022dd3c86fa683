//! HTTP client for the hosted `generateContent` endpoint.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;
use crate::prompt::build_prompt;
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Attempt budget for one classify batch.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles for each later one.
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_ms: 1_000,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [TextPart<'a>; 1],
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: ResponseSchema,
}

#[derive(Serialize)]
struct ResponseSchema {
    #[serde(rename = "type")]
    kind: &'static str,
    items: ItemSchema,
}

#[derive(Serialize)]
struct ItemSchema {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<serde_json::Value>,
}

/// Client for brand classification batches.
pub struct ClassifierClient {
    client: Client,
    api_key: String,
    endpoint: Url,
    retry: RetryPolicy,
}

impl ClassifierClient {
    /// Creates a client pointed at the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::Http`] if the `reqwest::Client` cannot be
    /// constructed.
    pub fn new(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        retry: RetryPolicy,
    ) -> Result<Self, ClassifierError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, model, timeout_secs, retry)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ClassifierError::InvalidBaseUrl`] if the endpoint URL does
    /// not parse.
    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        retry: RetryPolicy,
    ) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let raw = format!(
            "{}/v1beta/models/{model}:generateContent",
            base_url.trim_end_matches('/')
        );
        let endpoint = Url::parse(&raw).map_err(|e| ClassifierError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
            retry,
        })
    }

    /// Sends all `descriptions` in one request and returns the model's
    /// answers, one string per description in input order when the model
    /// behaves.
    ///
    /// Transport failures and 429/5xx responses are retried per the
    /// [`RetryPolicy`]. The answer count is NOT checked here; callers map
    /// answers to inputs by position.
    ///
    /// # Errors
    ///
    /// - [`ClassifierError::Http`] or [`ClassifierError::UnexpectedStatus`]
    ///   once every attempt has failed.
    /// - [`ClassifierError::MalformedResponse`] when no text part is present.
    /// - [`ClassifierError::Deserialize`] when the body or the generated text
    ///   is not the expected JSON.
    pub async fn classify(&self, descriptions: &[String]) -> Result<Vec<String>, ClassifierError> {
        let descriptions_json =
            serde_json::to_string(descriptions).map_err(|e| ClassifierError::Deserialize {
                context: "encoding descriptions".to_owned(),
                source: e,
            })?;
        let prompt = build_prompt(&descriptions_json);

        let request = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [TextPart { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: ResponseSchema {
                    kind: "ARRAY",
                    items: ItemSchema { kind: "STRING" },
                },
            },
        };

        let body = retry_with_backoff(self.retry.max_attempts, self.retry.backoff_base_ms, || {
            self.send(&request)
        })
        .await?;

        parse_generated_list(&body)
    }

    /// One attempt: POST the request and return the raw body on 2xx.
    ///
    /// The API key travels in the query string, so URLs are stripped from
    /// transport errors before they can reach a log line.
    async fn send(&self, request: &GenerateRequest<'_>) -> Result<String, ClassifierError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| ClassifierError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ClassifierError::Http(e.without_url()))
    }
}

/// Pulls `candidates[0].content.parts[0].text` out of the envelope and
/// decodes it as a JSON array of strings.
fn parse_generated_list(body: &str) -> Result<Vec<String>, ClassifierError> {
    let envelope: GenerateResponse =
        serde_json::from_str(body).map_err(|e| ClassifierError::Deserialize {
            context: "generateContent envelope".to_owned(),
            source: e,
        })?;

    let text = envelope
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| ClassifierError::MalformedResponse("no generated text part".to_owned()))?;

    let serde_json::Value::String(text) = text else {
        return Err(ClassifierError::MalformedResponse(
            "generated text part is not a string".to_owned(),
        ));
    };

    serde_json::from_str::<Vec<String>>(&text).map_err(|e| ClassifierError::Deserialize {
        context: "generated brand list".to_owned(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(text: &serde_json::Value) -> String {
        serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    #[test]
    fn parses_generated_array() {
        let body = envelope(&serde_json::json!(
            r#"["Merk: Trek, Titel: Fietsje", "Merk: Onbekend, Titel: Onbekend"]"#
        ));
        let parsed = parse_generated_list(&body).unwrap();
        assert_eq!(
            parsed,
            vec!["Merk: Trek, Titel: Fietsje", "Merk: Onbekend, Titel: Onbekend"]
        );
    }

    #[test]
    fn missing_candidates_is_malformed() {
        let err = parse_generated_list(r#"{"candidates": []}"#).unwrap_err();
        assert!(matches!(err, ClassifierError::MalformedResponse(_)));
    }

    #[test]
    fn non_string_text_is_malformed() {
        let body = envelope(&serde_json::json!(["Merk: Trek"]));
        let err = parse_generated_list(&body).unwrap_err();
        assert!(matches!(err, ClassifierError::MalformedResponse(_)));
    }

    #[test]
    fn text_that_is_not_an_array_is_rejected() {
        let body = envelope(&serde_json::json!(r#"{"brand": "Trek"}"#));
        let err = parse_generated_list(&body).unwrap_err();
        assert!(matches!(err, ClassifierError::Deserialize { .. }));
    }

    #[test]
    fn non_json_body_is_rejected() {
        let err = parse_generated_list("<html>quota</html>").unwrap_err();
        assert!(matches!(err, ClassifierError::Deserialize { .. }));
    }

    #[test]
    fn endpoint_includes_model() {
        let client = ClassifierClient::with_base_url(
            "http://localhost:1/",
            "k",
            "m-1",
            5,
            RetryPolicy::default(),
        )
        .unwrap();
        assert_eq!(
            client.endpoint.as_str(),
            "http://localhost:1/v1beta/models/m-1:generateContent"
        );
    }
}
