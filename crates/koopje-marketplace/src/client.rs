//! HTTP client for the marketplace's public listing search endpoint.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use koopje_core::Listing;
use reqwest::{Client, Url};

use crate::category::Category;
use crate::error::MarketplaceError;
use crate::types::SearchResponse;

const DEFAULT_BASE_URL: &str = "https://www.marktplaats.nl";
const SEARCH_PATH: &str = "lrp/api/search";

/// Page size for a single fetch.
pub const LISTING_LIMIT: u32 = 50;

/// How far back the search looks, in days.
pub const LOOKBACK_DAYS: i64 = 8;

/// Parameters of one listing search.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub zip_code: String,
    pub distance_meters: u32,
    pub limit: u32,
    pub offset: u32,
    pub offered_since: DateTime<Utc>,
    pub category: Category,
}

impl SearchQuery {
    /// Newest-first page of the last [`LOOKBACK_DAYS`] days in `category`,
    /// capped at [`LISTING_LIMIT`] results.
    #[must_use]
    pub fn recent(category: Category, zip_code: &str, distance_meters: u32) -> Self {
        Self {
            query: String::new(),
            zip_code: zip_code.to_owned(),
            distance_meters,
            limit: LISTING_LIMIT,
            offset: 0,
            offered_since: Utc::now() - TimeDelta::days(LOOKBACK_DAYS),
            category,
        }
    }
}

/// Client for the listing search endpoint.
///
/// Use [`MarketplaceClient::new`] for production or
/// [`MarketplaceClient::with_base_url`] to point at a mock server in tests.
pub struct MarketplaceClient {
    client: Client,
    base_url: Url,
}

impl MarketplaceClient {
    /// Creates a client pointed at the production marketplace.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, MarketplaceError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout_secs, user_agent)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`MarketplaceError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, MarketplaceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // A trailing slash makes `Url::join` append to the path instead of
        // replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| MarketplaceError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Runs one search and returns its listings in server order (newest first).
    ///
    /// # Errors
    ///
    /// - [`MarketplaceError::Http`] on network failure.
    /// - [`MarketplaceError::UnexpectedStatus`] on a non-2xx status.
    /// - [`MarketplaceError::Deserialize`] if the body is not the expected JSON.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Listing>, MarketplaceError> {
        let url = self.search_url(query)?;

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketplaceError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str::<SearchResponse>(&body).map_err(|e| {
            MarketplaceError::Deserialize {
                context: format!("search in category {}", query.category.name),
                source: e,
            }
        })?;

        tracing::debug!(
            category = %query.category.name,
            count = parsed.listings.len(),
            "search returned listings"
        );

        Ok(parsed
            .listings
            .into_iter()
            .map(|raw| raw.into_listing(&self.base_url))
            .collect())
    }

    /// Builds the search URL with percent-encoded query parameters.
    fn search_url(&self, query: &SearchQuery) -> Result<Url, MarketplaceError> {
        let mut url =
            self.base_url
                .join(SEARCH_PATH)
                .map_err(|e| MarketplaceError::InvalidBaseUrl {
                    base_url: self.base_url.to_string(),
                    reason: e.to_string(),
                })?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("query", &query.query)
                .append_pair("postcode", &query.zip_code)
                .append_pair("distanceMeters", &query.distance_meters.to_string())
                .append_pair("limit", &query.limit.to_string())
                .append_pair("offset", &query.offset.to_string())
                .append_pair("sortBy", "SORT_INDEX")
                .append_pair("sortOrder", "DECREASING")
                .append_pair(
                    "attributesByKey[]",
                    &format!("offeredSince:{}", query.offered_since.timestamp_millis()),
                );
            for (key, value) in query.category.search_params() {
                pairs.append_pair(key, &value);
            }
        }

        Ok(url)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
