//! One polling tick: fetch, classify, compare and notify.
//!
//! External-call failures degrade the phase that hit them; storage errors
//! abort the tick and propagate to the caller.

use koopje_classifier::{parse_interpretation, ClassifierClient, RetryPolicy};
use koopje_core::{AppConfig, Listing};
use koopje_db::DbError;
use koopje_marketplace::{resolve_category, MarketplaceClient, SearchQuery};
use koopje_notify::{format_match_message, MatchAlert, Notifier, TelegramClient};
use sqlx::SqlitePool;

use crate::runner::Shutdown;
use crate::watch_list::WatchList;

/// Counters reported at the end of every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TickSummary {
    pub fetched: usize,
    pub stored: usize,
    pub classified: usize,
    pub notified: usize,
}

/// Everything a tick needs, built once at startup.
pub(crate) struct Workflow {
    pool: SqlitePool,
    marketplace: MarketplaceClient,
    category_name: String,
    configured_category_id: Option<u32>,
    zip_code: String,
    max_distance_meters: u32,
    /// `None` when no API key is configured.
    classifier: Option<ClassifierClient>,
    notifier: Notifier,
    watch_list: WatchList,
}

impl Workflow {
    /// Builds the HTTP clients and compiles the watch-list.
    ///
    /// # Errors
    ///
    /// Fails when a configured base URL does not parse or an HTTP client
    /// cannot be constructed.
    pub(crate) fn from_config(pool: SqlitePool, config: &AppConfig) -> anyhow::Result<Self> {
        let marketplace = MarketplaceClient::with_base_url(
            &config.marketplace_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )?;

        let retry = RetryPolicy {
            max_attempts: config.classifier_max_attempts,
            backoff_base_ms: config.classifier_backoff_base_ms,
        };
        let classifier = match config.gemini_api_key.as_deref() {
            Some(api_key) => Some(ClassifierClient::with_base_url(
                &config.gemini_base_url,
                api_key,
                &config.gemini_model,
                config.request_timeout_secs,
                retry,
            )?),
            None => {
                tracing::warn!("GEMINI_API_KEY not set; brand classification is disabled");
                None
            }
        };

        let telegram =
            TelegramClient::with_base_url(&config.telegram_base_url, config.request_timeout_secs)?;
        let notifier = Notifier::new(
            telegram,
            config.telegram_bot_token.clone(),
            config.telegram_chat_id.clone(),
        );

        let watch_list = WatchList::new(&config.brands_to_monitor)?;
        if watch_list.is_empty() {
            tracing::warn!("KOOPJE_BRANDS_TO_MONITOR is empty; no listing will ever match");
        }

        Ok(Self {
            pool,
            marketplace,
            category_name: config.category_name.clone(),
            configured_category_id: config.category_id,
            zip_code: config.zip_code.clone(),
            max_distance_meters: config.max_distance_meters,
            classifier,
            notifier,
            watch_list,
        })
    }

    /// Runs the three phases in order, stopping early between phases once
    /// shutdown has been requested.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on any storage failure; external-call failures
    /// are logged and never surface here.
    pub(crate) async fn tick(&self, shutdown: &Shutdown) -> Result<TickSummary, DbError> {
        let mut summary = TickSummary::default();

        let (fetched, stored) = self.fetch_phase().await?;
        summary.fetched = fetched;
        summary.stored = stored;
        if shutdown.is_triggered() {
            tracing::info!("shutdown requested; skipping classification");
            return Ok(summary);
        }

        summary.classified = self.classify_phase().await?;
        if shutdown.is_triggered() {
            tracing::info!("shutdown requested; skipping notifications");
            return Ok(summary);
        }

        summary.notified = self.notify_phase().await?;
        Ok(summary)
    }

    async fn fetch_phase(&self) -> Result<(usize, usize), DbError> {
        let listings = self.fetch_listings().await;
        let fetched = listings.len();
        let mut stored = 0;

        for listing in listings {
            let Some(price) = listing.price else {
                tracing::debug!(link = %listing.link, "skipping listing without a price");
                continue;
            };
            if koopje_db::insert_if_new(
                &self.pool,
                &listing.title,
                &listing.description,
                &listing.link,
                price,
            )
            .await?
            {
                tracing::info!(title = %listing.title, link = %listing.link, "stored new listing");
                stored += 1;
            }
        }

        tracing::info!(fetched, stored, "fetch phase complete");
        Ok((fetched, stored))
    }

    /// Never fails: resolution and search errors yield no listings.
    async fn fetch_listings(&self) -> Vec<Listing> {
        let category = match resolve_category(&self.category_name) {
            Ok(category) => category,
            Err(e) => {
                tracing::error!(error = %e, category = %self.category_name, "category resolution failed");
                return Vec::new();
            }
        };

        if let Some(configured) = self.configured_category_id {
            if configured != category.id {
                tracing::warn!(
                    configured,
                    resolved = category.id,
                    category = %category.name,
                    "configured category id differs from the resolved one; using the resolved id"
                );
            }
        }

        let query = SearchQuery::recent(category, &self.zip_code, self.max_distance_meters);
        match self.marketplace.search(&query).await {
            Ok(listings) => listings,
            Err(e) => {
                tracing::error!(error = %e, "listing search failed");
                Vec::new()
            }
        }
    }

    async fn classify_phase(&self) -> Result<usize, DbError> {
        let rows = koopje_db::fetch_unclassified(&self.pool).await?;
        if rows.is_empty() {
            tracing::debug!("no unclassified listings");
            return Ok(0);
        }

        let Some(classifier) = &self.classifier else {
            tracing::warn!(
                pending = rows.len(),
                "classifier not configured; listings stay unclassified"
            );
            return Ok(0);
        };

        let descriptions: Vec<String> = rows.iter().map(|row| row.description.clone()).collect();
        let answers = match classifier.classify(&descriptions).await {
            Ok(answers) => answers,
            Err(e) => {
                tracing::error!(error = %e, batch = rows.len(), "brand classification failed");
                Vec::new()
            }
        };

        if answers.len() != rows.len() {
            tracing::warn!(
                expected = rows.len(),
                received = answers.len(),
                "classifier answer count mismatch; mapping by position"
            );
        }

        for (index, row) in rows.iter().enumerate() {
            let interpretation = parse_interpretation(answers.get(index).map(String::as_str));
            if interpretation.is_unknown() {
                tracing::info!(link = %row.link, "no brand identified");
            } else {
                tracing::info!(
                    link = %row.link,
                    brand = %interpretation.brand,
                    title = interpretation.title.as_deref().unwrap_or_default(),
                    "brand identified"
                );
            }
            koopje_db::set_brand(&self.pool, &row.link, &interpretation.brand).await?;
        }

        Ok(rows.len())
    }

    async fn notify_phase(&self) -> Result<usize, DbError> {
        let pending = koopje_db::fetch_pending_notifications(&self.pool).await?;
        let mut notified = 0;

        for row in &pending {
            let Some(term) = self.watch_list.first_match(&row.brand) else {
                tracing::debug!(link = %row.link, brand = %row.brand, "brand not on watch-list");
                continue;
            };

            let text = format_match_message(&MatchAlert {
                title: &row.title,
                brand: &row.brand,
                watch_term: term,
                price: row.price,
                link: &row.link,
            });

            if self.notifier.notify(&text).await {
                koopje_db::set_notified(&self.pool, &row.link, true).await?;
                tracing::info!(link = %row.link, brand = %row.brand, term, "match notified");
                notified += 1;
            } else {
                tracing::warn!(link = %row.link, term, "match not delivered; retrying next tick");
            }
        }

        tracing::info!(pending = pending.len(), notified, "compare phase complete");
        Ok(notified)
    }
}
