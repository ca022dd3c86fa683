use std::time::Duration;

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
    /// Category resolved by name against the marketplace catalog.
    pub category_name: String,
    /// Numeric category id from the environment; only cross-checked
    /// against the id resolved from `category_name`.
    pub category_id: Option<u32>,
    pub poll_interval_minutes: u64,
    /// Watch-list terms in configured order.
    pub brands_to_monitor: Vec<String>,
    pub zip_code: String,
    pub max_distance_meters: u32,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub marketplace_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    /// Total classifier attempts, including the first one.
    pub classifier_max_attempts: u32,
    pub classifier_backoff_base_ms: u64,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub telegram_base_url: String,
}

impl AppConfig {
    /// Sleep between two workflow ticks.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_minutes.saturating_mul(60))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[redacted]")
            .field("log_level", &self.log_level)
            .field("category_name", &self.category_name)
            .field("category_id", &self.category_id)
            .field("poll_interval_minutes", &self.poll_interval_minutes)
            .field("brands_to_monitor", &self.brands_to_monitor)
            .field("zip_code", &self.zip_code)
            .field("max_distance_meters", &self.max_distance_meters)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("marketplace_base_url", &self.marketplace_base_url)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("classifier_max_attempts", &self.classifier_max_attempts)
            .field(
                "classifier_backoff_base_ms",
                &self.classifier_backoff_base_ms,
            )
            .field(
                "telegram_bot_token",
                &self.telegram_bot_token.as_ref().map(|_| "[redacted]"),
            )
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("telegram_base_url", &self.telegram_base_url)
            .finish()
    }
}
