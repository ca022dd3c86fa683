//! Shared configuration and domain types for the koopje listing monitor.

mod app_config;
mod config;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};

/// Brand stored for a listing the classifier could not interpret.
///
/// A row carrying this value counts as classified and is never sent back
/// to the classifier.
pub const UNKNOWN_BRAND: &str = "Onbekend";

/// A single advertisement as returned by the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    /// Free-text body of the ad; empty when the source omits it.
    pub description: String,
    /// Absolute URL of the ad. Unique per listing.
    pub link: String,
    /// Asking price in euros. `None` for bid-only or "see description" ads.
    pub price: Option<f64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
