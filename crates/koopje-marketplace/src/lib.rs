//! Client for the marketplace listing search.
//!
//! Resolves a category by name against a bundled catalog and pulls the most
//! recent page of listings for it around a postal code.

pub mod category;
pub mod client;
pub mod error;
pub mod types;

pub use category::{resolve_category, Category};
pub use client::{MarketplaceClient, SearchQuery, LISTING_LIMIT, LOOKBACK_DAYS};
pub use error::MarketplaceError;
