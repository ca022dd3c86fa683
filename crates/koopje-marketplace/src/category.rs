//! Category lookup by name.
//!
//! Numeric ids drift between marketplace releases, so the agent resolves its
//! category by name and only cross-checks any configured id.

use serde::Deserialize;

use crate::error::MarketplaceError;

const CATALOG_YAML: &str = include_str!("categories.yaml");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
    /// Level-1 parent for level-2 categories.
    #[serde(default)]
    pub parent_id: Option<u32>,
}

impl Category {
    /// Query parameters that select this category in a search.
    #[must_use]
    pub fn search_params(&self) -> Vec<(&'static str, String)> {
        match self.parent_id {
            Some(parent) => vec![
                ("l1CategoryId", parent.to_string()),
                ("l2CategoryId", self.id.to_string()),
            ],
            None => vec![("l1CategoryId", self.id.to_string())],
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    categories: Vec<Category>,
}

/// Every category in the bundled catalog.
///
/// # Errors
///
/// Returns [`MarketplaceError::Catalog`] if the bundled YAML does not parse.
pub fn catalog() -> Result<Vec<Category>, MarketplaceError> {
    let file: CatalogFile = serde_yaml::from_str(CATALOG_YAML)?;
    Ok(file.categories)
}

/// Finds a category by case-insensitive name.
///
/// # Errors
///
/// Returns [`MarketplaceError::UnknownCategory`] when no entry matches, or
/// [`MarketplaceError::Catalog`] if the catalog cannot be read.
pub fn resolve_category(name: &str) -> Result<Category, MarketplaceError> {
    let wanted = name.trim();
    catalog()?
        .into_iter()
        .find(|c| c.name.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| MarketplaceError::UnknownCategory(name.to_owned()))
}
