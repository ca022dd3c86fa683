//! Database operations for the `advertisements` table.
//!
//! Every function is a single statement and its own commit unit; nothing
//! here opens a cross-call transaction.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A full row from the `advertisements` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdvertisementRow {
    pub id: i64,
    pub timestamp: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: String,
    pub price: Option<f64>,
    /// `None` or empty until the classifier has seen the row.
    pub brand: Option<String>,
    pub brand_notified: bool,
}

/// A row waiting for brand classification.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct UnclassifiedRow {
    pub description: String,
    pub link: String,
}

/// A classified row that has not been announced yet.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PendingNotificationRow {
    pub title: String,
    pub description: String,
    pub link: String,
    pub price: f64,
    pub brand: String,
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Inserts a new advertisement with no brand and `brand_notified = 0`.
///
/// Returns `true` when a row was created and `false` when `link` already
/// exists; a duplicate is not an error.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_if_new(
    pool: &SqlitePool,
    title: &str,
    description: &str,
    link: &str,
    price: f64,
) -> Result<bool, DbError> {
    let timestamp = Utc::now().to_rfc3339();

    let result = sqlx::query(
        "INSERT OR IGNORE INTO advertisements \
             (timestamp, title, description, link, price, brand, brand_notified) \
         VALUES (?, ?, ?, ?, ?, NULL, 0)",
    )
    .bind(timestamp)
    .bind(title)
    .bind(description)
    .bind(link)
    .bind(price)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Sets `brand` for the row with the given link. No-op when the link is
/// unknown.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn set_brand(pool: &SqlitePool, link: &str, brand: &str) -> Result<(), DbError> {
    sqlx::query("UPDATE advertisements SET brand = ? WHERE link = ?")
        .bind(brand)
        .bind(link)
        .execute(pool)
        .await?;
    Ok(())
}

/// Sets `brand_notified` for the row with the given link.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn set_notified(pool: &SqlitePool, link: &str, notified: bool) -> Result<(), DbError> {
    sqlx::query("UPDATE advertisements SET brand_notified = ? WHERE link = ?")
        .bind(i64::from(notified))
        .bind(link)
        .execute(pool)
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Returns rows without a brand that have a non-empty description.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn fetch_unclassified(pool: &SqlitePool) -> Result<Vec<UnclassifiedRow>, DbError> {
    let rows = sqlx::query_as::<_, UnclassifiedRow>(
        "SELECT description, link \
         FROM advertisements \
         WHERE (brand IS NULL OR brand = '') \
           AND description IS NOT NULL AND description != '' \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns classified rows (sentinel brand included) not yet notified.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn fetch_pending_notifications(
    pool: &SqlitePool,
) -> Result<Vec<PendingNotificationRow>, DbError> {
    let rows = sqlx::query_as::<_, PendingNotificationRow>(
        "SELECT COALESCE(title, '') AS title, \
                COALESCE(description, '') AS description, \
                link, \
                COALESCE(price, 0.0) AS price, \
                brand \
         FROM advertisements \
         WHERE brand IS NOT NULL AND brand != '' \
           AND brand_notified = 0 \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetches a single row by link, or `None` if absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_advertisement(
    pool: &SqlitePool,
    link: &str,
) -> Result<Option<AdvertisementRow>, DbError> {
    let row = sqlx::query_as::<_, AdvertisementRow>(
        "SELECT id, timestamp, title, description, link, price, brand, \
                COALESCE(brand_notified, 0) AS brand_notified \
         FROM advertisements \
         WHERE link = ?",
    )
    .bind(link)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Total number of stored advertisements.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_advertisements(pool: &SqlitePool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM advertisements")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
