//! Idempotent schema setup for the `advertisements` table.

use sqlx::SqlitePool;

use crate::DbError;

const CREATE_ADVERTISEMENTS: &str = "\
CREATE TABLE IF NOT EXISTS advertisements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT,
    title TEXT,
    description TEXT,
    link TEXT UNIQUE,
    price REAL,
    brand TEXT DEFAULT NULL,
    brand_notified INTEGER DEFAULT 0
)";

/// Columns added after the first release, with the DDL that adds them to an
/// older table.
const LATE_COLUMNS: &[(&str, &str)] = &[
    (
        "brand",
        "ALTER TABLE advertisements ADD COLUMN brand TEXT DEFAULT NULL",
    ),
    (
        "brand_notified",
        "ALTER TABLE advertisements ADD COLUMN brand_notified INTEGER DEFAULT 0",
    ),
];

/// Creates the `advertisements` table if absent, then adds any late columns
/// an older database file is missing.
///
/// Safe to run on every start; a second run changes nothing.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any DDL statement fails.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), DbError> {
    sqlx::query(CREATE_ADVERTISEMENTS).execute(pool).await?;

    let existing: Vec<String> =
        sqlx::query_scalar("SELECT name FROM pragma_table_info('advertisements')")
            .fetch_all(pool)
            .await?;

    for (column, ddl) in LATE_COLUMNS {
        if existing.iter().any(|name| name == column) {
            continue;
        }
        sqlx::query(ddl).execute(pool).await?;
        tracing::info!(column, "schema: added missing column to advertisements");
    }

    Ok(())
}
