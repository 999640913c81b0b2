//! Database access for cellar-api
//!
//! One module per entity, each owning its record struct, SQL, and row
//! mapping. Uuids and timestamps are stored as TEXT; decimals as their
//! canonical string form; string lists as JSON arrays.

pub mod locations;
pub mod photos;
pub mod schema;
pub mod stats;
pub mod tags;
pub mod varietals;
pub mod wineries;
pub mod wines;

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

/// Initialize database connection pool
///
/// Connects to the cellar database in the root folder, creating the
/// file and schema when missing.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    schema::initialize_schema(&pool).await?;

    Ok(pool)
}

/// Parse an optional TEXT enum column
pub(crate) fn opt_enum<T>(
    value: Option<String>,
    parse: fn(&str) -> Option<T>,
    what: &str,
) -> Result<Option<T>> {
    match value {
        Some(s) => parse(&s)
            .map(Some)
            .ok_or_else(|| anyhow!("invalid {}: {}", what, s)),
        None => Ok(None),
    }
}

/// Parse a required TEXT enum column
pub(crate) fn req_enum<T>(value: String, parse: fn(&str) -> Option<T>, what: &str) -> Result<T> {
    parse(&value).ok_or_else(|| anyhow!("invalid {}: {}", what, value))
}

/// Parse an optional decimal column stored as TEXT
pub(crate) fn opt_decimal(value: Option<String>) -> Result<Option<Decimal>> {
    value
        .map(|s| Decimal::from_str(&s).map_err(|e| anyhow!("invalid decimal {}: {}", s, e)))
        .transpose()
}

/// Canonical TEXT form of an optional decimal for binding
pub(crate) fn decimal_bind(value: Option<Decimal>) -> Option<String> {
    value.map(|d| d.to_string())
}

/// Parse a JSON string-array column
pub(crate) fn string_list(value: String) -> Result<Vec<String>> {
    serde_json::from_str(&value).map_err(|e| anyhow!("invalid string list {}: {}", value, e))
}

/// JSON form of a string list for binding
pub(crate) fn list_bind(values: &[String]) -> Result<String> {
    Ok(serde_json::to_string(values)?)
}
