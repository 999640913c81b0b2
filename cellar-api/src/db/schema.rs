//! Database schema initialization
//!
//! Idempotent `CREATE TABLE IF NOT EXISTS` statements run on startup.
//! There is no migration tooling; additive changes extend these
//! statements.

use anyhow::Result;
use sqlx::SqlitePool;

/// Create all cellar tables and indexes if they don't exist
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS wineries (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            region TEXT,
            country TEXT,
            website TEXT,
            email TEXT,
            phone TEXT,
            founded_year INTEGER,
            logo_url TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS varietals (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            wine_type TEXT,
            description TEXT,
            common_regions TEXT NOT NULL DEFAULT '[]',
            characteristics TEXT NOT NULL DEFAULT '[]',
            aliases TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS wines (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            winery_id TEXT NOT NULL REFERENCES wineries(id),
            varietal_id TEXT REFERENCES varietals(id),
            vintage INTEGER,
            country TEXT,
            region TEXT,
            appellation TEXT,
            wine_type TEXT,
            sweetness TEXT,
            bottle_size TEXT NOT NULL DEFAULT 'STANDARD',
            status TEXT NOT NULL DEFAULT 'IN_CELLAR',
            quantity INTEGER NOT NULL DEFAULT 1,
            purchase_price TEXT,
            current_value TEXT,
            purchase_date TEXT,
            purchase_location TEXT,
            location TEXT,
            bin TEXT,
            drink_from INTEGER,
            drink_to INTEGER,
            rating INTEGER,
            personal_notes TEXT,
            tasting_notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            color TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS wine_tags (
            wine_id TEXT NOT NULL REFERENCES wines(id),
            tag_id TEXT NOT NULL REFERENCES tags(id),
            PRIMARY KEY (wine_id, tag_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS photos (
            id TEXT PRIMARY KEY,
            wine_id TEXT NOT NULL REFERENCES wines(id),
            object_key TEXT,
            url TEXT NOT NULL,
            photo_type TEXT NOT NULL DEFAULT 'OTHER',
            caption TEXT,
            is_primary INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cellar_locations (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            temperature_c REAL,
            humidity_percent REAL,
            capacity INTEGER,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_wines_winery ON wines(winery_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_wines_varietal ON wines(varietal_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_wines_status ON wines(status)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_photos_wine ON photos(wine_id)")
        .execute(pool)
        .await?;

    tracing::info!("Database schema initialized");

    Ok(())
}
