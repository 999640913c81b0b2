//! Cellar location database operations
//!
//! Locations are descriptive metadata only; wines reference them by
//! free-text `location`, not by foreign key.

use anyhow::{anyhow, bail, Result};
use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Physical storage location record
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct CellarLocation {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub temperature_c: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub capacity: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cellar location create/update input (full-object semantics)
#[derive(Debug, Clone, Default, InputObject, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellarLocationInput {
    pub name: String,
    pub description: Option<String>,
    pub temperature_c: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub capacity: Option<i64>,
    pub notes: Option<String>,
}

pub(crate) fn location_from_row(row: &SqliteRow) -> Result<CellarLocation> {
    let id: String = row.get("id");
    Ok(CellarLocation {
        id: Uuid::parse_str(&id)?,
        name: row.get("name"),
        description: row.get("description"),
        temperature_c: row.get("temperature_c"),
        humidity_percent: row.get("humidity_percent"),
        capacity: row.get("capacity"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const LOCATION_COLUMNS: &str =
    "id, name, description, temperature_c, humidity_percent, capacity, notes, \
     created_at, updated_at";

/// Create a cellar location
pub async fn create_location(pool: &SqlitePool, input: &CellarLocationInput) -> Result<CellarLocation> {
    if input.name.trim().is_empty() {
        bail!("location name is required");
    }

    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO cellar_locations (
            id, name, description, temperature_c, humidity_percent, capacity,
            notes, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.temperature_c)
    .bind(input.humidity_percent)
    .bind(input.capacity)
    .bind(&input.notes)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    get_location(pool, id)
        .await?
        .ok_or_else(|| anyhow!("location {} missing after insert", id))
}

/// Replace a cellar location's fields (full-object update)
pub async fn update_location(
    pool: &SqlitePool,
    id: Uuid,
    input: &CellarLocationInput,
) -> Result<CellarLocation> {
    if input.name.trim().is_empty() {
        bail!("location name is required");
    }

    let result = sqlx::query(
        r#"
        UPDATE cellar_locations SET
            name = ?, description = ?, temperature_c = ?, humidity_percent = ?,
            capacity = ?, notes = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.temperature_c)
    .bind(input.humidity_percent)
    .bind(input.capacity)
    .bind(&input.notes)
    .bind(Utc::now())
    .bind(id.to_string())
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        bail!("location {} not found", id);
    }

    get_location(pool, id)
        .await?
        .ok_or_else(|| anyhow!("location {} missing after update", id))
}

/// Delete a cellar location
pub async fn delete_location(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM cellar_locations WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        bail!("location {} not found", id);
    }
    Ok(())
}

/// Load cellar location by id
pub async fn get_location(pool: &SqlitePool, id: Uuid) -> Result<Option<CellarLocation>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM cellar_locations WHERE id = ?",
        LOCATION_COLUMNS
    ))
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(location_from_row).transpose()
}

/// List all cellar locations ordered by name
pub async fn list_locations(pool: &SqlitePool) -> Result<Vec<CellarLocation>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM cellar_locations ORDER BY name",
        LOCATION_COLUMNS
    ))
    .fetch_all(pool)
    .await?;
    rows.iter().map(location_from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        crate::db::schema::initialize_schema(&pool)
            .await
            .expect("Schema initialization failed");
        pool
    }

    #[tokio::test]
    async fn test_create_update_delete_roundtrip() {
        let pool = test_pool().await;

        let location = create_location(
            &pool,
            &CellarLocationInput {
                name: "Basement Rack A".to_string(),
                temperature_c: Some(13.5),
                capacity: Some(48),
                ..Default::default()
            },
        )
        .await
        .expect("create");

        let updated = update_location(
            &pool,
            location.id,
            &CellarLocationInput {
                name: "Basement Rack A".to_string(),
                temperature_c: Some(12.0),
                ..Default::default()
            },
        )
        .await
        .expect("update");
        assert_eq!(updated.temperature_c, Some(12.0));
        // Full-object update clears omitted fields
        assert!(updated.capacity.is_none());

        delete_location(&pool, location.id).await.expect("delete");
        assert!(list_locations(&pool).await.expect("list").is_empty());
    }
}
