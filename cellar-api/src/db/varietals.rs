//! Varietal database operations
//!
//! The three list fields (`common_regions`, `characteristics`,
//! `aliases`) are JSON TEXT arrays and never NULL; a varietal created
//! without them gets `[]`.

use anyhow::{anyhow, bail, Result};
use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use crate::db::{list_bind, opt_enum, string_list};
use crate::types::WineType;

/// Varietal record
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Varietal {
    pub id: Uuid,
    pub name: String,
    pub wine_type: Option<WineType>,
    pub description: Option<String>,
    pub common_regions: Vec<String>,
    pub characteristics: Vec<String>,
    pub aliases: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Varietal create input
#[derive(Debug, Clone, Default, InputObject, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarietalInput {
    pub name: String,
    pub wine_type: Option<WineType>,
    pub description: Option<String>,
    pub common_regions: Option<Vec<String>>,
    pub characteristics: Option<Vec<String>>,
    pub aliases: Option<Vec<String>>,
}

/// Varietal partial-update input; absent fields are left unchanged
#[derive(Debug, Clone, Default, InputObject, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarietalPatch {
    pub name: Option<String>,
    pub wine_type: Option<WineType>,
    pub description: Option<String>,
    pub common_regions: Option<Vec<String>>,
    pub characteristics: Option<Vec<String>>,
    pub aliases: Option<Vec<String>>,
}

pub(crate) fn varietal_from_row(row: &SqliteRow) -> Result<Varietal> {
    let id: String = row.get("id");
    Ok(Varietal {
        id: Uuid::parse_str(&id)?,
        name: row.get("name"),
        wine_type: opt_enum(row.get("wine_type"), WineType::parse, "wine type")?,
        description: row.get("description"),
        common_regions: string_list(row.get("common_regions"))?,
        characteristics: string_list(row.get("characteristics"))?,
        aliases: string_list(row.get("aliases"))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const VARIETAL_COLUMNS: &str =
    "id, name, wine_type, description, common_regions, characteristics, aliases, \
     created_at, updated_at";

/// Create a varietal; missing list fields default to empty lists
pub async fn create_varietal(pool: &SqlitePool, input: &VarietalInput) -> Result<Varietal> {
    if input.name.trim().is_empty() {
        bail!("varietal name is required");
    }

    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO varietals (
            id, name, wine_type, description, common_regions, characteristics,
            aliases, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&input.name)
    .bind(input.wine_type.map(|t| t.as_str()))
    .bind(&input.description)
    .bind(list_bind(input.common_regions.as_deref().unwrap_or(&[]))?)
    .bind(list_bind(input.characteristics.as_deref().unwrap_or(&[]))?)
    .bind(list_bind(input.aliases.as_deref().unwrap_or(&[]))?)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    get_varietal(pool, id)
        .await?
        .ok_or_else(|| anyhow!("varietal {} missing after insert", id))
}

/// Create a minimally-populated varietal (name only, empty lists)
pub async fn create_bare_varietal(pool: &SqlitePool, name: &str) -> Result<Varietal> {
    create_varietal(
        pool,
        &VarietalInput {
            name: name.to_string(),
            ..Default::default()
        },
    )
    .await
}

/// Presence-based partial update; absent fields keep their values
pub async fn update_varietal(pool: &SqlitePool, id: Uuid, patch: &VarietalPatch) -> Result<Varietal> {
    if let Some(name) = &patch.name {
        if name.trim().is_empty() {
            bail!("varietal name cannot be empty");
        }
    }

    let result = sqlx::query(
        r#"
        UPDATE varietals SET
            name = COALESCE(?, name),
            wine_type = COALESCE(?, wine_type),
            description = COALESCE(?, description),
            common_regions = COALESCE(?, common_regions),
            characteristics = COALESCE(?, characteristics),
            aliases = COALESCE(?, aliases),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&patch.name)
    .bind(patch.wine_type.map(|t| t.as_str()))
    .bind(&patch.description)
    .bind(patch.common_regions.as_deref().map(list_bind).transpose()?)
    .bind(patch.characteristics.as_deref().map(list_bind).transpose()?)
    .bind(patch.aliases.as_deref().map(list_bind).transpose()?)
    .bind(Utc::now())
    .bind(id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        bail!("varietal {} not found", id);
    }

    get_varietal(pool, id)
        .await?
        .ok_or_else(|| anyhow!("varietal {} missing after update", id))
}

/// Delete a varietal; rejected while any wine references it
pub async fn delete_varietal(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let referenced = reference_count(pool, id).await?;
    if referenced > 0 {
        bail!(
            "cannot delete varietal: {} wine(s) still reference it",
            referenced
        );
    }

    let result = sqlx::query("DELETE FROM varietals WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        bail!("varietal {} not found", id);
    }
    Ok(())
}

/// Load varietal by id
pub async fn get_varietal(pool: &SqlitePool, id: Uuid) -> Result<Option<Varietal>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM varietals WHERE id = ?",
        VARIETAL_COLUMNS
    ))
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(varietal_from_row).transpose()
}

/// Load varietal by exact name
pub async fn find_varietal_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Varietal>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM varietals WHERE name = ?",
        VARIETAL_COLUMNS
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(varietal_from_row).transpose()
}

/// List all varietals ordered by name
pub async fn list_varietals(pool: &SqlitePool) -> Result<Vec<Varietal>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM varietals ORDER BY name",
        VARIETAL_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(varietal_from_row).collect()
}

/// Number of wines referencing a varietal
pub async fn reference_count(pool: &SqlitePool, varietal_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM wines WHERE varietal_id = ?")
        .bind(varietal_id.to_string())
        .fetch_one(pool)
        .await?;
    Ok(count)
}
