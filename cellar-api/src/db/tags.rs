//! Tag database operations

use anyhow::{anyhow, bail, Result};
use async_graphql::{InputObject, SimpleObject};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Tag record (many-to-many with wines)
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
}

/// Tag create/update input
#[derive(Debug, Clone, Default, InputObject, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagInput {
    pub name: String,
    pub color: Option<String>,
}

pub(crate) fn tag_from_row(row: &SqliteRow) -> Result<Tag> {
    let id: String = row.get("id");
    Ok(Tag {
        id: Uuid::parse_str(&id)?,
        name: row.get("name"),
        color: row.get("color"),
    })
}

/// Create a tag
pub async fn create_tag(pool: &SqlitePool, input: &TagInput) -> Result<Tag> {
    if input.name.trim().is_empty() {
        bail!("tag name is required");
    }

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO tags (id, name, color) VALUES (?, ?, ?)")
        .bind(id.to_string())
        .bind(&input.name)
        .bind(&input.color)
        .execute(pool)
        .await?;

    get_tag(pool, id)
        .await?
        .ok_or_else(|| anyhow!("tag {} missing after insert", id))
}

/// Update a tag
pub async fn update_tag(pool: &SqlitePool, id: Uuid, input: &TagInput) -> Result<Tag> {
    if input.name.trim().is_empty() {
        bail!("tag name is required");
    }

    let result = sqlx::query("UPDATE tags SET name = ?, color = ? WHERE id = ?")
        .bind(&input.name)
        .bind(&input.color)
        .bind(id.to_string())
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        bail!("tag {} not found", id);
    }

    get_tag(pool, id)
        .await?
        .ok_or_else(|| anyhow!("tag {} missing after update", id))
}

/// Delete a tag and its wine associations
pub async fn delete_tag(pool: &SqlitePool, id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM wine_tags WHERE tag_id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    let result = sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        bail!("tag {} not found", id);
    }
    Ok(())
}

/// Load tag by id
pub async fn get_tag(pool: &SqlitePool, id: Uuid) -> Result<Option<Tag>> {
    let row = sqlx::query("SELECT id, name, color FROM tags WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(tag_from_row).transpose()
}

/// Load tag by exact name
pub async fn find_tag_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Tag>> {
    let row = sqlx::query("SELECT id, name, color FROM tags WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(tag_from_row).transpose()
}

/// Resolve a tag by name, creating a bare one (name only) if absent
pub async fn find_or_create_tag(pool: &SqlitePool, name: &str) -> Result<Tag> {
    if let Some(existing) = find_tag_by_name(pool, name).await? {
        return Ok(existing);
    }
    create_tag(
        pool,
        &TagInput {
            name: name.to_string(),
            color: None,
        },
    )
    .await
}

/// List all tags ordered by name
pub async fn list_tags(pool: &SqlitePool) -> Result<Vec<Tag>> {
    let rows = sqlx::query("SELECT id, name, color FROM tags ORDER BY name")
        .fetch_all(pool)
        .await?;
    rows.iter().map(tag_from_row).collect()
}
