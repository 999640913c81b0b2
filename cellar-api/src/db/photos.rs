//! Photo database operations
//!
//! At most one photo per wine carries `is_primary = 1`. The primary
//! switch is two sequential writes: unset every photo of the wine,
//! then set the target.

use anyhow::{anyhow, bail, Result};
use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use crate::db::req_enum;
use crate::types::PhotoType;

/// Photo record; `url` is the stored raw URL, resolved to a signed URL
/// at read time when an object key is present.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[graphql(complex)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: Uuid,
    pub wine_id: Uuid,
    pub object_key: Option<String>,
    #[graphql(skip)]
    pub url: String,
    pub photo_type: PhotoType,
    pub caption: Option<String>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

/// Photo create input
#[derive(Debug, Clone, Default, InputObject, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoInput {
    pub wine_id: Uuid,
    pub object_key: Option<String>,
    pub url: String,
    /// Defaults to OTHER
    pub photo_type: Option<PhotoType>,
    pub caption: Option<String>,
    /// Defaults to false
    pub is_primary: Option<bool>,
}

pub(crate) fn photo_from_row(row: &SqliteRow) -> Result<Photo> {
    let id: String = row.get("id");
    let wine_id: String = row.get("wine_id");
    let is_primary: i64 = row.get("is_primary");
    Ok(Photo {
        id: Uuid::parse_str(&id)?,
        wine_id: Uuid::parse_str(&wine_id)?,
        object_key: row.get("object_key"),
        url: row.get("url"),
        photo_type: req_enum(row.get("photo_type"), PhotoType::parse, "photo type")?,
        caption: row.get("caption"),
        is_primary: is_primary != 0,
        created_at: row.get("created_at"),
    })
}

const PHOTO_COLUMNS: &str =
    "id, wine_id, object_key, url, photo_type, caption, is_primary, created_at";

/// Create a photo record
///
/// A photo created with `is_primary = true` demotes any existing
/// primary on the same wine first.
pub async fn create_photo(pool: &SqlitePool, input: &PhotoInput) -> Result<Photo> {
    if input.url.trim().is_empty() {
        bail!("photo url is required");
    }

    let primary = input.is_primary.unwrap_or(false);
    if primary {
        clear_primary(pool, input.wine_id).await?;
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO photos (id, wine_id, object_key, url, photo_type, caption, is_primary, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(input.wine_id.to_string())
    .bind(&input.object_key)
    .bind(&input.url)
    .bind(input.photo_type.unwrap_or(PhotoType::Other).as_str())
    .bind(&input.caption)
    .bind(primary as i64)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    get_photo(pool, id)
        .await?
        .ok_or_else(|| anyhow!("photo {} missing after insert", id))
}

/// Update a photo's type and caption
pub async fn update_photo(
    pool: &SqlitePool,
    id: Uuid,
    photo_type: Option<PhotoType>,
    caption: Option<String>,
) -> Result<Photo> {
    let result = sqlx::query(
        "UPDATE photos SET photo_type = COALESCE(?, photo_type), caption = COALESCE(?, caption) WHERE id = ?",
    )
    .bind(photo_type.map(|t| t.as_str()))
    .bind(&caption)
    .bind(id.to_string())
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        bail!("photo {} not found", id);
    }

    get_photo(pool, id)
        .await?
        .ok_or_else(|| anyhow!("photo {} missing after update", id))
}

/// Delete a photo record; returns its object key for storage cleanup
pub async fn delete_photo(pool: &SqlitePool, id: Uuid) -> Result<Option<String>> {
    let key: Option<Option<String>> =
        sqlx::query_scalar("SELECT object_key FROM photos WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(pool)
            .await?;
    let Some(key) = key else {
        bail!("photo {} not found", id);
    };

    sqlx::query("DELETE FROM photos WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(key)
}

/// Make one photo the wine's primary, demoting all others.
///
/// Two sequential writes; always leaves exactly one primary for the
/// wine afterward.
pub async fn set_primary_photo(pool: &SqlitePool, id: Uuid) -> Result<Photo> {
    let photo = get_photo(pool, id)
        .await?
        .ok_or_else(|| anyhow!("photo {} not found", id))?;

    clear_primary(pool, photo.wine_id).await?;
    sqlx::query("UPDATE photos SET is_primary = 1 WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    get_photo(pool, id)
        .await?
        .ok_or_else(|| anyhow!("photo {} missing after update", id))
}

async fn clear_primary(pool: &SqlitePool, wine_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE photos SET is_primary = 0 WHERE wine_id = ?")
        .bind(wine_id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}

/// Load photo by id
pub async fn get_photo(pool: &SqlitePool, id: Uuid) -> Result<Option<Photo>> {
    let row = sqlx::query(&format!("SELECT {} FROM photos WHERE id = ?", PHOTO_COLUMNS))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(photo_from_row).transpose()
}

/// Photos for a wine, primary first then newest first
pub async fn photos_for_wine(pool: &SqlitePool, wine_id: Uuid) -> Result<Vec<Photo>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM photos WHERE wine_id = ? ORDER BY is_primary DESC, created_at DESC",
        PHOTO_COLUMNS
    ))
    .bind(wine_id.to_string())
    .fetch_all(pool)
    .await?;
    rows.iter().map(photo_from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::wineries::create_bare_winery;
    use crate::db::wines::{create_wine, WineInput};

    async fn test_wine(pool: &SqlitePool) -> Uuid {
        let winery = create_bare_winery(pool, "W").await.expect("winery");
        let wine = create_wine(
            pool,
            &WineInput {
                name: "Test Wine".to_string(),
                winery_id: winery.id,
                ..Default::default()
            },
        )
        .await
        .expect("wine");
        wine.id
    }

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        crate::db::schema::initialize_schema(&pool)
            .await
            .expect("Schema initialization failed");
        pool
    }

    fn photo_input(wine_id: Uuid, url: &str) -> PhotoInput {
        PhotoInput {
            wine_id,
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_set_primary_demotes_previous() {
        let pool = test_pool().await;
        let wine_id = test_wine(&pool).await;

        let mut first = photo_input(wine_id, "http://x/a.jpg");
        first.is_primary = Some(true);
        let a = create_photo(&pool, &first).await.expect("a");
        let b = create_photo(&pool, &photo_input(wine_id, "http://x/b.jpg"))
            .await
            .expect("b");

        set_primary_photo(&pool, b.id).await.expect("set primary");

        let photos = photos_for_wine(&pool, wine_id).await.expect("list");
        let primaries: Vec<_> = photos.iter().filter(|p| p.is_primary).collect();
        assert_eq!(primaries.len(), 1);
        assert_eq!(primaries[0].id, b.id);
        assert!(!get_photo(&pool, a.id).await.expect("get").expect("a").is_primary);
    }

    #[tokio::test]
    async fn test_delete_returns_object_key() {
        let pool = test_pool().await;
        let wine_id = test_wine(&pool).await;

        let mut input = photo_input(wine_id, "http://x/label.jpg");
        input.object_key = Some("photos/abc.jpg".to_string());
        let photo = create_photo(&pool, &input).await.expect("create");

        let key = delete_photo(&pool, photo.id).await.expect("delete");
        assert_eq!(key.as_deref(), Some("photos/abc.jpg"));
        assert!(get_photo(&pool, photo.id).await.expect("get").is_none());
    }
}
