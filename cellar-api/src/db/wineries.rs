//! Winery database operations

use anyhow::{anyhow, bail, Result};
use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Winery record
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[graphql(complex)]
#[serde(rename_all = "camelCase")]
pub struct Winery {
    pub id: Uuid,
    pub name: String,
    pub region: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub founded_year: Option<i64>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Winery create/update input (full-object semantics)
#[derive(Debug, Clone, Default, InputObject, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WineryInput {
    pub name: String,
    pub region: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub founded_year: Option<i64>,
    pub logo_url: Option<String>,
}

pub(crate) fn winery_from_row(row: &SqliteRow) -> Result<Winery> {
    let id: String = row.get("id");
    Ok(Winery {
        id: Uuid::parse_str(&id)?,
        name: row.get("name"),
        region: row.get("region"),
        country: row.get("country"),
        website: row.get("website"),
        email: row.get("email"),
        phone: row.get("phone"),
        founded_year: row.get("founded_year"),
        logo_url: row.get("logo_url"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const WINERY_COLUMNS: &str =
    "id, name, region, country, website, email, phone, founded_year, logo_url, \
     created_at, updated_at";

/// Create a winery with the given fields
pub async fn create_winery(pool: &SqlitePool, input: &WineryInput) -> Result<Winery> {
    if input.name.trim().is_empty() {
        bail!("winery name is required");
    }

    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO wineries (
            id, name, region, country, website, email, phone, founded_year,
            logo_url, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&input.name)
    .bind(&input.region)
    .bind(&input.country)
    .bind(&input.website)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(input.founded_year)
    .bind(&input.logo_url)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    get_winery(pool, id)
        .await?
        .ok_or_else(|| anyhow!("winery {} missing after insert", id))
}

/// Create a minimally-populated winery (name only)
pub async fn create_bare_winery(pool: &SqlitePool, name: &str) -> Result<Winery> {
    create_winery(
        pool,
        &WineryInput {
            name: name.to_string(),
            ..Default::default()
        },
    )
    .await
}

/// Replace a winery's fields (full-object update)
pub async fn update_winery(pool: &SqlitePool, id: Uuid, input: &WineryInput) -> Result<Winery> {
    if input.name.trim().is_empty() {
        bail!("winery name is required");
    }

    let result = sqlx::query(
        r#"
        UPDATE wineries SET
            name = ?, region = ?, country = ?, website = ?, email = ?,
            phone = ?, founded_year = ?, logo_url = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&input.name)
    .bind(&input.region)
    .bind(&input.country)
    .bind(&input.website)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(input.founded_year)
    .bind(&input.logo_url)
    .bind(Utc::now())
    .bind(id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        bail!("winery {} not found", id);
    }

    get_winery(pool, id)
        .await?
        .ok_or_else(|| anyhow!("winery {} missing after update", id))
}

/// Delete a winery; rejected while it still owns wines
pub async fn delete_winery(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let owned = wine_count(pool, id).await?;
    if owned > 0 {
        bail!(
            "cannot delete winery: {} wine(s) still reference it",
            owned
        );
    }

    let result = sqlx::query("DELETE FROM wineries WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        bail!("winery {} not found", id);
    }
    Ok(())
}

/// Load winery by id
pub async fn get_winery(pool: &SqlitePool, id: Uuid) -> Result<Option<Winery>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM wineries WHERE id = ?",
        WINERY_COLUMNS
    ))
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(winery_from_row).transpose()
}

/// Load winery by exact name
pub async fn find_winery_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Winery>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM wineries WHERE name = ?",
        WINERY_COLUMNS
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(winery_from_row).transpose()
}

/// List wineries with optional case-insensitive name search
pub async fn list_wineries(
    pool: &SqlitePool,
    search: Option<&str>,
    skip: i64,
    take: i64,
) -> Result<Vec<Winery>> {
    let skip = skip.max(0);
    let take = take.clamp(1, 500);

    let mut sql = format!("SELECT {} FROM wineries", WINERY_COLUMNS);
    let mut pattern = None;
    if let Some(term) = search {
        sql.push_str(" WHERE LOWER(name) LIKE ?");
        pattern = Some(format!("%{}%", term.to_lowercase()));
    }
    sql.push_str(&format!(" ORDER BY name LIMIT {} OFFSET {}", take, skip));

    let mut query = sqlx::query(&sql);
    if let Some(p) = &pattern {
        query = query.bind(p);
    }

    let rows = query.fetch_all(pool).await?;
    rows.iter().map(winery_from_row).collect()
}

/// Number of wines owned by a winery
pub async fn wine_count(pool: &SqlitePool, winery_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM wines WHERE winery_id = ?")
        .bind(winery_id.to_string())
        .fetch_one(pool)
        .await?;
    Ok(count)
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
    async fn test_create_and_find_by_name() {
        let pool = test_pool().await;

        let winery = create_winery(
            &pool,
            &WineryInput {
                name: "Chateau Margaux".to_string(),
                region: Some("Bordeaux".to_string()),
                country: Some("France".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("create should succeed");

        let found = find_winery_by_name(&pool, "Chateau Margaux")
            .await
            .expect("find should succeed")
            .expect("winery should exist");
        assert_eq!(found.id, winery.id);
        assert_eq!(found.region.as_deref(), Some("Bordeaux"));

        // Exact match only
        assert!(find_winery_by_name(&pool, "chateau margaux")
            .await
            .expect("find should succeed")
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let pool = test_pool().await;
        create_bare_winery(&pool, "Ridge").await.expect("first create");
        assert!(create_bare_winery(&pool, "Ridge").await.is_err());
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let pool = test_pool().await;
        let winery = create_bare_winery(&pool, "Penfolds").await.expect("create");

        let updated = update_winery(
            &pool,
            winery.id,
            &WineryInput {
                name: "Penfolds".to_string(),
                country: Some("Australia".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("update should succeed");

        assert_eq!(updated.country.as_deref(), Some("Australia"));
        // Full-object update: omitted fields are cleared
        assert!(updated.region.is_none());
    }

    #[tokio::test]
    async fn test_list_search_is_case_insensitive_substring() {
        let pool = test_pool().await;
        create_bare_winery(&pool, "Bodega Catena").await.expect("create");
        create_bare_winery(&pool, "Vega Sicilia").await.expect("create");

        let hits = list_wineries(&pool, Some("catena"), 0, 100)
            .await
            .expect("list should succeed");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Bodega Catena");
    }
}
