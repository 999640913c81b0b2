//! Wine database operations
//!
//! Wines reference exactly one winery, optionally one varietal, and
//! carry a many-to-many tag set maintained through `wine_tags`.

use anyhow::{anyhow, bail, Result};
use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use crate::db::{decimal_bind, opt_decimal, opt_enum, req_enum};
use crate::db::tags::{tag_from_row, Tag};
use crate::types::{BottleSize, Sweetness, WineStatus, WineType};

/// Wine record
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[graphql(complex)]
#[serde(rename_all = "camelCase")]
pub struct Wine {
    pub id: Uuid,
    pub name: String,
    pub winery_id: Uuid,
    pub varietal_id: Option<Uuid>,
    pub vintage: Option<i64>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub appellation: Option<String>,
    pub wine_type: Option<WineType>,
    pub sweetness: Option<Sweetness>,
    pub bottle_size: BottleSize,
    pub status: WineStatus,
    pub quantity: i64,
    pub purchase_price: Option<Decimal>,
    pub current_value: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_location: Option<String>,
    pub location: Option<String>,
    pub bin: Option<String>,
    pub drink_from: Option<i64>,
    pub drink_to: Option<i64>,
    pub rating: Option<i64>,
    pub personal_notes: Option<String>,
    pub tasting_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wine create/update input (full-object semantics)
///
/// `tag_ids`, when present, replaces the wine's tag association set;
/// when absent the association set is left unchanged.
#[derive(Debug, Clone, Default, InputObject, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WineInput {
    pub name: String,
    pub winery_id: Uuid,
    pub varietal_id: Option<Uuid>,
    pub vintage: Option<i64>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub appellation: Option<String>,
    pub wine_type: Option<WineType>,
    pub sweetness: Option<Sweetness>,
    /// Defaults to STANDARD
    pub bottle_size: Option<BottleSize>,
    /// Defaults to IN_CELLAR
    pub status: Option<WineStatus>,
    /// Defaults to 1; must be >= 0
    pub quantity: Option<i64>,
    pub purchase_price: Option<Decimal>,
    pub current_value: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_location: Option<String>,
    pub location: Option<String>,
    pub bin: Option<String>,
    pub drink_from: Option<i64>,
    pub drink_to: Option<i64>,
    pub rating: Option<i64>,
    pub personal_notes: Option<String>,
    pub tasting_notes: Option<String>,
    pub tag_ids: Option<Vec<Uuid>>,
}

/// List filter; enum and foreign-key filters match exactly, free-text
/// filters match case-insensitive substrings, `search` matches wine
/// name OR winery name OR varietal name.
#[derive(Debug, Clone, Default, InputObject, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WineFilter {
    pub search: Option<String>,
    pub name: Option<String>,
    pub winery_id: Option<Uuid>,
    pub varietal_id: Option<Uuid>,
    pub wine_type: Option<WineType>,
    pub status: Option<WineStatus>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub location: Option<String>,
}

pub(crate) fn wine_from_row(row: &SqliteRow) -> Result<Wine> {
    let id: String = row.get("id");
    let winery_id: String = row.get("winery_id");
    let varietal_id: Option<String> = row.get("varietal_id");

    Ok(Wine {
        id: Uuid::parse_str(&id)?,
        name: row.get("name"),
        winery_id: Uuid::parse_str(&winery_id)?,
        varietal_id: varietal_id.as_deref().map(Uuid::parse_str).transpose()?,
        vintage: row.get("vintage"),
        country: row.get("country"),
        region: row.get("region"),
        appellation: row.get("appellation"),
        wine_type: opt_enum(row.get("wine_type"), WineType::parse, "wine type")?,
        sweetness: opt_enum(row.get("sweetness"), Sweetness::parse, "sweetness")?,
        bottle_size: req_enum(row.get("bottle_size"), BottleSize::parse, "bottle size")?,
        status: req_enum(row.get("status"), WineStatus::parse, "wine status")?,
        quantity: row.get("quantity"),
        purchase_price: opt_decimal(row.get("purchase_price"))?,
        current_value: opt_decimal(row.get("current_value"))?,
        purchase_date: row.get("purchase_date"),
        purchase_location: row.get("purchase_location"),
        location: row.get("location"),
        bin: row.get("bin"),
        drink_from: row.get("drink_from"),
        drink_to: row.get("drink_to"),
        rating: row.get("rating"),
        personal_notes: row.get("personal_notes"),
        tasting_notes: row.get("tasting_notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const WINE_COLUMNS: &str =
    "w.id, w.name, w.winery_id, w.varietal_id, w.vintage, w.country, w.region, \
     w.appellation, w.wine_type, w.sweetness, w.bottle_size, w.status, w.quantity, \
     w.purchase_price, w.current_value, w.purchase_date, w.purchase_location, \
     w.location, w.bin, w.drink_from, w.drink_to, w.rating, w.personal_notes, \
     w.tasting_notes, w.created_at, w.updated_at";

/// Create a wine; applies defaults for quantity, bottle size and status
pub async fn create_wine(pool: &SqlitePool, input: &WineInput) -> Result<Wine> {
    validate_input(input)?;

    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO wines (
            id, name, winery_id, varietal_id, vintage, country, region,
            appellation, wine_type, sweetness, bottle_size, status, quantity,
            purchase_price, current_value, purchase_date, purchase_location,
            location, bin, drink_from, drink_to, rating, personal_notes,
            tasting_notes, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&input.name)
    .bind(input.winery_id.to_string())
    .bind(input.varietal_id.map(|v| v.to_string()))
    .bind(input.vintage)
    .bind(&input.country)
    .bind(&input.region)
    .bind(&input.appellation)
    .bind(input.wine_type.map(|t| t.as_str()))
    .bind(input.sweetness.map(|s| s.as_str()))
    .bind(input.bottle_size.unwrap_or(BottleSize::Standard).as_str())
    .bind(input.status.unwrap_or(WineStatus::InCellar).as_str())
    .bind(input.quantity.unwrap_or(1))
    .bind(decimal_bind(input.purchase_price))
    .bind(decimal_bind(input.current_value))
    .bind(input.purchase_date)
    .bind(&input.purchase_location)
    .bind(&input.location)
    .bind(&input.bin)
    .bind(input.drink_from)
    .bind(input.drink_to)
    .bind(input.rating)
    .bind(&input.personal_notes)
    .bind(&input.tasting_notes)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    if let Some(tag_ids) = &input.tag_ids {
        set_wine_tags(pool, id, tag_ids).await?;
    }

    get_wine(pool, id)
        .await?
        .ok_or_else(|| anyhow!("wine {} missing after insert", id))
}

/// Replace a wine's fields (full-object update)
pub async fn update_wine(pool: &SqlitePool, id: Uuid, input: &WineInput) -> Result<Wine> {
    validate_input(input)?;

    let result = sqlx::query(
        r#"
        UPDATE wines SET
            name = ?, winery_id = ?, varietal_id = ?, vintage = ?, country = ?,
            region = ?, appellation = ?, wine_type = ?, sweetness = ?,
            bottle_size = ?, status = ?, quantity = ?, purchase_price = ?,
            current_value = ?, purchase_date = ?, purchase_location = ?,
            location = ?, bin = ?, drink_from = ?, drink_to = ?, rating = ?,
            personal_notes = ?, tasting_notes = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&input.name)
    .bind(input.winery_id.to_string())
    .bind(input.varietal_id.map(|v| v.to_string()))
    .bind(input.vintage)
    .bind(&input.country)
    .bind(&input.region)
    .bind(&input.appellation)
    .bind(input.wine_type.map(|t| t.as_str()))
    .bind(input.sweetness.map(|s| s.as_str()))
    .bind(input.bottle_size.unwrap_or(BottleSize::Standard).as_str())
    .bind(input.status.unwrap_or(WineStatus::InCellar).as_str())
    .bind(input.quantity.unwrap_or(1))
    .bind(decimal_bind(input.purchase_price))
    .bind(decimal_bind(input.current_value))
    .bind(input.purchase_date)
    .bind(&input.purchase_location)
    .bind(&input.location)
    .bind(&input.bin)
    .bind(input.drink_from)
    .bind(input.drink_to)
    .bind(input.rating)
    .bind(&input.personal_notes)
    .bind(&input.tasting_notes)
    .bind(Utc::now())
    .bind(id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        bail!("wine {} not found", id);
    }

    if let Some(tag_ids) = &input.tag_ids {
        set_wine_tags(pool, id, tag_ids).await?;
    }

    get_wine(pool, id)
        .await?
        .ok_or_else(|| anyhow!("wine {} missing after update", id))
}

/// Set a wine's quantity; must be >= 0
pub async fn update_wine_quantity(pool: &SqlitePool, id: Uuid, quantity: i64) -> Result<Wine> {
    if quantity < 0 {
        bail!("quantity must be >= 0");
    }

    let result = sqlx::query("UPDATE wines SET quantity = ?, updated_at = ? WHERE id = ?")
        .bind(quantity)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        bail!("wine {} not found", id);
    }

    get_wine(pool, id)
        .await?
        .ok_or_else(|| anyhow!("wine {} missing after update", id))
}

/// Delete a wine with its tag associations and photo records.
///
/// Returns the stored-object keys of deleted photos; the caller is
/// responsible for best-effort object cleanup.
pub async fn delete_wine(pool: &SqlitePool, id: Uuid) -> Result<Vec<String>> {
    let keys: Vec<Option<String>> =
        sqlx::query_scalar("SELECT object_key FROM photos WHERE wine_id = ?")
            .bind(id.to_string())
            .fetch_all(pool)
            .await?;

    sqlx::query("DELETE FROM photos WHERE wine_id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM wine_tags WHERE wine_id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    let result = sqlx::query("DELETE FROM wines WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        bail!("wine {} not found", id);
    }

    Ok(keys.into_iter().flatten().collect())
}

/// Load wine by id
pub async fn get_wine(pool: &SqlitePool, id: Uuid) -> Result<Option<Wine>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM wines w WHERE w.id = ?",
        WINE_COLUMNS
    ))
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(wine_from_row).transpose()
}

/// List wines matching a filter, with skip/take pagination
pub async fn list_wines(
    pool: &SqlitePool,
    filter: &WineFilter,
    skip: i64,
    take: i64,
) -> Result<Vec<Wine>> {
    let skip = skip.max(0);
    let take = take.clamp(1, 500);

    let mut sql = format!(
        "SELECT {} FROM wines w \
         LEFT JOIN wineries wr ON wr.id = w.winery_id \
         LEFT JOIN varietals v ON v.id = w.varietal_id \
         WHERE 1=1",
        WINE_COLUMNS
    );
    let mut binds: Vec<String> = Vec::new();

    if let Some(term) = &filter.search {
        sql.push_str(
            " AND (LOWER(w.name) LIKE ? OR LOWER(wr.name) LIKE ? OR LOWER(v.name) LIKE ?)",
        );
        let pattern = format!("%{}%", term.to_lowercase());
        binds.push(pattern.clone());
        binds.push(pattern.clone());
        binds.push(pattern);
    }
    if let Some(name) = &filter.name {
        sql.push_str(" AND LOWER(w.name) LIKE ?");
        binds.push(format!("%{}%", name.to_lowercase()));
    }
    if let Some(winery_id) = filter.winery_id {
        sql.push_str(" AND w.winery_id = ?");
        binds.push(winery_id.to_string());
    }
    if let Some(varietal_id) = filter.varietal_id {
        sql.push_str(" AND w.varietal_id = ?");
        binds.push(varietal_id.to_string());
    }
    if let Some(wine_type) = filter.wine_type {
        sql.push_str(" AND w.wine_type = ?");
        binds.push(wine_type.as_str().to_string());
    }
    if let Some(status) = filter.status {
        sql.push_str(" AND w.status = ?");
        binds.push(status.as_str().to_string());
    }
    if let Some(country) = &filter.country {
        sql.push_str(" AND LOWER(w.country) LIKE ?");
        binds.push(format!("%{}%", country.to_lowercase()));
    }
    if let Some(region) = &filter.region {
        sql.push_str(" AND LOWER(w.region) LIKE ?");
        binds.push(format!("%{}%", region.to_lowercase()));
    }
    if let Some(location) = &filter.location {
        sql.push_str(" AND LOWER(w.location) LIKE ?");
        binds.push(format!("%{}%", location.to_lowercase()));
    }

    // w.id as the final sort key keeps skip/take pages stable when
    // wines share a name and vintage
    sql.push_str(&format!(
        " ORDER BY w.name, w.vintage, w.id LIMIT {} OFFSET {}",
        take, skip
    ));

    let mut query = sqlx::query(&sql);
    for bind in &binds {
        query = query.bind(bind);
    }

    let rows = query.fetch_all(pool).await?;
    rows.iter().map(wine_from_row).collect()
}

/// Tags attached to a wine, ordered by name
pub async fn tags_for_wine(pool: &SqlitePool, wine_id: Uuid) -> Result<Vec<Tag>> {
    let rows = sqlx::query(
        r#"
        SELECT t.id, t.name, t.color
        FROM tags t
        JOIN wine_tags wt ON wt.tag_id = t.id
        WHERE wt.wine_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(wine_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(tag_from_row).collect()
}

/// Replace a wine's tag association set
pub async fn set_wine_tags(pool: &SqlitePool, wine_id: Uuid, tag_ids: &[Uuid]) -> Result<()> {
    sqlx::query("DELETE FROM wine_tags WHERE wine_id = ?")
        .bind(wine_id.to_string())
        .execute(pool)
        .await?;

    for tag_id in tag_ids {
        sqlx::query("INSERT OR IGNORE INTO wine_tags (wine_id, tag_id) VALUES (?, ?)")
            .bind(wine_id.to_string())
            .bind(tag_id.to_string())
            .execute(pool)
            .await?;
    }

    Ok(())
}

fn validate_input(input: &WineInput) -> Result<()> {
    if input.name.trim().is_empty() {
        bail!("wine name is required");
    }
    if let Some(quantity) = input.quantity {
        if quantity < 0 {
            bail!("quantity must be >= 0");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tags::find_or_create_tag;
    use crate::db::varietals::create_bare_varietal;
    use crate::db::wineries::create_bare_winery;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        crate::db::schema::initialize_schema(&pool)
            .await
            .expect("Schema initialization failed");
        pool
    }

    fn input(name: &str, winery_id: Uuid) -> WineInput {
        WineInput {
            name: name.to_string(),
            winery_id,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let pool = test_pool().await;
        let winery = create_bare_winery(&pool, "W").await.expect("winery");

        let wine = create_wine(&pool, &input("House Red", winery.id))
            .await
            .expect("create");

        assert_eq!(wine.quantity, 1);
        assert_eq!(wine.bottle_size, BottleSize::Standard);
        assert_eq!(wine.status, WineStatus::InCellar);
        assert!(wine.varietal_id.is_none());
    }

    #[tokio::test]
    async fn test_negative_quantity_rejected() {
        let pool = test_pool().await;
        let winery = create_bare_winery(&pool, "W").await.expect("winery");

        let mut bad = input("Broken", winery.id);
        bad.quantity = Some(-2);
        assert!(create_wine(&pool, &bad).await.is_err());
    }

    #[tokio::test]
    async fn test_tag_set_replacement() {
        let pool = test_pool().await;
        let winery = create_bare_winery(&pool, "W").await.expect("winery");
        let a = find_or_create_tag(&pool, "a").await.expect("tag a");
        let b = find_or_create_tag(&pool, "b").await.expect("tag b");

        let mut create = input("Tagged", winery.id);
        create.tag_ids = Some(vec![a.id]);
        let wine = create_wine(&pool, &create).await.expect("create");

        let tags = tags_for_wine(&pool, wine.id).await.expect("tags");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "a");

        let mut update = input("Tagged", winery.id);
        update.tag_ids = Some(vec![b.id]);
        update_wine(&pool, wine.id, &update).await.expect("update");

        let tags = tags_for_wine(&pool, wine.id).await.expect("tags");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "b");
    }

    #[tokio::test]
    async fn test_filter_by_search_matches_winery_and_varietal_names() {
        let pool = test_pool().await;
        let winery = create_bare_winery(&pool, "Domaine Leroy").await.expect("winery");
        let other = create_bare_winery(&pool, "Other").await.expect("winery");
        let varietal = create_bare_varietal(&pool, "Pinot Noir").await.expect("varietal");

        let mut first = input("Musigny", winery.id);
        first.varietal_id = Some(varietal.id);
        create_wine(&pool, &first).await.expect("create");
        create_wine(&pool, &input("Zinfandel Blend", other.id))
            .await
            .expect("create");

        let filter = WineFilter {
            search: Some("leroy".to_string()),
            ..Default::default()
        };
        let hits = list_wines(&pool, &filter, 0, 100).await.expect("list");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Musigny");

        let filter = WineFilter {
            search: Some("pinot".to_string()),
            ..Default::default()
        };
        let hits = list_wines(&pool, &filter, 0, 100).await.expect("list");
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_winery_delete_protection() {
        let pool = test_pool().await;
        let winery = create_bare_winery(&pool, "Owned").await.expect("winery");
        let wine = create_wine(&pool, &input("Bottle", winery.id))
            .await
            .expect("create");

        // Winery with wines cannot be deleted and nothing changes
        assert!(crate::db::wineries::delete_winery(&pool, winery.id)
            .await
            .is_err());
        assert!(crate::db::wineries::get_winery(&pool, winery.id)
            .await
            .expect("get")
            .is_some());
        assert!(get_wine(&pool, wine.id).await.expect("get").is_some());

        // After the wine goes away the winery can be deleted
        delete_wine(&pool, wine.id).await.expect("delete wine");
        crate::db::wineries::delete_winery(&pool, winery.id)
            .await
            .expect("delete winery");
    }

    #[tokio::test]
    async fn test_varietal_delete_protection() {
        let pool = test_pool().await;
        let winery = create_bare_winery(&pool, "W").await.expect("winery");
        let varietal = create_bare_varietal(&pool, "Nebbiolo").await.expect("varietal");

        let mut referencing = input("Barolo", winery.id);
        referencing.varietal_id = Some(varietal.id);
        let wine = create_wine(&pool, &referencing).await.expect("create");

        assert!(crate::db::varietals::delete_varietal(&pool, varietal.id)
            .await
            .is_err());

        delete_wine(&pool, wine.id).await.expect("delete wine");
        crate::db::varietals::delete_varietal(&pool, varietal.id)
            .await
            .expect("delete varietal");
    }

    #[tokio::test]
    async fn test_pagination_stable_for_identical_name_and_vintage() {
        let pool = test_pool().await;
        let winery = create_bare_winery(&pool, "W").await.expect("winery");

        let mut created = std::collections::HashSet::new();
        for _ in 0..3 {
            let mut wine = input("House Red", winery.id);
            wine.vintage = Some(2019);
            let wine = create_wine(&pool, &wine).await.expect("create");
            created.insert(wine.id);
        }

        let filter = WineFilter::default();
        let mut seen = std::collections::HashSet::new();
        for wine in list_wines(&pool, &filter, 0, 2).await.expect("page 1") {
            seen.insert(wine.id);
        }
        for wine in list_wines(&pool, &filter, 2, 2).await.expect("page 2") {
            seen.insert(wine.id);
        }
        assert_eq!(seen, created);
    }
}
