//! Collection statistics
//!
//! Aggregates run in Rust over the non-consumed wines so decimal
//! valuation math stays exact; SQLite never sums the TEXT decimals.

use anyhow::Result;
use async_graphql::SimpleObject;
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;

use crate::db::wines::{list_wines, Wine, WineFilter};
use crate::types::{WineStatus, WineType};

/// Bottle count for one wine type
#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct TypeCount {
    pub wine_type: WineType,
    pub count: i64,
}

/// Bottle count for one country
#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct CountryCount {
    pub country: String,
    pub count: i64,
}

/// Aggregate statistics over all non-consumed wines
#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct WineStats {
    pub total_bottles: i64,
    pub total_value: Decimal,
    pub by_type: Vec<TypeCount>,
    pub by_country: Vec<CountryCount>,
    pub ready_to_drink: i64,
}

/// Compute collection statistics.
///
/// Valuation prefers `current_value` over `purchase_price`, treating
/// both-missing as zero. "Ready to drink" counts wines whose
/// `drink_from` is unset or at most the current calendar year;
/// `drink_to` is deliberately not consulted.
pub async fn wine_stats(pool: &SqlitePool) -> Result<WineStats> {
    let wines = all_unconsumed(pool).await?;
    Ok(compute(&wines, Utc::now().year() as i64))
}

async fn all_unconsumed(pool: &SqlitePool) -> Result<Vec<Wine>> {
    let filter = WineFilter::default();
    let mut wines = Vec::new();
    let mut skip = 0;
    loop {
        let page = list_wines(pool, &filter, skip, 500).await?;
        let page_len = page.len() as i64;
        wines.extend(page.into_iter().filter(|w| w.status != WineStatus::Consumed));
        if page_len < 500 {
            break;
        }
        skip += 500;
    }
    Ok(wines)
}

fn compute(wines: &[Wine], current_year: i64) -> WineStats {
    let mut total_bottles = 0i64;
    let mut total_value = Decimal::ZERO;
    let mut by_type: BTreeMap<String, (WineType, i64)> = BTreeMap::new();
    let mut by_country: BTreeMap<String, i64> = BTreeMap::new();
    let mut ready_to_drink = 0i64;

    for wine in wines {
        total_bottles += wine.quantity;

        let unit = wine
            .current_value
            .or(wine.purchase_price)
            .unwrap_or(Decimal::ZERO);
        total_value += unit * Decimal::from(wine.quantity);

        if let Some(wine_type) = wine.wine_type {
            let entry = by_type
                .entry(wine_type.as_str().to_string())
                .or_insert((wine_type, 0));
            entry.1 += wine.quantity;
        }
        if let Some(country) = &wine.country {
            *by_country.entry(country.clone()).or_insert(0) += wine.quantity;
        }

        if wine.drink_from.map_or(true, |from| from <= current_year) {
            ready_to_drink += 1;
        }
    }

    WineStats {
        total_bottles,
        total_value,
        by_type: by_type
            .into_values()
            .map(|(wine_type, count)| TypeCount { wine_type, count })
            .collect(),
        by_country: by_country
            .into_iter()
            .map(|(country, count)| CountryCount { country, count })
            .collect(),
        ready_to_drink,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::wineries::create_bare_winery;
    use crate::db::wines::{create_wine, update_wine_quantity, WineInput};
    use std::str::FromStr;

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
    async fn test_consumed_wines_are_excluded() {
        let pool = test_pool().await;
        let winery = create_bare_winery(&pool, "W").await.expect("winery");

        create_wine(
            &pool,
            &WineInput {
                name: "Open".to_string(),
                winery_id: winery.id,
                quantity: Some(3),
                ..Default::default()
            },
        )
        .await
        .expect("create");
        create_wine(
            &pool,
            &WineInput {
                name: "Gone".to_string(),
                winery_id: winery.id,
                quantity: Some(5),
                status: Some(WineStatus::Consumed),
                ..Default::default()
            },
        )
        .await
        .expect("create");

        let stats = wine_stats(&pool).await.expect("stats");
        assert_eq!(stats.total_bottles, 3);
    }

    #[tokio::test]
    async fn test_quantity_change_moves_total_by_delta() {
        let pool = test_pool().await;
        let winery = create_bare_winery(&pool, "W").await.expect("winery");
        let wine = create_wine(
            &pool,
            &WineInput {
                name: "Counted".to_string(),
                winery_id: winery.id,
                quantity: Some(4),
                ..Default::default()
            },
        )
        .await
        .expect("create");

        let before = wine_stats(&pool).await.expect("stats").total_bottles;
        update_wine_quantity(&pool, wine.id, 7).await.expect("update");
        let after = wine_stats(&pool).await.expect("stats").total_bottles;
        assert_eq!(after - before, 3);
    }

    #[tokio::test]
    async fn test_value_prefers_current_value_and_multiplies_by_quantity() {
        let pool = test_pool().await;
        let winery = create_bare_winery(&pool, "W").await.expect("winery");

        create_wine(
            &pool,
            &WineInput {
                name: "Appreciated".to_string(),
                winery_id: winery.id,
                quantity: Some(2),
                purchase_price: Some(Decimal::from_str("20.00").unwrap()),
                current_value: Some(Decimal::from_str("35.50").unwrap()),
                ..Default::default()
            },
        )
        .await
        .expect("create");
        create_wine(
            &pool,
            &WineInput {
                name: "Unvalued".to_string(),
                winery_id: winery.id,
                ..Default::default()
            },
        )
        .await
        .expect("create");

        let stats = wine_stats(&pool).await.expect("stats");
        assert_eq!(stats.total_value, Decimal::from_str("71.00").unwrap());
    }

    #[tokio::test]
    async fn test_ready_to_drink_ignores_drink_to() {
        let pool = test_pool().await;
        let winery = create_bare_winery(&pool, "W").await.expect("winery");
        let year = Utc::now().year() as i64;

        // Past its window but still counted ready
        create_wine(
            &pool,
            &WineInput {
                name: "Over the hill".to_string(),
                winery_id: winery.id,
                drink_from: Some(year - 10),
                drink_to: Some(year - 5),
                ..Default::default()
            },
        )
        .await
        .expect("create");
        // Not yet in window
        create_wine(
            &pool,
            &WineInput {
                name: "Too young".to_string(),
                winery_id: winery.id,
                drink_from: Some(year + 3),
                ..Default::default()
            },
        )
        .await
        .expect("create");
        // No window at all
        create_wine(
            &pool,
            &WineInput {
                name: "Whenever".to_string(),
                winery_id: winery.id,
                ..Default::default()
            },
        )
        .await
        .expect("create");

        let stats = wine_stats(&pool).await.expect("stats");
        assert_eq!(stats.ready_to_drink, 2);
    }
}
