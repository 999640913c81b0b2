//! Wine import
//!
//! Wine records arrive with a winery name and optional varietal name
//! rather than ids. Batch import resolves every distinct winery and
//! non-empty varietal name once, up front, into lookup tables before
//! any wine row is written, so duplicate names inside one batch can
//! never race into duplicate entities. Tag names are still resolved
//! per wine during the main loop.

use anyhow::{anyhow, Context, Result};
use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::tags::find_or_create_tag;
use crate::db::varietals::{create_bare_varietal, find_varietal_by_name};
use crate::db::wineries::{create_bare_winery, find_winery_by_name};
use crate::db::wines::{create_wine, Wine, WineInput};
use crate::types::{BottleSize, Sweetness, WineStatus, WineType};

/// One wine description from an import file or mutation
#[derive(Debug, Clone, Default, PartialEq, InputObject, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WineImportInput {
    pub name: String,
    pub winery_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub varietal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vintage: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appellation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wine_type: Option<WineType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweetness: Option<Sweetness>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottle_size: Option<BottleSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WineStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_value: Option<Decimal>,
    /// Date string, `YYYY-MM-DD` or RFC 3339
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drink_from: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drink_to: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasting_notes: Option<String>,
    /// Tag names; each resolves to an existing tag or a new bare one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Outcome of one wine import batch; wines are always newly created
#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct WineImportResult {
    pub imported: i64,
    pub errors: Vec<String>,
    pub wines: Vec<Wine>,
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .map_err(|_| anyhow!("unrecognized date: {}", value))
}

impl WineImportInput {
    fn build(&self, winery_id: Uuid, varietal_id: Option<Uuid>, tag_ids: Vec<Uuid>) -> Result<WineInput> {
        let purchase_date = self
            .purchase_date
            .as_deref()
            .map(parse_date)
            .transpose()?;

        Ok(WineInput {
            name: self.name.clone(),
            winery_id,
            varietal_id,
            vintage: self.vintage,
            country: self.country.clone(),
            region: self.region.clone(),
            appellation: self.appellation.clone(),
            wine_type: self.wine_type,
            sweetness: self.sweetness,
            bottle_size: self.bottle_size,
            status: self.status,
            quantity: self.quantity,
            purchase_price: self.purchase_price,
            current_value: self.current_value,
            purchase_date,
            purchase_location: self.purchase_location.clone(),
            location: self.location.clone(),
            bin: self.bin.clone(),
            drink_from: self.drink_from,
            drink_to: self.drink_to,
            rating: self.rating,
            personal_notes: self.personal_notes.clone(),
            tasting_notes: self.tasting_notes.clone(),
            tag_ids: Some(tag_ids),
        })
    }

    fn varietal_name(&self) -> Option<&str> {
        self.varietal_name.as_deref().filter(|n| !n.is_empty())
    }
}

async fn resolve_winery(pool: &SqlitePool, name: &str) -> Result<Uuid> {
    if let Some(existing) = find_winery_by_name(pool, name).await? {
        return Ok(existing.id);
    }
    Ok(create_bare_winery(pool, name).await?.id)
}

async fn resolve_varietal(pool: &SqlitePool, name: &str) -> Result<Uuid> {
    if let Some(existing) = find_varietal_by_name(pool, name).await? {
        return Ok(existing.id);
    }
    Ok(create_bare_varietal(pool, name).await?.id)
}

async fn resolve_tags(pool: &SqlitePool, names: Option<&[String]>) -> Result<Vec<Uuid>> {
    let mut ids = Vec::new();
    for name in names.unwrap_or(&[]) {
        ids.push(find_or_create_tag(pool, name).await?.id);
    }
    Ok(ids)
}

/// Import a single wine, resolving its references by name
pub async fn import_wine(pool: &SqlitePool, input: &WineImportInput) -> Result<Wine> {
    let winery_id = resolve_winery(pool, &input.winery_name)
        .await
        .with_context(|| format!("resolving winery '{}'", input.winery_name))?;
    let varietal_id = match input.varietal_name() {
        Some(name) => Some(
            resolve_varietal(pool, name)
                .await
                .with_context(|| format!("resolving varietal '{}'", name))?,
        ),
        None => None,
    };
    let tag_ids = resolve_tags(pool, input.tags.as_deref()).await?;

    create_wine(pool, &input.build(winery_id, varietal_id, tag_ids)?).await
}

/// Import a batch of wines.
///
/// Distinct winery and varietal names across the whole batch are
/// resolved or created before the per-wine loop; each wine then draws
/// its ids from those tables.
pub async fn import_wines(pool: &SqlitePool, inputs: &[WineImportInput]) -> WineImportResult {
    let mut result = WineImportResult {
        imported: 0,
        errors: Vec::new(),
        wines: Vec::new(),
    };

    let mut wineries: HashMap<String, Uuid> = HashMap::new();
    let mut varietals: HashMap<String, Uuid> = HashMap::new();

    for input in inputs {
        if !wineries.contains_key(&input.winery_name) {
            match resolve_winery(pool, &input.winery_name).await {
                Ok(id) => {
                    wineries.insert(input.winery_name.clone(), id);
                }
                Err(e) => {
                    tracing::warn!("Winery resolution failed for {}: {}", input.winery_name, e);
                }
            }
        }
        if let Some(name) = input.varietal_name() {
            if !varietals.contains_key(name) {
                match resolve_varietal(pool, name).await {
                    Ok(id) => {
                        varietals.insert(name.to_string(), id);
                    }
                    Err(e) => {
                        tracing::warn!("Varietal resolution failed for {}: {}", name, e);
                    }
                }
            }
        }
    }

    for input in inputs {
        match import_resolved(pool, input, &wineries, &varietals).await {
            Ok(wine) => {
                result.imported += 1;
                result.wines.push(wine);
            }
            Err(e) => {
                tracing::warn!("Wine import failed for {}: {}", input.name, e);
                result.errors.push(format!("{}: {}", input.name, e));
            }
        }
    }

    result
}

async fn import_resolved(
    pool: &SqlitePool,
    input: &WineImportInput,
    wineries: &HashMap<String, Uuid>,
    varietals: &HashMap<String, Uuid>,
) -> Result<Wine> {
    let winery_id = *wineries
        .get(&input.winery_name)
        .ok_or_else(|| anyhow!("winery '{}' could not be resolved", input.winery_name))?;
    let varietal_id = match input.varietal_name() {
        Some(name) => Some(
            *varietals
                .get(name)
                .ok_or_else(|| anyhow!("varietal '{}' could not be resolved", name))?,
        ),
        None => None,
    };
    let tag_ids = resolve_tags(pool, input.tags.as_deref()).await?;

    create_wine(pool, &input.build(winery_id, varietal_id, tag_ids)?).await
}
