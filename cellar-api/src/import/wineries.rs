//! Winery import
//!
//! Natural-key upsert on exact winery name. On update, only fields
//! present in the input overwrite; absent fields keep their stored
//! values.

use async_graphql::{InputObject, SimpleObject};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::wineries::{
    create_winery, find_winery_by_name, update_winery, Winery, WineryInput,
};

/// One winery description from an import file or mutation
#[derive(Debug, Clone, Default, InputObject, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WineryImportInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founded_year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

/// Outcome of one winery import batch
#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct WineryImportResult {
    /// Newly created
    pub imported: i64,
    /// Matched by name and overwritten
    pub updated: i64,
    pub errors: Vec<String>,
    /// Resulting records in input order, successes only
    pub wineries: Vec<Winery>,
}

impl WineryImportInput {
    /// Full-object input for an update, keeping stored values where
    /// the import record is silent
    fn merged_with(&self, existing: &Winery) -> WineryInput {
        WineryInput {
            name: self.name.clone(),
            region: self.region.clone().or_else(|| existing.region.clone()),
            country: self.country.clone().or_else(|| existing.country.clone()),
            website: self.website.clone().or_else(|| existing.website.clone()),
            email: self.email.clone().or_else(|| existing.email.clone()),
            phone: self.phone.clone().or_else(|| existing.phone.clone()),
            founded_year: self.founded_year.or(existing.founded_year),
            logo_url: self.logo_url.clone().or_else(|| existing.logo_url.clone()),
        }
    }

    fn as_create(&self) -> WineryInput {
        WineryInput {
            name: self.name.clone(),
            region: self.region.clone(),
            country: self.country.clone(),
            website: self.website.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            founded_year: self.founded_year,
            logo_url: self.logo_url.clone(),
        }
    }
}

/// Import a batch of wineries, upserting each by exact name
pub async fn import_wineries(pool: &SqlitePool, inputs: &[WineryImportInput]) -> WineryImportResult {
    let mut result = WineryImportResult {
        imported: 0,
        updated: 0,
        errors: Vec::new(),
        wineries: Vec::new(),
    };

    for input in inputs {
        match upsert_winery(pool, input).await {
            Ok((winery, created)) => {
                if created {
                    result.imported += 1;
                } else {
                    result.updated += 1;
                }
                result.wineries.push(winery);
            }
            Err(e) => {
                tracing::warn!("Winery import failed for {}: {}", input.name, e);
                result.errors.push(format!("{}: {}", input.name, e));
            }
        }
    }

    result
}

async fn upsert_winery(
    pool: &SqlitePool,
    input: &WineryImportInput,
) -> anyhow::Result<(Winery, bool)> {
    match find_winery_by_name(pool, &input.name).await? {
        Some(existing) => {
            let winery = update_winery(pool, existing.id, &input.merged_with(&existing)).await?;
            Ok((winery, false))
        }
        None => {
            let winery = create_winery(pool, &input.as_create()).await?;
            Ok((winery, true))
        }
    }
}
