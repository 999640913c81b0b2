//! Varietal import
//!
//! Same upsert-by-name policy as winery import. List fields differ:
//! a varietal never stores NULL lists, so an import update always
//! writes the incoming lists (or empty ones), while scalar fields
//! stay presence-based.

use async_graphql::{InputObject, SimpleObject};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::varietals::{
    create_varietal, find_varietal_by_name, update_varietal, Varietal, VarietalInput,
    VarietalPatch,
};
use crate::types::WineType;

/// One varietal description from an import file or mutation
#[derive(Debug, Clone, Default, InputObject, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarietalImportInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wine_type: Option<WineType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_regions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characteristics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,
}

/// Outcome of one varietal import batch
#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct VarietalImportResult {
    pub imported: i64,
    pub updated: i64,
    pub errors: Vec<String>,
    pub varietals: Vec<Varietal>,
}

impl VarietalImportInput {
    fn as_create(&self) -> VarietalInput {
        VarietalInput {
            name: self.name.clone(),
            wine_type: self.wine_type,
            description: self.description.clone(),
            common_regions: Some(self.common_regions.clone().unwrap_or_default()),
            characteristics: Some(self.characteristics.clone().unwrap_or_default()),
            aliases: Some(self.aliases.clone().unwrap_or_default()),
        }
    }

    fn as_patch(&self) -> VarietalPatch {
        VarietalPatch {
            name: Some(self.name.clone()),
            wine_type: self.wine_type,
            description: self.description.clone(),
            common_regions: Some(self.common_regions.clone().unwrap_or_default()),
            characteristics: Some(self.characteristics.clone().unwrap_or_default()),
            aliases: Some(self.aliases.clone().unwrap_or_default()),
        }
    }
}

/// Import a batch of varietals, upserting each by exact name
pub async fn import_varietals(
    pool: &SqlitePool,
    inputs: &[VarietalImportInput],
) -> VarietalImportResult {
    let mut result = VarietalImportResult {
        imported: 0,
        updated: 0,
        errors: Vec::new(),
        varietals: Vec::new(),
    };

    for input in inputs {
        match upsert_varietal(pool, input).await {
            Ok((varietal, created)) => {
                if created {
                    result.imported += 1;
                } else {
                    result.updated += 1;
                }
                result.varietals.push(varietal);
            }
            Err(e) => {
                tracing::warn!("Varietal import failed for {}: {}", input.name, e);
                result.errors.push(format!("{}: {}", input.name, e));
            }
        }
    }

    result
}

async fn upsert_varietal(
    pool: &SqlitePool,
    input: &VarietalImportInput,
) -> anyhow::Result<(Varietal, bool)> {
    match find_varietal_by_name(pool, &input.name).await? {
        Some(existing) => {
            let varietal = update_varietal(pool, existing.id, &input.as_patch()).await?;
            Ok((varietal, false))
        }
        None => {
            let varietal = create_varietal(pool, &input.as_create()).await?;
            Ok((varietal, true))
        }
    }
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
    async fn test_upsert_counts_and_list_defaults() {
        let pool = test_pool().await;

        let first = import_varietals(
            &pool,
            &[VarietalImportInput {
                name: "Chardonnay".to_string(),
                wine_type: Some(WineType::White),
                ..Default::default()
            }],
        )
        .await;
        assert_eq!(first.imported, 1);
        assert!(first.varietals[0].aliases.is_empty());

        let second = import_varietals(
            &pool,
            &[VarietalImportInput {
                name: "Chardonnay".to_string(),
                aliases: Some(vec!["Morillon".to_string()]),
                ..Default::default()
            }],
        )
        .await;
        assert_eq!(second.updated, 1);
        assert_eq!(second.varietals[0].aliases, vec!["Morillon".to_string()]);
        // Scalar absent from the second record is kept
        assert_eq!(second.varietals[0].wine_type, Some(WineType::White));
    }

    #[tokio::test]
    async fn test_update_with_no_lists_clears_them() {
        let pool = test_pool().await;

        import_varietals(
            &pool,
            &[VarietalImportInput {
                name: "Merlot".to_string(),
                common_regions: Some(vec!["Bordeaux".to_string()]),
                ..Default::default()
            }],
        )
        .await;

        let result = import_varietals(
            &pool,
            &[VarietalImportInput {
                name: "Merlot".to_string(),
                ..Default::default()
            }],
        )
        .await;
        assert_eq!(result.updated, 1);
        assert!(result.varietals[0].common_regions.is_empty());
    }
}
