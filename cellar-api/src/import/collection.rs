//! Whole-collection import
//!
//! Phases run in a fixed order: wineries, varietals, wines. Wine
//! import creates bare wineries/varietals for unknown names, so the
//! explicit phases must land first for fully-described records to
//! win over bare fallbacks. A phase with errors never stops the
//! phases after it.

use async_graphql::SimpleObject;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::import::varietals::{import_varietals, VarietalImportInput, VarietalImportResult};
use crate::import::wineries::{import_wineries, WineryImportInput, WineryImportResult};
use crate::import::wines::{import_wines, WineImportInput, WineImportResult};

/// Outcome of a whole-collection import, one block per entity kind
#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct CollectionImportResult {
    pub wineries: WineryImportResult,
    pub varietals: VarietalImportResult,
    pub wines: WineImportResult,
}

impl CollectionImportResult {
    pub fn error_count(&self) -> usize {
        self.wineries.errors.len() + self.varietals.errors.len() + self.wines.errors.len()
    }
}

/// Import a full collection: wineries, then varietals, then wines
pub async fn import_collection(
    pool: &SqlitePool,
    wineries: &[WineryImportInput],
    varietals: &[VarietalImportInput],
    wines: &[WineImportInput],
) -> CollectionImportResult {
    let winery_result = import_wineries(pool, wineries).await;
    let varietal_result = import_varietals(pool, varietals).await;
    let wine_result = import_wines(pool, wines).await;

    let result = CollectionImportResult {
        wineries: winery_result,
        varietals: varietal_result,
        wines: wine_result,
    };
    tracing::info!(
        "Collection import: {} wineries, {} varietals, {} wines, {} errors",
        result.wineries.imported + result.wineries.updated,
        result.varietals.imported + result.varietals.updated,
        result.wines.imported,
        result.error_count()
    );
    if result.error_count() > 0 {
        let all: Vec<String> = result
            .wineries
            .errors
            .iter()
            .chain(&result.varietals.errors)
            .chain(&result.wines.errors)
            .cloned()
            .collect();
        for line in summarize_errors(&all, 5) {
            tracing::warn!("Import error: {}", line);
        }
    }
    result
}

/// Cap an error list for display: the first `limit` lines plus a
/// "+N more" suffix
pub fn summarize_errors(errors: &[String], limit: usize) -> Vec<String> {
    if errors.len() <= limit {
        return errors.to_vec();
    }
    let mut lines: Vec<String> = errors[..limit].to_vec();
    lines.push(format!("+{} more", errors.len() - limit));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::varietals::find_varietal_by_name;
    use crate::db::wineries::find_winery_by_name;

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
    async fn test_explicit_records_win_over_bare_fallbacks() {
        let pool = test_pool().await;

        let wineries = vec![WineryImportInput {
            name: "Famille Perrin".to_string(),
            country: Some("France".to_string()),
            ..Default::default()
        }];
        let varietals = vec![VarietalImportInput {
            name: "Grenache".to_string(),
            description: Some("Warm-climate red".to_string()),
            ..Default::default()
        }];
        let wines = vec![WineImportInput {
            name: "Cotes du Rhone".to_string(),
            winery_name: "Famille Perrin".to_string(),
            varietal_name: Some("Grenache".to_string()),
            ..Default::default()
        }];

        let result = import_collection(&pool, &wineries, &varietals, &wines).await;
        assert_eq!(result.wineries.imported, 1);
        assert_eq!(result.varietals.imported, 1);
        assert_eq!(result.wines.imported, 1);
        assert_eq!(result.error_count(), 0);

        // Wine import found the described entities, not bare ones
        let winery = find_winery_by_name(&pool, "Famille Perrin")
            .await
            .expect("find")
            .expect("exists");
        assert_eq!(winery.country.as_deref(), Some("France"));
        let varietal = find_varietal_by_name(&pool, "Grenache")
            .await
            .expect("find")
            .expect("exists");
        assert_eq!(varietal.description.as_deref(), Some("Warm-climate red"));
    }

    #[tokio::test]
    async fn test_phase_errors_do_not_stop_later_phases() {
        let pool = test_pool().await;

        let wineries = vec![WineryImportInput::default()]; // empty name fails
        let wines = vec![WineImportInput {
            name: "Still Imported".to_string(),
            winery_name: "Fallback Cellars".to_string(),
            ..Default::default()
        }];

        let result = import_collection(&pool, &wineries, &[], &wines).await;
        assert_eq!(result.wineries.errors.len(), 1);
        assert_eq!(result.wines.imported, 1);
    }

    #[test]
    fn test_summarize_errors_caps_with_suffix() {
        let errors: Vec<String> = (0..8).map(|i| format!("e{}", i)).collect();
        let summary = summarize_errors(&errors, 5);
        assert_eq!(summary.len(), 6);
        assert_eq!(summary[5], "+3 more");

        let short = summarize_errors(&errors[..2], 5);
        assert_eq!(short.len(), 2);
    }
}
