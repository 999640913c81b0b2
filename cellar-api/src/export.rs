//! Collection export
//!
//! JSON exports reuse the import record shapes, so an exported file
//! feeds straight back into the import engine; entity arrays may be
//! partially present (a wines-only file is legal). CSV covers wines
//! with a fixed column set.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::varietals::{list_varietals, Varietal};
use crate::db::wineries::{list_wineries, Winery};
use crate::db::wines::{list_wines, tags_for_wine, Wine, WineFilter};
use crate::import::{VarietalImportInput, WineImportInput, WineryImportInput};

pub const EXPORT_VERSION: &str = "1.0";

/// Top-level collection file, for export and import alike
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionFile {
    pub export_date: DateTime<Utc>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wineries: Option<Vec<WineryImportInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub varietals: Option<Vec<VarietalImportInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wines: Option<Vec<WineImportInput>>,
}

impl CollectionFile {
    fn new() -> Self {
        CollectionFile {
            export_date: Utc::now(),
            version: EXPORT_VERSION.to_string(),
            wineries: None,
            varietals: None,
            wines: None,
        }
    }
}

fn winery_record(winery: &Winery) -> WineryImportInput {
    WineryImportInput {
        name: winery.name.clone(),
        region: winery.region.clone(),
        country: winery.country.clone(),
        website: winery.website.clone(),
        email: winery.email.clone(),
        phone: winery.phone.clone(),
        founded_year: winery.founded_year,
        logo_url: winery.logo_url.clone(),
    }
}

fn varietal_record(varietal: &Varietal) -> VarietalImportInput {
    VarietalImportInput {
        name: varietal.name.clone(),
        wine_type: varietal.wine_type,
        description: varietal.description.clone(),
        common_regions: Some(varietal.common_regions.clone()),
        characteristics: Some(varietal.characteristics.clone()),
        aliases: Some(varietal.aliases.clone()),
    }
}

fn wine_record(
    wine: &Wine,
    winery_names: &HashMap<Uuid, String>,
    varietal_names: &HashMap<Uuid, String>,
    tags: Vec<String>,
) -> WineImportInput {
    WineImportInput {
        name: wine.name.clone(),
        winery_name: winery_names
            .get(&wine.winery_id)
            .cloned()
            .unwrap_or_default(),
        varietal_name: wine
            .varietal_id
            .and_then(|id| varietal_names.get(&id).cloned()),
        vintage: wine.vintage,
        country: wine.country.clone(),
        region: wine.region.clone(),
        appellation: wine.appellation.clone(),
        wine_type: wine.wine_type,
        sweetness: wine.sweetness,
        bottle_size: Some(wine.bottle_size),
        status: Some(wine.status),
        quantity: Some(wine.quantity),
        purchase_price: wine.purchase_price,
        current_value: wine.current_value,
        purchase_date: wine.purchase_date.map(|d| d.format("%Y-%m-%d").to_string()),
        purchase_location: wine.purchase_location.clone(),
        location: wine.location.clone(),
        bin: wine.bin.clone(),
        drink_from: wine.drink_from,
        drink_to: wine.drink_to,
        rating: wine.rating,
        personal_notes: wine.personal_notes.clone(),
        tasting_notes: wine.tasting_notes.clone(),
        tags: if tags.is_empty() { None } else { Some(tags) },
    }
}

async fn all_wineries(pool: &SqlitePool) -> Result<Vec<Winery>> {
    let mut wineries = Vec::new();
    let mut skip = 0;
    loop {
        let page = list_wineries(pool, None, skip, 500).await?;
        let page_len = page.len() as i64;
        wineries.extend(page);
        if page_len < 500 {
            break;
        }
        skip += 500;
    }
    Ok(wineries)
}

async fn all_wines(pool: &SqlitePool) -> Result<Vec<Wine>> {
    let filter = WineFilter::default();
    let mut wines = Vec::new();
    let mut skip = 0;
    loop {
        let page = list_wines(pool, &filter, skip, 500).await?;
        let page_len = page.len() as i64;
        wines.extend(page);
        if page_len < 500 {
            break;
        }
        skip += 500;
    }
    Ok(wines)
}

async fn wine_records(pool: &SqlitePool) -> Result<Vec<WineImportInput>> {
    let winery_names: HashMap<Uuid, String> = all_wineries(pool)
        .await?
        .into_iter()
        .map(|w| (w.id, w.name))
        .collect();
    let varietal_names: HashMap<Uuid, String> = list_varietals(pool)
        .await?
        .into_iter()
        .map(|v| (v.id, v.name))
        .collect();

    let mut records = Vec::new();
    for wine in all_wines(pool).await? {
        let tags = tags_for_wine(pool, wine.id)
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect();
        records.push(wine_record(&wine, &winery_names, &varietal_names, tags));
    }
    Ok(records)
}

/// Export the full collection as a JSON-ready file
pub async fn export_collection(pool: &SqlitePool) -> Result<CollectionFile> {
    let mut file = CollectionFile::new();
    file.wineries = Some(all_wineries(pool).await?.iter().map(winery_record).collect());
    file.varietals = Some(list_varietals(pool).await?.iter().map(varietal_record).collect());
    file.wines = Some(wine_records(pool).await?);
    Ok(file)
}

/// Export only the wines array
pub async fn export_wines(pool: &SqlitePool) -> Result<CollectionFile> {
    let mut file = CollectionFile::new();
    file.wines = Some(wine_records(pool).await?);
    Ok(file)
}

/// Export only the wineries array
pub async fn export_wineries(pool: &SqlitePool) -> Result<CollectionFile> {
    let mut file = CollectionFile::new();
    file.wineries = Some(all_wineries(pool).await?.iter().map(winery_record).collect());
    Ok(file)
}

/// Export only the varietals array
pub async fn export_varietals(pool: &SqlitePool) -> Result<CollectionFile> {
    let mut file = CollectionFile::new();
    file.varietals = Some(list_varietals(pool).await?.iter().map(varietal_record).collect());
    Ok(file)
}

const CSV_HEADER: &str = "name,winery,varietal,vintage,country,region,appellation,type,\
sweetness,bottleSize,status,quantity,purchasePrice,currentValue,purchaseDate,\
purchaseLocation,location,bin,drinkFrom,drinkTo,rating,personalNotes,tastingNotes,tags";

/// Quote a CSV field when it contains a comma, quote, or newline;
/// internal quotes are doubled
pub fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn opt_str<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// Export all wines as CSV text
pub async fn export_wines_csv(pool: &SqlitePool) -> Result<String> {
    let records = wine_records(pool).await?;

    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for r in records {
        let fields = [
            escape_csv(&r.name),
            escape_csv(&r.winery_name),
            escape_csv(&r.varietal_name.unwrap_or_default()),
            opt_str(&r.vintage),
            escape_csv(&r.country.unwrap_or_default()),
            escape_csv(&r.region.unwrap_or_default()),
            escape_csv(&r.appellation.unwrap_or_default()),
            r.wine_type.map(|t| t.as_str().to_string()).unwrap_or_default(),
            r.sweetness.map(|s| s.as_str().to_string()).unwrap_or_default(),
            r.bottle_size.map(|b| b.as_str().to_string()).unwrap_or_default(),
            r.status.map(|s| s.as_str().to_string()).unwrap_or_default(),
            opt_str(&r.quantity),
            opt_str(&r.purchase_price),
            opt_str(&r.current_value),
            r.purchase_date.unwrap_or_default(),
            escape_csv(&r.purchase_location.unwrap_or_default()),
            escape_csv(&r.location.unwrap_or_default()),
            escape_csv(&r.bin.unwrap_or_default()),
            opt_str(&r.drink_from),
            opt_str(&r.drink_to),
            opt_str(&r.rating),
            escape_csv(&r.personal_notes.unwrap_or_default()),
            escape_csv(&r.tasting_notes.unwrap_or_default()),
            escape_csv(&r.tags.map(|t| t.join(";")).unwrap_or_default()),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::wineries::create_bare_winery;
    use crate::db::wines::{create_wine, WineInput};
    use crate::import::import_collection;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        crate::db::schema::initialize_schema(&pool)
            .await
            .expect("Schema initialization failed");
        pool
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("two\nlines"), "\"two\nlines\"");
    }

    fn parse_csv_line(line: &str) -> Vec<String> {
        // Minimal standard-CSV reader for the round-trip check
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut chars = line.chars().peekable();
        let mut quoted = false;
        while let Some(c) = chars.next() {
            match c {
                '"' if quoted => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        quoted = false;
                    }
                }
                '"' if field.is_empty() => quoted = true,
                ',' if !quoted => fields.push(std::mem::take(&mut field)),
                c => field.push(c),
            }
        }
        fields.push(field);
        fields
    }

    #[tokio::test]
    async fn test_csv_field_with_comma_round_trips() {
        let pool = test_pool().await;
        let winery = create_bare_winery(&pool, "Smith, Son & Co").await.expect("winery");
        create_wine(
            &pool,
            &WineInput {
                name: "Old Vines, Block 3".to_string(),
                winery_id: winery.id,
                ..Default::default()
            },
        )
        .await
        .expect("create");

        let csv = export_wines_csv(&pool).await.expect("csv");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);

        let fields = parse_csv_line(lines[1]);
        assert_eq!(fields[0], "Old Vines, Block 3");
        assert_eq!(fields[1], "Smith, Son & Co");
    }

    #[tokio::test]
    async fn test_export_feeds_back_into_import() {
        let pool = test_pool().await;
        import_collection(
            &pool,
            &[WineryImportInput {
                name: "Quinta do Noval".to_string(),
                country: Some("Portugal".to_string()),
                ..Default::default()
            }],
            &[],
            &[WineImportInput {
                name: "Vintage Port".to_string(),
                winery_name: "Quinta do Noval".to_string(),
                quantity: Some(2),
                tags: Some(vec!["special".to_string()]),
                ..Default::default()
            }],
        )
        .await;

        let file = export_collection(&pool).await.expect("export");
        let json = serde_json::to_string(&file).expect("serialize");
        let parsed: CollectionFile = serde_json::from_str(&json).expect("parse");

        let fresh = test_pool().await;
        let result = import_collection(
            &fresh,
            parsed.wineries.as_deref().unwrap_or(&[]),
            parsed.varietals.as_deref().unwrap_or(&[]),
            parsed.wines.as_deref().unwrap_or(&[]),
        )
        .await;
        assert_eq!(result.wineries.imported, 1);
        assert_eq!(result.wines.imported, 1);
        assert_eq!(result.error_count(), 0);

        let wines = all_wines(&fresh).await.expect("wines");
        assert_eq!(wines[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_export_pages_past_first_500_wineries() {
        let pool = test_pool().await;
        let mut last_id = None;
        for i in 0..501 {
            let winery = create_bare_winery(&pool, &format!("Winery {:03}", i))
                .await
                .expect("winery");
            last_id = Some(winery.id);
        }
        create_wine(
            &pool,
            &WineInput {
                name: "Late Harvest".to_string(),
                winery_id: last_id.expect("id"),
                ..Default::default()
            },
        )
        .await
        .expect("create");

        let file = export_collection(&pool).await.expect("export");
        assert_eq!(file.wineries.as_ref().expect("wineries").len(), 501);

        // The wine's owner sits past the first page and must still resolve
        let wines = file.wines.expect("wines");
        assert_eq!(wines[0].winery_name, "Winery 500");
    }

    #[tokio::test]
    async fn test_partial_file_parses_with_missing_arrays() {
        let json = r#"{"exportDate":"2024-01-01T00:00:00Z","version":"1.0","wines":[]}"#;
        let parsed: CollectionFile = serde_json::from_str(json).expect("parse");
        assert!(parsed.wineries.is_none());
        assert_eq!(parsed.wines.as_deref(), Some(&[][..]));
    }
}
