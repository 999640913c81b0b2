//! Mutation root
//!
//! Mutations call the db layer, emit change events, and run the
//! best-effort storage cleanup that cascades from wine/photo deletes.

use async_graphql::{Context, Object, Result};
use cellar_common::events::CellarEvent;
use chrono::Utc;
use uuid::Uuid;

use crate::db::locations::{
    create_location, delete_location, update_location, CellarLocation, CellarLocationInput,
};
use crate::db::photos::{
    create_photo, delete_photo, set_primary_photo, update_photo, Photo, PhotoInput,
};
use crate::db::tags::{create_tag, delete_tag, update_tag, Tag, TagInput};
use crate::db::varietals::{
    create_varietal, delete_varietal, update_varietal, Varietal, VarietalInput, VarietalPatch,
};
use crate::db::wineries::{create_winery, delete_winery, update_winery, Winery, WineryInput};
use crate::db::wines::{
    create_wine, delete_wine, update_wine, update_wine_quantity, Wine, WineInput,
};
use crate::import::{
    import_collection, import_varietals, import_wine, import_wineries, import_wines,
    CollectionImportResult, VarietalImportInput, VarietalImportResult, WineImportInput,
    WineImportResult, WineryImportInput, WineryImportResult,
};
use crate::storage::delete_object_best_effort;
use crate::types::PhotoType;
use crate::AppState;

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    // --- Wine ---

    async fn create_wine(&self, ctx: &Context<'_>, input: WineInput) -> Result<Wine> {
        let state = ctx.data::<AppState>()?;
        let wine = create_wine(&state.db, &input).await?;
        state.event_bus.emit_lossy(CellarEvent::WineCreated {
            wine_id: wine.id,
            timestamp: Utc::now(),
        });
        Ok(wine)
    }

    async fn update_wine(&self, ctx: &Context<'_>, id: Uuid, input: WineInput) -> Result<Wine> {
        let state = ctx.data::<AppState>()?;
        let wine = update_wine(&state.db, id, &input).await?;
        state.event_bus.emit_lossy(CellarEvent::WineUpdated {
            wine_id: id,
            timestamp: Utc::now(),
        });
        Ok(wine)
    }

    async fn update_wine_quantity(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        quantity: i64,
    ) -> Result<Wine> {
        let state = ctx.data::<AppState>()?;
        let wine = update_wine_quantity(&state.db, id, quantity).await?;
        state.event_bus.emit_lossy(CellarEvent::WineUpdated {
            wine_id: id,
            timestamp: Utc::now(),
        });
        Ok(wine)
    }

    /// Delete a wine; its stored photo objects are cleaned up
    /// best-effort after the records are gone
    async fn delete_wine(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let keys = delete_wine(&state.db, id).await?;
        for key in &keys {
            delete_object_best_effort(state.store.as_ref(), key).await;
        }
        state.event_bus.emit_lossy(CellarEvent::WineDeleted {
            wine_id: id,
            timestamp: Utc::now(),
        });
        Ok(true)
    }

    // --- Winery ---

    async fn create_winery(&self, ctx: &Context<'_>, input: WineryInput) -> Result<Winery> {
        let state = ctx.data::<AppState>()?;
        Ok(create_winery(&state.db, &input).await?)
    }

    async fn update_winery(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: WineryInput,
    ) -> Result<Winery> {
        let state = ctx.data::<AppState>()?;
        Ok(update_winery(&state.db, id, &input).await?)
    }

    /// Fails while the winery still owns wines
    async fn delete_winery(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        delete_winery(&state.db, id).await?;
        Ok(true)
    }

    // --- Varietal ---

    async fn create_varietal(&self, ctx: &Context<'_>, input: VarietalInput) -> Result<Varietal> {
        let state = ctx.data::<AppState>()?;
        Ok(create_varietal(&state.db, &input).await?)
    }

    /// Presence-based partial update
    async fn update_varietal(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: VarietalPatch,
    ) -> Result<Varietal> {
        let state = ctx.data::<AppState>()?;
        Ok(update_varietal(&state.db, id, &input).await?)
    }

    /// Fails while any wine references the varietal
    async fn delete_varietal(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        delete_varietal(&state.db, id).await?;
        Ok(true)
    }

    // --- Tag ---

    async fn create_tag(&self, ctx: &Context<'_>, input: TagInput) -> Result<Tag> {
        let state = ctx.data::<AppState>()?;
        Ok(create_tag(&state.db, &input).await?)
    }

    async fn update_tag(&self, ctx: &Context<'_>, id: Uuid, input: TagInput) -> Result<Tag> {
        let state = ctx.data::<AppState>()?;
        Ok(update_tag(&state.db, id, &input).await?)
    }

    async fn delete_tag(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        delete_tag(&state.db, id).await?;
        Ok(true)
    }

    // --- Photo ---

    async fn create_photo(&self, ctx: &Context<'_>, input: PhotoInput) -> Result<Photo> {
        let state = ctx.data::<AppState>()?;
        Ok(create_photo(&state.db, &input).await?)
    }

    async fn update_photo(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        photo_type: Option<PhotoType>,
        caption: Option<String>,
    ) -> Result<Photo> {
        let state = ctx.data::<AppState>()?;
        Ok(update_photo(&state.db, id, photo_type, caption).await?)
    }

    /// Delete a photo; its stored object is cleaned up best-effort
    async fn delete_photo(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        if let Some(key) = delete_photo(&state.db, id).await? {
            delete_object_best_effort(state.store.as_ref(), &key).await;
        }
        Ok(true)
    }

    /// Make one photo the wine's primary, demoting all others
    async fn set_primary_photo(&self, ctx: &Context<'_>, id: Uuid) -> Result<Photo> {
        let state = ctx.data::<AppState>()?;
        let photo = set_primary_photo(&state.db, id).await?;
        state.event_bus.emit_lossy(CellarEvent::PrimaryPhotoChanged {
            wine_id: photo.wine_id,
            photo_id: photo.id,
            timestamp: Utc::now(),
        });
        Ok(photo)
    }

    // --- Cellar location ---

    async fn create_cellar_location(
        &self,
        ctx: &Context<'_>,
        input: CellarLocationInput,
    ) -> Result<CellarLocation> {
        let state = ctx.data::<AppState>()?;
        Ok(create_location(&state.db, &input).await?)
    }

    async fn update_cellar_location(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: CellarLocationInput,
    ) -> Result<CellarLocation> {
        let state = ctx.data::<AppState>()?;
        Ok(update_location(&state.db, id, &input).await?)
    }

    async fn delete_cellar_location(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        delete_location(&state.db, id).await?;
        Ok(true)
    }

    // --- Import ---

    async fn import_wineries(
        &self,
        ctx: &Context<'_>,
        wineries: Vec<WineryImportInput>,
    ) -> Result<WineryImportResult> {
        let state = ctx.data::<AppState>()?;
        Ok(import_wineries(&state.db, &wineries).await)
    }

    async fn import_varietals(
        &self,
        ctx: &Context<'_>,
        varietals: Vec<VarietalImportInput>,
    ) -> Result<VarietalImportResult> {
        let state = ctx.data::<AppState>()?;
        Ok(import_varietals(&state.db, &varietals).await)
    }

    /// Import a single wine, resolving references by name
    async fn import_wine(&self, ctx: &Context<'_>, wine: WineImportInput) -> Result<Wine> {
        let state = ctx.data::<AppState>()?;
        let imported = import_wine(&state.db, &wine).await?;
        state.event_bus.emit_lossy(CellarEvent::WineCreated {
            wine_id: imported.id,
            timestamp: Utc::now(),
        });
        Ok(imported)
    }

    async fn import_wines(
        &self,
        ctx: &Context<'_>,
        wines: Vec<WineImportInput>,
    ) -> Result<WineImportResult> {
        let state = ctx.data::<AppState>()?;
        Ok(import_wines(&state.db, &wines).await)
    }

    /// Import a whole collection: wineries, then varietals, then wines
    async fn import_collection(
        &self,
        ctx: &Context<'_>,
        #[graphql(default)] wineries: Vec<WineryImportInput>,
        #[graphql(default)] varietals: Vec<VarietalImportInput>,
        #[graphql(default)] wines: Vec<WineImportInput>,
    ) -> Result<CollectionImportResult> {
        let state = ctx.data::<AppState>()?;
        let result = import_collection(&state.db, &wineries, &varietals, &wines).await;
        state.event_bus.emit_lossy(CellarEvent::ImportCompleted {
            wineries_imported: result.wineries.imported,
            varietals_imported: result.varietals.imported,
            wines_imported: result.wines.imported,
            error_count: result.error_count() as i64,
            timestamp: Utc::now(),
        });
        Ok(result)
    }
}
