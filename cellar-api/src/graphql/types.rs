//! Relation and derived fields on the db record types

use async_graphql::{ComplexObject, Context, Result};

use crate::db::photos::{photos_for_wine, Photo};
use crate::db::tags::Tag;
use crate::db::varietals::{get_varietal, Varietal};
use crate::db::wineries::{get_winery, wine_count, Winery};
use crate::db::wines::{list_wines, tags_for_wine, Wine, WineFilter};
use crate::storage::resolve_photo_url;
use crate::AppState;

#[ComplexObject]
impl Winery {
    /// Wines owned by this winery
    async fn wines(&self, ctx: &Context<'_>) -> Result<Vec<Wine>> {
        let state = ctx.data::<AppState>()?;
        let filter = WineFilter {
            winery_id: Some(self.id),
            ..Default::default()
        };
        Ok(list_wines(&state.db, &filter, 0, 500).await?)
    }

    async fn wine_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let state = ctx.data::<AppState>()?;
        Ok(wine_count(&state.db, self.id).await?)
    }
}

#[ComplexObject]
impl Wine {
    async fn winery(&self, ctx: &Context<'_>) -> Result<Option<Winery>> {
        let state = ctx.data::<AppState>()?;
        Ok(get_winery(&state.db, self.winery_id).await?)
    }

    async fn varietal(&self, ctx: &Context<'_>) -> Result<Option<Varietal>> {
        let state = ctx.data::<AppState>()?;
        match self.varietal_id {
            Some(id) => Ok(get_varietal(&state.db, id).await?),
            None => Ok(None),
        }
    }

    async fn tags(&self, ctx: &Context<'_>) -> Result<Vec<Tag>> {
        let state = ctx.data::<AppState>()?;
        Ok(tags_for_wine(&state.db, self.id).await?)
    }

    /// Photos, primary first
    async fn photos(&self, ctx: &Context<'_>) -> Result<Vec<Photo>> {
        let state = ctx.data::<AppState>()?;
        Ok(photos_for_wine(&state.db, self.id).await?)
    }
}

#[ComplexObject]
impl Photo {
    /// Display URL; signed and time-limited when the photo is a
    /// stored object
    async fn url(&self, ctx: &Context<'_>) -> Result<String> {
        let state = ctx.data::<AppState>()?;
        Ok(resolve_photo_url(state.store.as_ref(), self))
    }
}
