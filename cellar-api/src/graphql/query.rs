//! Query root

use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::db::locations::{list_locations, CellarLocation};
use crate::db::stats::{wine_stats, WineStats};
use crate::db::tags::{list_tags, Tag};
use crate::db::varietals::{find_varietal_by_name, get_varietal, list_varietals, Varietal};
use crate::db::wineries::{get_winery, list_wineries, Winery};
use crate::db::wines::{get_wine, list_wines, Wine, WineFilter};
use crate::AppState;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// List wines with optional filter and skip/take pagination
    async fn wines(
        &self,
        ctx: &Context<'_>,
        filter: Option<WineFilter>,
        #[graphql(default = 0)] skip: i64,
        #[graphql(default = 100)] take: i64,
    ) -> Result<Vec<Wine>> {
        let state = ctx.data::<AppState>()?;
        Ok(list_wines(&state.db, &filter.unwrap_or_default(), skip, take).await?)
    }

    async fn wine(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Wine>> {
        let state = ctx.data::<AppState>()?;
        Ok(get_wine(&state.db, id).await?)
    }

    /// Aggregate statistics over non-consumed wines
    async fn wine_stats(&self, ctx: &Context<'_>) -> Result<WineStats> {
        let state = ctx.data::<AppState>()?;
        Ok(wine_stats(&state.db).await?)
    }

    async fn wineries(
        &self,
        ctx: &Context<'_>,
        search: Option<String>,
        #[graphql(default = 0)] skip: i64,
        #[graphql(default = 100)] take: i64,
    ) -> Result<Vec<Winery>> {
        let state = ctx.data::<AppState>()?;
        Ok(list_wineries(&state.db, search.as_deref(), skip, take).await?)
    }

    async fn winery(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Winery>> {
        let state = ctx.data::<AppState>()?;
        Ok(get_winery(&state.db, id).await?)
    }

    async fn varietals(&self, ctx: &Context<'_>) -> Result<Vec<Varietal>> {
        let state = ctx.data::<AppState>()?;
        Ok(list_varietals(&state.db).await?)
    }

    async fn varietal(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Varietal>> {
        let state = ctx.data::<AppState>()?;
        Ok(get_varietal(&state.db, id).await?)
    }

    /// Exact-name varietal lookup
    async fn varietal_by_name(&self, ctx: &Context<'_>, name: String) -> Result<Option<Varietal>> {
        let state = ctx.data::<AppState>()?;
        Ok(find_varietal_by_name(&state.db, &name).await?)
    }

    async fn tags(&self, ctx: &Context<'_>) -> Result<Vec<Tag>> {
        let state = ctx.data::<AppState>()?;
        Ok(list_tags(&state.db).await?)
    }

    async fn cellar_locations(&self, ctx: &Context<'_>) -> Result<Vec<CellarLocation>> {
        let state = ctx.data::<AppState>()?;
        Ok(list_locations(&state.db).await?)
    }
}
