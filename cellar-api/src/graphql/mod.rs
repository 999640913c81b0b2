//! GraphQL schema assembly
//!
//! Queries and mutations resolve against [`AppState`] carried in the
//! schema data; relation fields live in `types` as complex-object
//! resolvers on the db records.

mod mutation;
mod query;
mod types;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

use async_graphql::http::GraphiQLSource;
use async_graphql::{EmptySubscription, Schema};
use axum::response::{Html, IntoResponse};

use crate::AppState;

pub type CellarSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with application state attached
pub fn build_schema(state: AppState) -> CellarSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(state)
        .finish()
}

/// GraphiQL playground page
pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}
