use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use pureair_air_quality::Location;

#[derive(serde::Deserialize)]
struct SearchQuery {
    q: String,
}

async fn search_location(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<Location>> {
    let Query(query) = query?;
    let text = query.q.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("Query must not be empty".to_string()));
    }

    state
        .pipeline
        .search_location(text)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/locations/search", get(search_location))
}
