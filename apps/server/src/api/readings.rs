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
use pureair_air_quality::{Coordinate, ForecastPoint, NormalizedReading};

#[derive(serde::Deserialize)]
struct ReadingQuery {
    lat: f64,
    lon: f64,
}

/// Best-effort reading for a coordinate. Only invalid input fails.
async fn get_reading(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ReadingQuery>, QueryRejection>,
) -> ApiResult<Json<NormalizedReading>> {
    let Query(q) = query?;
    if !Coordinate::new(q.lat, q.lon).is_valid() {
        return Err(ApiError::BadRequest(format!(
            "Coordinate out of range: lat={}, lon={}",
            q.lat, q.lon
        )));
    }

    let reading = state.pipeline.get_reading(q.lat, q.lon).await;
    Ok(Json(reading))
}

#[derive(serde::Deserialize)]
struct ForecastQuery {
    #[serde(rename = "baseIndex")]
    base_index: i32,
}

async fn get_forecast(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ForecastQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<ForecastPoint>>> {
    let Query(q) = query?;
    Ok(Json(state.pipeline.get_forecast(q.base_index)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/readings", get(get_reading))
        .route("/forecast", get(get_forecast))
}
