use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/stations", get(list_stations))
        .route("/api/stations/connections", get(connections))
}

async fn list_stations(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let stations = state.catalog.list_stations().await?;
    Ok(Json(json!({
        "success": true,
        "stations": stations,
    })))
}

#[derive(Debug, Deserialize)]
struct ConnectionParams {
    source: Option<String>,
    destination: Option<String>,
}

async fn connections(
    State(state): State<AppState>,
    Query(params): Query<ConnectionParams>,
) -> Result<Json<Value>, ApiError> {
    let (source, destination) = match (params.source, params.destination) {
        (Some(s), Some(d)) => (s, d),
        _ => {
            return Err(ApiError::BadRequest(
                "Source and destination stations are required".into(),
            ))
        }
    };

    let routes = state.catalog.connections(&source, &destination).await?;
    Ok(Json(json!({
        "success": true,
        "routes": routes,
    })))
}
