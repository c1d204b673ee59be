use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use ferrova_core::models::Train;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use ferrova_store::TrainSearch;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/trains/search", get(search_trains))
        .route("/api/trains/{id}", get(train_details))
        .route("/api/trains/{id}/availability", get(availability))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    source: Option<String>,
    destination: Option<String>,
    limit: Option<u32>,
}

#[derive(Debug, Serialize)]
struct TrainDto {
    id: Uuid,
    train_number: String,
    train_name: String,
    source_station: String,
    destination_station: String,
    departure_time: String,
    arrival_time: String,
    total_seats: u32,
    fare_cents: i64,
}

impl From<Train> for TrainDto {
    fn from(train: Train) -> Self {
        Self {
            id: train.id,
            train_number: train.train_number,
            train_name: train.name,
            source_station: train.source_station,
            destination_station: train.destination_station,
            departure_time: train.departure.format("%H:%M").to_string(),
            arrival_time: train.arrival.format("%H:%M").to_string(),
            total_seats: train.total_seats,
            fare_cents: train.fare_cents,
        }
    }
}

async fn search_trains(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, ApiError> {
    let filter = TrainSearch {
        source: params.source,
        destination: params.destination,
        limit: params.limit,
    };
    let trains: Vec<TrainDto> = state
        .catalog
        .search_trains(&filter)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(json!({
        "success": true,
        "count": trains.len(),
        "trains": trains,
    })))
}

async fn train_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let train = state
        .catalog
        .train_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Train not found".into()))?;
    let route_details = state.catalog.route_for_train(id).await?;

    Ok(Json(json!({
        "success": true,
        "train": TrainDto::from(train),
        "route_details": route_details,
    })))
}

#[derive(Debug, Deserialize)]
struct AvailabilityParams {
    date: Option<NaiveDate>,
}

async fn availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<Value>, ApiError> {
    let date = params
        .date
        .ok_or_else(|| ApiError::BadRequest("Date parameter is required".into()))?;

    let (train, snapshot) = state.bookings.availability(id, date).await?;

    Ok(Json(json!({
        "success": true,
        "train": TrainDto::from(train),
        "availableSeats": snapshot.available(),
        "totalSeats": snapshot.total_seats,
    })))
}
