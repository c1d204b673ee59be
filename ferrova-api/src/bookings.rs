use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use ferrova_core::models::{BookingStatus, PassengerDraft};
use ferrova_store::{BookingReceipt, BookingSummary};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/my-bookings", get(my_bookings))
        .route("/api/bookings/{id}", get(booking_details))
        .route("/api/bookings/{id}/cancel", post(cancel_booking))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBookingRequest {
    train_id: Uuid,
    journey_date: NaiveDate,
    passengers: Vec<PassengerDraft>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptDto {
    pnr_number: String,
    booking_id: Uuid,
    status: BookingStatus,
    confirmed_passengers: u32,
    waiting_passengers: u32,
    seat_numbers: Vec<String>,
    total_amount_cents: i64,
}

impl From<BookingReceipt> for ReceiptDto {
    fn from(receipt: BookingReceipt) -> Self {
        Self {
            pnr_number: receipt.pnr,
            booking_id: receipt.booking_id,
            status: receipt.status,
            confirmed_passengers: receipt.confirmed,
            waiting_passengers: receipt.waiting,
            seat_numbers: receipt.seat_numbers,
            total_amount_cents: receipt.total_amount_cents,
        }
    }
}

async fn create_booking(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(req): ApiJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let receipt = state
        .bookings
        .create_booking(&user_id, req.train_id, req.journey_date, &req.passengers)
        .await?;

    info!(pnr = %receipt.pnr, user = %user_id, "booking accepted");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Booking created successfully",
            "booking": ReceiptDto::from(receipt),
        })),
    ))
}

#[derive(Debug, Serialize)]
struct SummaryDto {
    id: Uuid,
    pnr_number: String,
    train_id: Uuid,
    train_number: String,
    train_name: String,
    source_station: String,
    destination_station: String,
    journey_date: NaiveDate,
    total_passengers: u32,
    total_amount_cents: i64,
    status: BookingStatus,
    seat_numbers: Vec<String>,
    confirmed_seats: u32,
    waiting_seats: u32,
    created_at: String,
}

impl From<BookingSummary> for SummaryDto {
    fn from(summary: BookingSummary) -> Self {
        Self {
            id: summary.id,
            pnr_number: summary.pnr,
            train_id: summary.train_id,
            train_number: summary.train_number,
            train_name: summary.train_name,
            source_station: summary.source_station,
            destination_station: summary.destination_station,
            journey_date: summary.journey_date,
            total_passengers: summary.passenger_count,
            total_amount_cents: summary.total_amount_cents,
            status: summary.status,
            seat_numbers: summary.seat_numbers,
            confirmed_seats: summary.confirmed_seats,
            waiting_seats: summary.waiting_seats,
            created_at: summary.created_at.to_rfc3339(),
        }
    }
}

async fn my_bookings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let bookings: Vec<SummaryDto> = state
        .bookings
        .list_for_user(&user_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(json!({
        "success": true,
        "bookings": bookings,
    })))
}

async fn booking_details(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let booking = state.bookings.booking_for_user(id, &user_id).await?;
    let passengers = state.bookings.passengers_for_booking(id).await?;

    Ok(Json(json!({
        "success": true,
        "booking": booking,
        "passengers": passengers,
    })))
}

async fn cancel_booking(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.bookings.cancel(id, &user_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Booking cancelled successfully",
    })))
}
