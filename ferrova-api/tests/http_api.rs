//! HTTP-level tests driving the real router against an in-memory
//! database, with tokens minted the way the external identity service
//! would mint them.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveTime;
use ferrova_api::{
    app,
    state::{AppState, AuthConfig},
};
use ferrova_core::models::{RouteStop, Station, Train};
use ferrova_store::{BookingStore, Database, TrainCatalog};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "test-secret";
const JOURNEY: &str = "2030-05-01";

async fn setup(total_seats: u32, fare_cents: i64) -> (Router, AppState, Uuid) {
    let db = Database::in_memory().await.expect("open in-memory db");
    db.migrate().await.expect("run migrations");
    let db = Arc::new(db);

    let state = AppState {
        bookings: Arc::new(BookingStore::new(db.pool.clone())),
        catalog: Arc::new(TrainCatalog::new(db.pool.clone())),
        db,
        auth: AuthConfig {
            secret: SECRET.to_string(),
        },
    };

    let train = Train {
        id: Uuid::new_v4(),
        train_number: "12301".to_string(),
        name: "Coastal Express".to_string(),
        source_station: "Meridian Central".to_string(),
        destination_station: "Port Arlen".to_string(),
        departure: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
        arrival: NaiveTime::from_hms_opt(16, 45, 0).unwrap(),
        total_seats,
        fare_cents,
    };
    state.catalog.insert_train(&train).await.unwrap();

    (app(state.clone()), state, train.id)
}

fn token(user: &str) -> String {
    // exp in 2100; these tests do not exercise expiry.
    let claims = json!({ "sub": user, "exp": 4_102_444_800u64 });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn booking_request(train_id: Uuid, user: &str, passengers: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/bookings")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token(user)))
        .body(Body::from(
            serde_json::to_string(&json!({
                "trainId": train_id,
                "journeyDate": JOURNEY,
                "passengers": passengers,
            }))
            .unwrap(),
        ))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _, _) = setup(10, 100).await;

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["database"], "Connected");
}

#[tokio::test]
async fn booking_requires_a_token() {
    let (app, _, train_id) = setup(10, 100).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/bookings")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "trainId": train_id, "journeyDate": JOURNEY, "passengers": [] }).to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let (app, _, _) = setup(10, 100).await;

    let request = Request::builder()
        .uri("/api/bookings/my-bookings")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn booking_flow_end_to_end() {
    let (app, _, train_id) = setup(5, 100).await;

    // Book two seats.
    let passengers = json!([
        { "name": "Asha Rao", "age": 34, "gender": "female" },
        { "name": "Bren Holt", "age": 41, "gender": "male" },
    ]);
    let (status, body) = send(&app, booking_request(train_id, "user-1", passengers)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let booking = &body["booking"];
    assert_eq!(booking["status"], "confirmed");
    assert_eq!(booking["confirmedPassengers"], 2);
    assert_eq!(booking["waitingPassengers"], 0);
    assert_eq!(booking["seatNumbers"], json!(["S1", "S2"]));
    assert_eq!(booking["totalAmountCents"], 200);
    assert!(booking["pnrNumber"].as_str().unwrap().starts_with("PNR"));
    let booking_id = booking["bookingId"].as_str().unwrap().to_string();

    // Availability reflects the committed booking.
    let (status, body) = send(
        &app,
        Request::builder()
            .uri(format!("/api/trains/{train_id}/availability?date={JOURNEY}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["availableSeats"], 3);
    assert_eq!(body["totalSeats"], 5);

    // The owner sees it in their list with passenger status counts.
    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/bookings/my-bookings")
            .header("authorization", format!("Bearer {}", token("user-1")))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let bookings = body["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["confirmed_seats"], 2);
    assert_eq!(bookings[0]["waiting_seats"], 0);
    assert_eq!(bookings[0]["train_name"], "Coastal Express");

    // Detail view returns the passengers.
    let (status, body) = send(
        &app,
        Request::builder()
            .uri(format!("/api/bookings/{booking_id}"))
            .header("authorization", format!("Bearer {}", token("user-1")))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["passengers"].as_array().unwrap().len(), 2);

    // Cancel, then the seats are free again.
    let (status, body) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri(format!("/api/bookings/{booking_id}/cancel"))
            .header("authorization", format!("Bearer {}", token("user-1")))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, body) = send(
        &app,
        Request::builder()
            .uri(format!("/api/trains/{train_id}/availability?date={JOURNEY}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(body["availableSeats"], 5);
}

#[tokio::test]
async fn overflow_booking_is_waitlisted() {
    let (app, _, train_id) = setup(1, 250).await;

    let passengers = json!([
        { "name": "Asha Rao", "age": 34, "gender": "female" },
        { "name": "Bren Holt", "age": 41, "gender": "male" },
    ]);
    let (status, body) = send(&app, booking_request(train_id, "user-1", passengers)).await;

    assert_eq!(status, StatusCode::CREATED);
    let booking = &body["booking"];
    assert_eq!(booking["status"], "waiting");
    assert_eq!(booking["confirmedPassengers"], 1);
    assert_eq!(booking["waitingPassengers"], 1);
    assert_eq!(booking["seatNumbers"], json!(["S1"]));
    // Flat fare for both passengers.
    assert_eq!(booking["totalAmountCents"], 500);
}

#[tokio::test]
async fn unknown_train_is_not_found() {
    let (app, _, _) = setup(5, 100).await;

    let passengers = json!([{ "name": "Asha Rao", "age": 34, "gender": "female" }]);
    let (status, body) = send(&app, booking_request(Uuid::new_v4(), "user-1", passengers)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Train not found");
}

#[tokio::test]
async fn malformed_booking_body_is_a_structured_400() {
    let (app, _, train_id) = setup(5, 100).await;

    // "passengers" is a string, not an array; the body fails to
    // deserialize before the handler runs.
    let request = Request::builder()
        .method("POST")
        .uri("/api/bookings")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token("user-1")))
        .body(Body::from(
            json!({ "trainId": train_id, "journeyDate": JOURNEY, "passengers": "oops" })
                .to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(!body["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn empty_passenger_list_is_rejected() {
    let (app, _, train_id) = setup(5, 100).await;

    let (status, body) = send(&app, booking_request(train_id, "user-1", json!([]))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn availability_requires_a_date() {
    let (app, _, train_id) = setup(5, 100).await;

    let (status, body) = send(
        &app,
        Request::builder()
            .uri(format!("/api/trains/{train_id}/availability"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Date parameter is required");
}

#[tokio::test]
async fn cancelling_another_users_booking_is_not_found() {
    let (app, _, train_id) = setup(5, 100).await;

    let passengers = json!([{ "name": "Asha Rao", "age": 34, "gender": "female" }]);
    let (_, body) = send(&app, booking_request(train_id, "user-1", passengers)).await;
    let booking_id = body["booking"]["bookingId"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri(format!("/api/bookings/{booking_id}/cancel"))
            .header("authorization", format!("Bearer {}", token("user-2")))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn train_search_filters_by_endpoints() {
    let (app, state, _) = setup(5, 100).await;

    let other = Train {
        id: Uuid::new_v4(),
        train_number: "12407".to_string(),
        name: "Highland Mail".to_string(),
        source_station: "Dunvar North".to_string(),
        destination_station: "Kells Junction".to_string(),
        departure: NaiveTime::from_hms_opt(6, 10, 0).unwrap(),
        arrival: NaiveTime::from_hms_opt(11, 55, 0).unwrap(),
        total_seats: 40,
        fare_cents: 700,
    };
    state.catalog.insert_train(&other).await.unwrap();

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/trains/search?source=Meridian")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["trains"][0]["train_name"], "Coastal Express");

    let (_, body) = send(
        &app,
        Request::builder()
            .uri("/api/trains/search")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(body["count"], 2);
    // Ordered by departure time.
    assert_eq!(body["trains"][0]["train_number"], "12407");
}

#[tokio::test]
async fn stations_and_connections() {
    let (app, state, train_id) = setup(5, 100).await;

    let meridian = Station {
        id: Uuid::new_v4(),
        code: "MRD".to_string(),
        name: "Meridian Central".to_string(),
        city: "Meridian".to_string(),
    };
    let arlen = Station {
        id: Uuid::new_v4(),
        code: "PAR".to_string(),
        name: "Port Arlen".to_string(),
        city: "Arlen".to_string(),
    };
    state.catalog.insert_station(&meridian).await.unwrap();
    state.catalog.insert_station(&arlen).await.unwrap();
    state
        .catalog
        .insert_route_stop(&RouteStop {
            train_id,
            station_id: meridian.id,
            sequence: 1,
        })
        .await
        .unwrap();
    state
        .catalog
        .insert_route_stop(&RouteStop {
            train_id,
            station_id: arlen.id,
            sequence: 2,
        })
        .await
        .unwrap();

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/stations")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stations"].as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/stations/connections?source=MRD&destination=PAR")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let routes = body["routes"].as_array().unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["train_number"], "12301");

    // Reversed direction finds nothing.
    let (_, body) = send(
        &app,
        Request::builder()
            .uri("/api/stations/connections?source=PAR&destination=MRD")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(body["routes"].as_array().unwrap().len(), 0);

    // Train details include the ordered stops.
    let (status, body) = send(
        &app,
        Request::builder()
            .uri(format!("/api/trains/{train_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["route_details"].as_array().unwrap().len(), 2);
    assert_eq!(body["route_details"][0]["station_code"], "MRD");
}
