//! Booking persistence: the capacity ledger, the booking transaction
//! coordinator, and the lifecycle store.
//!
//! The coordinator serializes the read-capacity → allocate → write
//! sequence per (train, journey date) pool with a journey lock, and runs
//! the whole write set in a single transaction. The seat counter is
//! always derived from a sum read inside that same atomic unit.

use chrono::{DateTime, NaiveDate, Utc};
use ferrova_core::allocation::allocate;
use ferrova_core::capacity::CapacitySnapshot;
use ferrova_core::models::{
    Booking, BookingStatus, Gender, Passenger, PassengerDraft, PassengerStatus, Train,
};
use ferrova_core::pnr;
use sqlx::{Sqlite, SqlitePool};
use std::str::FromStr;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog_repo::train_on;
use crate::error::{parse_uuid, StoreError};
use crate::journey_lock::JourneyLocks;

/// Bounded retries for reservation-reference collisions before the
/// request is surfaced as a conflict.
const PNR_ATTEMPTS: u32 = 3;

/// What the coordinator hands back to the caller after a committed
/// booking.
#[derive(Debug, Clone)]
pub struct BookingReceipt {
    pub pnr: String,
    pub booking_id: Uuid,
    pub status: BookingStatus,
    pub confirmed: u32,
    pub waiting: u32,
    pub seat_numbers: Vec<String>,
    pub total_amount_cents: i64,
}

/// A booking joined with train display fields and per-booking passenger
/// status counts, for the owner's booking list.
#[derive(Debug, Clone)]
pub struct BookingSummary {
    pub id: Uuid,
    pub pnr: String,
    pub train_id: Uuid,
    pub train_number: String,
    pub train_name: String,
    pub source_station: String,
    pub destination_station: String,
    pub journey_date: NaiveDate,
    pub passenger_count: u32,
    pub total_amount_cents: i64,
    pub status: BookingStatus,
    pub seat_numbers: Vec<String>,
    pub confirmed_seats: u32,
    pub waiting_seats: u32,
    pub created_at: DateTime<Utc>,
}

pub struct BookingStore {
    pool: SqlitePool,
    locks: JourneyLocks,
}

impl BookingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            locks: JourneyLocks::new(),
        }
    }

    // ---- capacity ledger ---------------------------------------------------

    /// Sum of `passenger_count` over confirmed bookings for one pool.
    /// Absence of rows is 0, not an error.
    pub async fn confirmed_seats(
        &self,
        train_id: Uuid,
        journey_date: NaiveDate,
    ) -> Result<u32, StoreError> {
        confirmed_seats_on(&self.pool, train_id, journey_date).await
    }

    /// Train plus a point-in-time capacity snapshot for one journey date.
    pub async fn availability(
        &self,
        train_id: Uuid,
        journey_date: NaiveDate,
    ) -> Result<(Train, CapacitySnapshot), StoreError> {
        let train = train_on(&self.pool, train_id)
            .await?
            .ok_or(StoreError::TrainNotFound(train_id))?;
        let confirmed = confirmed_seats_on(&self.pool, train_id, journey_date).await?;
        let snapshot = CapacitySnapshot::new(train.total_seats, confirmed);
        Ok((train, snapshot))
    }

    // ---- transaction coordinator -------------------------------------------

    /// Allocate seats for `drafts` and persist the booking with its
    /// passengers atomically. Either the whole write set commits or none
    /// of it does.
    pub async fn create_booking(
        &self,
        user_id: &str,
        train_id: Uuid,
        journey_date: NaiveDate,
        drafts: &[PassengerDraft],
    ) -> Result<BookingReceipt, StoreError> {
        if drafts.is_empty() {
            return Err(StoreError::InvalidRequest(
                "passenger list must not be empty".into(),
            ));
        }
        if drafts.iter().any(|d| d.name.trim().is_empty()) {
            return Err(StoreError::InvalidRequest(
                "passenger name must not be blank".into(),
            ));
        }

        // Single writer per capacity pool. Everything below, including
        // the confirmed-seat read that seeds the seat counter, happens
        // under this lock.
        let _guard = self.locks.acquire(train_id, journey_date).await;

        for _ in 0..PNR_ATTEMPTS {
            let pnr = pnr::generate();
            match self
                .try_create(&pnr, user_id, train_id, journey_date, drafts)
                .await
            {
                Err(StoreError::Database(sqlx::Error::Database(db)))
                    if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
                {
                    warn!(%pnr, "reservation reference collision, regenerating");
                    continue;
                }
                other => return other,
            }
        }
        Err(StoreError::Conflict)
    }

    async fn try_create(
        &self,
        pnr: &str,
        user_id: &str,
        train_id: Uuid,
        journey_date: NaiveDate,
        drafts: &[PassengerDraft],
    ) -> Result<BookingReceipt, StoreError> {
        let mut tx = self.pool.begin().await?;

        let train = train_on(&mut *tx, train_id)
            .await?
            .ok_or(StoreError::TrainNotFound(train_id))?;
        let confirmed = confirmed_seats_on(&mut *tx, train_id, journey_date).await?;
        let snapshot = CapacitySnapshot::new(train.total_seats, confirmed);

        let allocation = allocate(&snapshot, drafts, train.fare_cents);

        let booking_id = Uuid::new_v4();
        let created_at = Utc::now();
        let seats_json = serde_json::to_string(&allocation.seat_numbers)?;

        sqlx::query(
            "INSERT INTO bookings (id, pnr_number, user_id, train_id, journey_date, \
             passenger_count, total_amount_cents, status, seat_numbers, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(booking_id.to_string())
        .bind(pnr)
        .bind(user_id)
        .bind(train_id.to_string())
        .bind(journey_date)
        .bind(drafts.len() as i64)
        .bind(allocation.total_amount_cents)
        .bind(allocation.status.to_string())
        .bind(&seats_json)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        for (draft, decision) in drafts.iter().zip(&allocation.decisions) {
            sqlx::query(
                "INSERT INTO passengers (id, booking_id, name, age, gender, seat_number, status) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(booking_id.to_string())
            .bind(&draft.name)
            .bind(draft.age as i64)
            .bind(draft.gender.to_string())
            .bind(decision.seat_number.as_deref())
            .bind(decision.status.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            %booking_id,
            pnr,
            confirmed = allocation.confirmed,
            waiting = allocation.waiting,
            "booking created"
        );

        Ok(BookingReceipt {
            pnr: pnr.to_string(),
            booking_id,
            status: allocation.status,
            confirmed: allocation.confirmed,
            waiting: allocation.waiting,
            seat_numbers: allocation.seat_numbers,
            total_amount_cents: allocation.total_amount_cents,
        })
    }

    // ---- lifecycle store ---------------------------------------------------

    /// The caller's bookings, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<BookingSummary>, StoreError> {
        let rows = sqlx::query_as::<_, BookingSummaryRow>(
            "SELECT b.id, b.pnr_number, b.train_id, b.journey_date, b.passenger_count, \
                    b.total_amount_cents, b.status, b.seat_numbers, b.created_at, \
                    t.train_number, t.train_name, t.source_station, t.destination_station, \
                    (SELECT COUNT(*) FROM passengers p \
                     WHERE p.booking_id = b.id AND p.status = 'confirmed') AS confirmed_seats, \
                    (SELECT COUNT(*) FROM passengers p \
                     WHERE p.booking_id = b.id AND p.status = 'waiting') AS waiting_seats \
             FROM bookings b \
             JOIN trains t ON b.train_id = t.id \
             WHERE b.user_id = ?1 \
             ORDER BY b.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BookingSummaryRow::into_summary).collect()
    }

    pub async fn passengers_for_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Vec<Passenger>, StoreError> {
        let rows = sqlx::query_as::<_, PassengerRow>(
            "SELECT id, booking_id, name, age, gender, seat_number, status \
             FROM passengers WHERE booking_id = ?1",
        )
        .bind(booking_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PassengerRow::into_passenger).collect()
    }

    /// Ownership-scoped cancellation. The status flip is unconditional,
    /// so cancelling an already-cancelled booking is a no-op. Freed
    /// capacity is only observed by later availability reads; waitlisted
    /// bookings are never promoted.
    pub async fn cancel(&self, booking_id: Uuid, user_id: &str) -> Result<(), StoreError> {
        let owned: Option<(String,)> =
            sqlx::query_as("SELECT id FROM bookings WHERE id = ?1 AND user_id = ?2")
                .bind(booking_id.to_string())
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        if owned.is_none() {
            return Err(StoreError::BookingNotFound(booking_id));
        }

        sqlx::query("UPDATE bookings SET status = 'cancelled' WHERE id = ?1")
            .bind(booking_id.to_string())
            .execute(&self.pool)
            .await?;

        info!(%booking_id, "booking cancelled");
        Ok(())
    }

    /// Booking lookup scoped to its owner, for detail display.
    pub async fn booking_for_user(
        &self,
        booking_id: Uuid,
        user_id: &str,
    ) -> Result<Booking, StoreError> {
        let row: Option<BookingRow> = sqlx::query_as(
            "SELECT id, pnr_number, user_id, train_id, journey_date, passenger_count, \
                    total_amount_cents, status, seat_numbers, created_at \
             FROM bookings WHERE id = ?1 AND user_id = ?2",
        )
        .bind(booking_id.to_string())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(StoreError::BookingNotFound(booking_id))?
            .into_booking()
    }
}

async fn confirmed_seats_on<'c, E>(
    executor: E,
    train_id: Uuid,
    journey_date: NaiveDate,
) -> Result<u32, StoreError>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    let sum: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(passenger_count), 0) FROM bookings \
         WHERE train_id = ?1 AND journey_date = ?2 AND status = 'confirmed'",
    )
    .bind(train_id.to_string())
    .bind(journey_date)
    .fetch_one(executor)
    .await?;
    Ok(sum as u32)
}

fn parse_status(value: &str) -> Result<BookingStatus, StoreError> {
    BookingStatus::from_str(value).map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn parse_seats(value: &str) -> Result<Vec<String>, StoreError> {
    Ok(serde_json::from_str(value)?)
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: String,
    pnr_number: String,
    user_id: String,
    train_id: String,
    journey_date: NaiveDate,
    passenger_count: i64,
    total_amount_cents: i64,
    status: String,
    seat_numbers: String,
    created_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, StoreError> {
        Ok(Booking {
            id: parse_uuid(&self.id)?,
            pnr: self.pnr_number,
            user_id: self.user_id,
            train_id: parse_uuid(&self.train_id)?,
            journey_date: self.journey_date,
            passenger_count: self.passenger_count as u32,
            total_amount_cents: self.total_amount_cents,
            status: parse_status(&self.status)?,
            seat_numbers: parse_seats(&self.seat_numbers)?,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BookingSummaryRow {
    id: String,
    pnr_number: String,
    train_id: String,
    journey_date: NaiveDate,
    passenger_count: i64,
    total_amount_cents: i64,
    status: String,
    seat_numbers: String,
    created_at: DateTime<Utc>,
    train_number: String,
    train_name: String,
    source_station: String,
    destination_station: String,
    confirmed_seats: i64,
    waiting_seats: i64,
}

impl BookingSummaryRow {
    fn into_summary(self) -> Result<BookingSummary, StoreError> {
        Ok(BookingSummary {
            id: parse_uuid(&self.id)?,
            pnr: self.pnr_number,
            train_id: parse_uuid(&self.train_id)?,
            train_number: self.train_number,
            train_name: self.train_name,
            source_station: self.source_station,
            destination_station: self.destination_station,
            journey_date: self.journey_date,
            passenger_count: self.passenger_count as u32,
            total_amount_cents: self.total_amount_cents,
            status: parse_status(&self.status)?,
            seat_numbers: parse_seats(&self.seat_numbers)?,
            confirmed_seats: self.confirmed_seats as u32,
            waiting_seats: self.waiting_seats as u32,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PassengerRow {
    id: String,
    booking_id: String,
    name: String,
    age: i64,
    gender: String,
    seat_number: Option<String>,
    status: String,
}

impl PassengerRow {
    fn into_passenger(self) -> Result<Passenger, StoreError> {
        Ok(Passenger {
            id: parse_uuid(&self.id)?,
            booking_id: parse_uuid(&self.booking_id)?,
            name: self.name,
            age: self.age as u8,
            gender: Gender::from_str(&self.gender)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            seat_number: self.seat_number,
            status: PassengerStatus::from_str(&self.status)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
        })
    }
}
