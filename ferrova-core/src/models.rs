use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Raised when a persisted status/gender string is not one of the known values.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized value: {0}")]
pub struct ParseValueError(pub String);

/// Timetable reference data. Capacity is per train, not per date; the
/// per-date pool is derived from confirmed bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Train {
    pub id: Uuid,
    pub train_number: String,
    pub name: String,
    pub source_station: String,
    pub destination_station: String,
    pub departure: NaiveTime,
    pub arrival: NaiveTime,
    pub total_seats: u32,
    pub fare_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub city: String,
}

/// One ordered stop on a train's route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStop {
    pub train_id: Uuid,
    pub station_id: Uuid,
    pub sequence: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Waiting,
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Waiting => "waiting",
            BookingStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl FromStr for BookingStatus {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(BookingStatus::Confirmed),
            "waiting" => Ok(BookingStatus::Waiting),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(ParseValueError(other.to_string())),
        }
    }
}

/// Per-passenger status. A booking can be `waiting` overall while some of
/// its passengers still hold confirmed seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassengerStatus {
    Confirmed,
    Waiting,
}

impl fmt::Display for PassengerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PassengerStatus::Confirmed => "confirmed",
            PassengerStatus::Waiting => "waiting",
        };
        f.write_str(s)
    }
}

impl FromStr for PassengerStatus {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(PassengerStatus::Confirmed),
            "waiting" => Ok(PassengerStatus::Waiting),
            other => Err(ParseValueError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        };
        f.write_str(s)
    }
}

impl FromStr for Gender {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(ParseValueError(other.to_string())),
        }
    }
}

/// Passenger details as supplied in a booking request, before any seat
/// has been decided.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassengerDraft {
    pub name: String,
    pub age: u8,
    pub gender: Gender,
}

/// A booking and its passengers are created atomically and never deleted;
/// the only user-triggered mutation is the flip to `cancelled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub pnr: String,
    pub user_id: String,
    pub train_id: Uuid,
    pub journey_date: NaiveDate,
    pub passenger_count: u32,
    pub total_amount_cents: i64,
    pub status: BookingStatus,
    pub seat_numbers: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub seat_number: Option<String>,
    pub status: PassengerStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            BookingStatus::Confirmed,
            BookingStatus::Waiting,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<BookingStatus>().unwrap(), status);
        }
        assert!("boarded".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn gender_rejects_unknown_values() {
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert!("unknown".parse::<Gender>().is_err());
    }
}
