//! Reservation reference (PNR) generation.
//!
//! A PNR combines a millisecond timestamp with a short random suffix.
//! The store enforces actual uniqueness with a unique index; the
//! coordinator regenerates on the rare collision.

use chrono::Utc;
use rand::Rng;

pub const PREFIX: &str = "PNR";

/// Generate a new candidate reservation reference, e.g. `PNR1735689600123042`.
pub fn generate() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u16 = rand::thread_rng().gen_range(0..1000);
    format!("{PREFIX}{millis}{suffix:03}")
}
