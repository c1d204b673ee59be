//! Seat allocation for one booking request.
//!
//! Greedy and order-preserving: the first `available()` passengers get
//! seats, the rest join the waitlist. There is no priority reordering and
//! no reassignment of previously issued seats. The caller is responsible
//! for running this inside the per-journey critical section so the seed
//! counter reflects every committed booking.

use crate::capacity::CapacitySnapshot;
use crate::models::{BookingStatus, PassengerDraft, PassengerStatus};
use serde::{Deserialize, Serialize};

/// Outcome for a single passenger, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatDecision {
    pub seat_number: Option<String>,
    pub status: PassengerStatus,
}

/// Full allocation result for a booking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub decisions: Vec<SeatDecision>,
    pub seat_numbers: Vec<String>,
    pub status: BookingStatus,
    pub confirmed: u32,
    pub waiting: u32,
    pub total_amount_cents: i64,
}

/// Assign seats to as many passengers as fit in the pool and waitlist the
/// remainder.
///
/// Seat labels are drawn from a counter seeded at `confirmed_seats + 1`,
/// so consecutive bookings on the same pool continue the sequence. Fare
/// is flat per head; a waitlisted passenger is charged the same as a
/// confirmed one.
pub fn allocate(
    snapshot: &CapacitySnapshot,
    passengers: &[PassengerDraft],
    fare_cents: i64,
) -> Allocation {
    let available = snapshot.available() as usize;
    let mut seat_counter = snapshot.confirmed_seats + 1;

    let mut decisions = Vec::with_capacity(passengers.len());
    let mut seat_numbers = Vec::new();

    for index in 0..passengers.len() {
        if index < available {
            let seat = format!("S{seat_counter}");
            seat_counter += 1;
            seat_numbers.push(seat.clone());
            decisions.push(SeatDecision {
                seat_number: Some(seat),
                status: PassengerStatus::Confirmed,
            });
        } else {
            decisions.push(SeatDecision {
                seat_number: None,
                status: PassengerStatus::Waiting,
            });
        }
    }

    let confirmed = seat_numbers.len() as u32;
    let waiting = passengers.len() as u32 - confirmed;
    let status = if waiting == 0 {
        BookingStatus::Confirmed
    } else {
        // One waitlisted passenger flips the whole booking to waiting.
        BookingStatus::Waiting
    };

    Allocation {
        decisions,
        seat_numbers,
        status,
        confirmed,
        waiting,
        total_amount_cents: passengers.len() as i64 * fare_cents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn drafts(n: usize) -> Vec<PassengerDraft> {
        (0..n)
            .map(|i| PassengerDraft {
                name: format!("Passenger {i}"),
                age: 30,
                gender: Gender::Other,
            })
            .collect()
    }

    #[test]
    fn everyone_fits_when_capacity_suffices() {
        let snapshot = CapacitySnapshot::new(5, 0);
        let allocation = allocate(&snapshot, &drafts(3), 10_000);

        assert_eq!(allocation.status, BookingStatus::Confirmed);
        assert_eq!(allocation.confirmed, 3);
        assert_eq!(allocation.waiting, 0);
        assert_eq!(allocation.seat_numbers, vec!["S1", "S2", "S3"]);
        assert!(allocation
            .decisions
            .iter()
            .all(|d| d.status == PassengerStatus::Confirmed && d.seat_number.is_some()));
        assert_eq!(allocation.total_amount_cents, 30_000);
    }

    #[test]
    fn counter_continues_from_confirmed_seats() {
        let snapshot = CapacitySnapshot::new(10, 4);
        let allocation = allocate(&snapshot, &drafts(2), 5_000);

        assert_eq!(allocation.seat_numbers, vec!["S5", "S6"]);
    }

    #[test]
    fn overflow_waitlists_the_tail_in_input_order() {
        let snapshot = CapacitySnapshot::new(4, 2);
        let allocation = allocate(&snapshot, &drafts(4), 7_500);

        assert_eq!(allocation.status, BookingStatus::Waiting);
        assert_eq!(allocation.confirmed, 2);
        assert_eq!(allocation.waiting, 2);
        assert_eq!(allocation.seat_numbers, vec!["S3", "S4"]);
        assert_eq!(
            allocation.decisions[0].seat_number.as_deref(),
            Some("S3")
        );
        assert_eq!(allocation.decisions[2].seat_number, None);
        assert_eq!(allocation.decisions[3].status, PassengerStatus::Waiting);
        // Flat fare regardless of the confirmed/waiting split.
        assert_eq!(allocation.total_amount_cents, 30_000);
    }

    #[test]
    fn full_pool_waitlists_everyone() {
        let snapshot = CapacitySnapshot::new(2, 2);
        let allocation = allocate(&snapshot, &drafts(3), 1_000);

        assert_eq!(allocation.status, BookingStatus::Waiting);
        assert_eq!(allocation.confirmed, 0);
        assert_eq!(allocation.waiting, 3);
        assert!(allocation.seat_numbers.is_empty());
        assert!(allocation.decisions.iter().all(|d| d.seat_number.is_none()));
        assert_eq!(allocation.total_amount_cents, 3_000);
    }

    #[test]
    fn seat_numbers_are_distinct() {
        let snapshot = CapacitySnapshot::new(50, 17);
        let allocation = allocate(&snapshot, &drafts(20), 100);

        let mut seen = std::collections::HashSet::new();
        for seat in &allocation.seat_numbers {
            assert!(seen.insert(seat.clone()), "duplicate seat {seat}");
        }
        assert_eq!(allocation.seat_numbers.first().map(String::as_str), Some("S18"));
        assert_eq!(allocation.seat_numbers.last().map(String::as_str), Some("S37"));
    }
}
