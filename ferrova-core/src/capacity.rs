use serde::{Deserialize, Serialize};

/// Point-in-time view of one capacity pool (one train on one journey
/// date). `confirmed_seats` is the sum of `passenger_count` over all
/// confirmed bookings for that pool; cancelled and waitlisted bookings
/// never contribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacitySnapshot {
    pub total_seats: u32,
    pub confirmed_seats: u32,
}

impl CapacitySnapshot {
    pub fn new(total_seats: u32, confirmed_seats: u32) -> Self {
        Self {
            total_seats,
            confirmed_seats,
        }
    }

    /// Seats still open for sale. Saturates at zero so a historically
    /// overbooked pool reads as full rather than negative.
    pub fn available(&self) -> u32 {
        self.total_seats.saturating_sub(self.confirmed_seats)
    }
}
