pub mod allocation;
pub mod capacity;
pub mod models;
pub mod pnr;

pub use allocation::{allocate, Allocation, SeatDecision};
pub use capacity::CapacitySnapshot;
pub use models::{
    Booking, BookingStatus, Gender, Passenger, PassengerDraft, PassengerStatus, RouteStop,
    Station, Train,
};
