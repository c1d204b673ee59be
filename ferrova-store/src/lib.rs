pub mod app_config;
pub mod booking_repo;
pub mod catalog_repo;
pub mod database;
pub mod error;
pub mod journey_lock;

pub use booking_repo::{BookingReceipt, BookingStore, BookingSummary};
pub use catalog_repo::{TrainCatalog, TrainConnection, TrainSearch};
pub use database::Database;
pub use error::StoreError;
