use ferrova_store::{BookingStore, Database, TrainCatalog};
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

/// Shared handles, constructed once in `main` (or a test harness) and
/// cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub bookings: Arc<BookingStore>,
    pub catalog: Arc<TrainCatalog>,
    pub auth: AuthConfig,
}
