use uuid::Uuid;

/// Storage-layer error taxonomy. The API layer maps these onto HTTP
/// statuses; the pure domain code in `ferrova-core` raises none of them.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("train {0} not found")]
    TrainNotFound(Uuid),

    #[error("booking {0} not found")]
    BookingNotFound(Uuid),

    #[error("invalid booking request: {0}")]
    InvalidRequest(String),

    /// Reservation-reference generation kept colliding with committed
    /// bookings. Transient; the caller may retry.
    #[error("could not allocate a unique reservation reference")]
    Conflict,

    #[error("corrupt stored value: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(value).map_err(|e| StoreError::Corrupt(format!("bad uuid {value}: {e}")))
}
