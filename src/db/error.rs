use thiserror::Error;

/// SQLSTATE codes Postgres raises when a serializable transaction loses a race.
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization failure: {0}")]
    SerializationFailure(String),
}

impl DatabaseError {
    /// True when the store aborted a transaction because a concurrent one
    /// committed first; the whole transaction may be replayed.
    pub fn is_serialization_failure(&self) -> bool {
        match self {
            DatabaseError::SerializationFailure(_) => true,
            DatabaseError::Sqlx(sqlx::Error::Database(db)) => matches!(
                db.code().as_deref(),
                Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED)
            ),
            _ => false,
        }
    }
}
