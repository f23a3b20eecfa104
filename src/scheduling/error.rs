use thiserror::Error;

use crate::db::DatabaseError;
use crate::scheduling::time::TimeError;

/// Failures surfaced by the scheduling core.
///
/// `Storage` carries the store's own error untouched, so callers can tell a
/// business rejection from an infrastructure failure.
#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

impl From<TimeError> for SchedulingError {
    fn from(err: TimeError) -> Self {
        SchedulingError::Validation(err.to_string())
    }
}

impl From<validator::ValidationErrors> for SchedulingError {
    fn from(err: validator::ValidationErrors) -> Self {
        SchedulingError::Validation(err.to_string())
    }
}

pub type SchedulingResult<T> = Result<T, SchedulingError>;
