//! Availability and booking engine.
//!
//! Pure parts (`time`, `calendar`, `slots`) compute schedules and slot
//! grids; the protocols (`booking`, `cancellation`) run against the store
//! traits in `store` and `transaction`, so they work unchanged over
//! Postgres or the in-memory backend.

pub mod availability;
pub mod booking;
pub mod business;
pub mod calendar;
pub mod cancellation;
pub mod error;
pub mod slots;
pub mod store;
pub mod time;
pub mod transaction;

pub use error::{SchedulingError, SchedulingResult};
pub use store::Backend;
pub use transaction::{RetryPolicy, TransactionManager};
