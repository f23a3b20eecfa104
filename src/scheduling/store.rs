//! Storage capabilities the scheduling core is written against.
//!
//! Every method takes `&mut self` so the same traits serve a pooled
//! connection and an open transaction.

use async_trait::async_trait;
use uuid::Uuid;
use time::{Date, OffsetDateTime};

use crate::db::{
    Appointment, BreakWindow, BusinessDateOverride, BusinessHours, BusinessHoursInput,
    DatabaseError, DateOverrideInput, NewAppointment, Service,
};
use crate::scheduling::transaction::TransactionManager;

pub type StoreResult<T> = Result<T, DatabaseError>;

#[async_trait]
pub trait ServiceStore: Send {
    async fn get_service(&mut self, id: Uuid) -> StoreResult<Option<Service>>;
}

#[async_trait]
pub trait BusinessHoursStore: Send {
    async fn get_by_day_of_week(&mut self, day_of_week: i16) -> StoreResult<Option<BusinessHours>>;

    async fn list_business_hours(&mut self) -> StoreResult<Vec<BusinessHours>>;

    /// Inserts or updates each weekday, leaving existing breaks in place.
    async fn upsert_business_hours(&mut self, items: &[BusinessHoursInput]) -> StoreResult<()>;

    /// Returns `None` when the weekday has no hours configured.
    async fn replace_breaks(
        &mut self,
        day_of_week: i16,
        breaks: &[BreakWindow],
    ) -> StoreResult<Option<BusinessHours>>;
}

#[async_trait]
pub trait DateOverrideStore: Send {
    async fn get_by_date(&mut self, date: Date) -> StoreResult<Option<BusinessDateOverride>>;

    async fn list_overrides(&mut self) -> StoreResult<Vec<BusinessDateOverride>>;

    async fn upsert_override(&mut self, input: &DateOverrideInput) -> StoreResult<BusinessDateOverride>;

    /// Returns whether a row was removed.
    async fn delete_override(&mut self, date: Date) -> StoreResult<bool>;
}

#[async_trait]
pub trait AppointmentStore: Send {
    /// Scheduled appointments whose window intersects the UTC day `date`.
    async fn list_scheduled_within_date(&mut self, date: Date) -> StoreResult<Vec<Appointment>>;

    /// Any scheduled appointment with `start < end_time && end > start_time`.
    async fn find_scheduled_conflict(
        &mut self,
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
    ) -> StoreResult<Option<Uuid>>;

    async fn create_appointment(&mut self, new: &NewAppointment) -> StoreResult<Appointment>;

    async fn find_appointment(&mut self, id: Uuid) -> StoreResult<Option<Appointment>>;

    /// Single conditional update to `Canceled`, bumping the version. Matches
    /// only a scheduled row at `expected_version`; returns whether it did.
    async fn cancel_optimistic(&mut self, id: Uuid, expected_version: i32) -> StoreResult<bool>;
}

pub trait SchedulingStore: ServiceStore + BusinessHoursStore + DateOverrideStore + AppointmentStore {}

impl<T> SchedulingStore for T where
    T: ServiceStore + BusinessHoursStore + DateOverrideStore + AppointmentStore
{
}

/// A storage backend: hands out autocommit sessions for reads and
/// configuration writes, and serializable transactions for booking.
#[async_trait]
pub trait Backend: TransactionManager + Clone + 'static {
    type Session: SchedulingStore;

    async fn session(&self) -> StoreResult<Self::Session>;

    async fn ping(&self) -> StoreResult<()>;
}
