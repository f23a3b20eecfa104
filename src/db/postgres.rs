//! Postgres implementation of the scheduling store traits.

use std::ops::DerefMut;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::db::models::{
    Appointment, BreakWindow, BusinessDateOverride, BusinessHours, BusinessHoursInput,
    DateOverrideInput, NewAppointment, Service,
};
use crate::db::repositories::{
    AppointmentRepository, BusinessHoursRepository, DateOverrideRepository, ServiceRepository,
};
use crate::scheduling::store::{
    AppointmentStore, Backend, BusinessHoursStore, DateOverrideStore, ServiceStore, StoreResult,
};
use crate::scheduling::transaction::TransactionManager;

#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Store view over anything that dereferences to a Postgres connection: a
/// pooled connection (autocommit) or an open transaction.
pub struct PgSession<C> {
    conn: C,
}

impl<C> PgSession<C>
where
    C: DerefMut<Target = PgConnection>,
{
    fn conn(&mut self) -> &mut PgConnection {
        &mut self.conn
    }
}

pub type PgTransaction = PgSession<Transaction<'static, Postgres>>;

#[async_trait]
impl TransactionManager for PgBackend {
    type Tx = PgTransaction;

    async fn begin_serializable(&self) -> StoreResult<Self::Tx> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;
        Ok(PgSession { conn: tx })
    }

    async fn commit(&self, tx: Self::Tx) -> StoreResult<()> {
        tx.conn.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl Backend for PgBackend {
    type Session = PgSession<PoolConnection<Postgres>>;

    async fn session(&self) -> StoreResult<Self::Session> {
        Ok(PgSession {
            conn: self.pool.acquire().await?,
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl<C> ServiceStore for PgSession<C>
where
    C: DerefMut<Target = PgConnection> + Send,
{
    async fn get_service(&mut self, id: Uuid) -> StoreResult<Option<Service>> {
        Ok(ServiceRepository::get_by_id(self.conn(), id).await?)
    }
}

#[async_trait]
impl<C> BusinessHoursStore for PgSession<C>
where
    C: DerefMut<Target = PgConnection> + Send,
{
    async fn get_by_day_of_week(&mut self, day_of_week: i16) -> StoreResult<Option<BusinessHours>> {
        Ok(BusinessHoursRepository::get_by_day_of_week(self.conn(), day_of_week).await?)
    }

    async fn list_business_hours(&mut self) -> StoreResult<Vec<BusinessHours>> {
        Ok(BusinessHoursRepository::list(self.conn()).await?)
    }

    async fn upsert_business_hours(&mut self, items: &[BusinessHoursInput]) -> StoreResult<()> {
        Ok(BusinessHoursRepository::upsert_many(self.conn(), items).await?)
    }

    async fn replace_breaks(
        &mut self,
        day_of_week: i16,
        breaks: &[BreakWindow],
    ) -> StoreResult<Option<BusinessHours>> {
        if !BusinessHoursRepository::replace_breaks(self.conn(), day_of_week, breaks).await? {
            return Ok(None);
        }
        Ok(BusinessHoursRepository::get_by_day_of_week(self.conn(), day_of_week).await?)
    }
}

#[async_trait]
impl<C> DateOverrideStore for PgSession<C>
where
    C: DerefMut<Target = PgConnection> + Send,
{
    async fn get_by_date(&mut self, date: Date) -> StoreResult<Option<BusinessDateOverride>> {
        Ok(DateOverrideRepository::get_by_date(self.conn(), date).await?)
    }

    async fn list_overrides(&mut self) -> StoreResult<Vec<BusinessDateOverride>> {
        Ok(DateOverrideRepository::list(self.conn()).await?)
    }

    async fn upsert_override(&mut self, input: &DateOverrideInput) -> StoreResult<BusinessDateOverride> {
        Ok(DateOverrideRepository::upsert(self.conn(), input).await?)
    }

    async fn delete_override(&mut self, date: Date) -> StoreResult<bool> {
        Ok(DateOverrideRepository::delete(self.conn(), date).await?)
    }
}

#[async_trait]
impl<C> AppointmentStore for PgSession<C>
where
    C: DerefMut<Target = PgConnection> + Send,
{
    async fn list_scheduled_within_date(&mut self, date: Date) -> StoreResult<Vec<Appointment>> {
        Ok(AppointmentRepository::list_scheduled_within_date(self.conn(), date).await?)
    }

    async fn find_scheduled_conflict(
        &mut self,
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
    ) -> StoreResult<Option<Uuid>> {
        Ok(AppointmentRepository::find_scheduled_conflict(self.conn(), start_time, end_time).await?)
    }

    async fn create_appointment(&mut self, new: &NewAppointment) -> StoreResult<Appointment> {
        Ok(AppointmentRepository::create(self.conn(), new).await?)
    }

    async fn find_appointment(&mut self, id: Uuid) -> StoreResult<Option<Appointment>> {
        Ok(AppointmentRepository::find_by_id(self.conn(), id).await?)
    }

    async fn cancel_optimistic(&mut self, id: Uuid, expected_version: i32) -> StoreResult<bool> {
        Ok(AppointmentRepository::cancel_optimistic(self.conn(), id, expected_version).await?)
    }
}
