//! In-process backend implementing every scheduling store trait.
//!
//! Sessions and transactions hold the backend's single lock for as long as
//! they live, so transactions run one at a time and are serializable by
//! construction. Transactions work on a copy of the state that replaces the
//! shared state on commit; dropping one discards its writes.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::db::models::{
    Appointment, AppointmentStatus, BreakWindow, BusinessDateOverride, BusinessHours,
    BusinessHoursInput, DateOverrideInput, NewAppointment, Service,
};
use crate::db::DatabaseError;
use crate::scheduling::slots::overlaps;
use crate::scheduling::time::utc_day_bounds;
use crate::scheduling::store::{
    AppointmentStore, Backend, BusinessHoursStore, DateOverrideStore, ServiceStore, StoreResult,
};
use crate::scheduling::transaction::TransactionManager;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    services: HashMap<Uuid, Service>,
    business_hours: BTreeMap<i16, BusinessHours>,
    overrides: BTreeMap<Date, BusinessDateOverride>,
    appointments: BTreeMap<Uuid, Appointment>,
}

#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
    failing_commits: Arc<AtomicU32>,
    transactions_started: Arc<AtomicU32>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_service(&self, name: &str, price_in_cents: i32, duration_in_minutes: i32) -> Service {
        let service = Service {
            id: Uuid::now_v7(),
            name: name.to_string(),
            price_in_cents,
            duration_in_minutes,
        };
        self.state
            .lock()
            .await
            .services
            .insert(service.id, service.clone());
        service
    }

    /// The next `count` commits fail with a serialization failure, as if a
    /// concurrent transaction had won.
    pub fn fail_next_commits(&self, count: u32) {
        self.failing_commits.store(count, Ordering::SeqCst);
    }

    pub fn transactions_started(&self) -> u32 {
        self.transactions_started.load(Ordering::SeqCst)
    }

    pub async fn appointments(&self) -> Vec<Appointment> {
        self.state.lock().await.appointments.values().cloned().collect()
    }
}

/// Exclusive handle on the state. `staged` is set for transactions.
pub struct MemorySession {
    guard: OwnedMutexGuard<MemoryState>,
    staged: Option<MemoryState>,
}

impl MemorySession {
    fn state(&mut self) -> &mut MemoryState {
        match self.staged.as_mut() {
            Some(staged) => staged,
            None => &mut *self.guard,
        }
    }
}

#[async_trait]
impl TransactionManager for MemoryBackend {
    type Tx = MemorySession;

    async fn begin_serializable(&self) -> StoreResult<Self::Tx> {
        let guard = self.state.clone().lock_owned().await;
        self.transactions_started.fetch_add(1, Ordering::SeqCst);
        let staged = Some(guard.clone());
        Ok(MemorySession { guard, staged })
    }

    async fn commit(&self, mut tx: Self::Tx) -> StoreResult<()> {
        let injected = self
            .failing_commits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(DatabaseError::SerializationFailure(
                "could not serialize access due to read/write dependencies among transactions"
                    .to_string(),
            ));
        }

        if let Some(staged) = tx.staged.take() {
            *tx.guard = staged;
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    type Session = MemorySession;

    async fn session(&self) -> StoreResult<Self::Session> {
        Ok(MemorySession {
            guard: self.state.clone().lock_owned().await,
            staged: None,
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl ServiceStore for MemorySession {
    async fn get_service(&mut self, id: Uuid) -> StoreResult<Option<Service>> {
        Ok(self.state().services.get(&id).cloned())
    }
}

#[async_trait]
impl BusinessHoursStore for MemorySession {
    async fn get_by_day_of_week(&mut self, day_of_week: i16) -> StoreResult<Option<BusinessHours>> {
        Ok(self.state().business_hours.get(&day_of_week).cloned())
    }

    async fn list_business_hours(&mut self) -> StoreResult<Vec<BusinessHours>> {
        Ok(self.state().business_hours.values().cloned().collect())
    }

    async fn upsert_business_hours(&mut self, items: &[BusinessHoursInput]) -> StoreResult<()> {
        let state = self.state();
        for item in items {
            let entry = state
                .business_hours
                .entry(item.day_of_week)
                .or_insert_with(|| BusinessHours {
                    id: Uuid::now_v7(),
                    day_of_week: item.day_of_week,
                    open_time: String::new(),
                    close_time: String::new(),
                    is_off: false,
                    breaks: Vec::new(),
                });
            entry.open_time = item.open_time.clone();
            entry.close_time = item.close_time.clone();
            entry.is_off = item.is_off;
        }
        Ok(())
    }

    async fn replace_breaks(
        &mut self,
        day_of_week: i16,
        breaks: &[BreakWindow],
    ) -> StoreResult<Option<BusinessHours>> {
        Ok(self
            .state()
            .business_hours
            .get_mut(&day_of_week)
            .map(|hours| {
                hours.breaks = breaks.to_vec();
                hours.clone()
            }))
    }
}

#[async_trait]
impl DateOverrideStore for MemorySession {
    async fn get_by_date(&mut self, date: Date) -> StoreResult<Option<BusinessDateOverride>> {
        Ok(self.state().overrides.get(&date).cloned())
    }

    async fn list_overrides(&mut self) -> StoreResult<Vec<BusinessDateOverride>> {
        Ok(self.state().overrides.values().cloned().collect())
    }

    async fn upsert_override(&mut self, input: &DateOverrideInput) -> StoreResult<BusinessDateOverride> {
        let state = self.state();
        let id = state
            .overrides
            .get(&input.date)
            .map_or_else(Uuid::now_v7, |existing| existing.id);
        let saved = BusinessDateOverride {
            id,
            date: input.date,
            is_off: input.is_off,
            open_time: input.open_time.clone(),
            close_time: input.close_time.clone(),
        };
        state.overrides.insert(input.date, saved.clone());
        Ok(saved)
    }

    async fn delete_override(&mut self, date: Date) -> StoreResult<bool> {
        Ok(self.state().overrides.remove(&date).is_some())
    }
}

#[async_trait]
impl AppointmentStore for MemorySession {
    async fn list_scheduled_within_date(&mut self, date: Date) -> StoreResult<Vec<Appointment>> {
        let (day_start, day_end) = utc_day_bounds(date);

        let mut scheduled: Vec<Appointment> = self
            .state()
            .appointments
            .values()
            .filter(|a| a.status == AppointmentStatus::Scheduled)
            .filter(|a| overlaps(a.start_time, a.end_time, day_start, day_end))
            .cloned()
            .collect();
        scheduled.sort_by_key(|a| a.start_time);
        Ok(scheduled)
    }

    async fn find_scheduled_conflict(
        &mut self,
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
    ) -> StoreResult<Option<Uuid>> {
        Ok(self
            .state()
            .appointments
            .values()
            .find(|a| {
                a.status == AppointmentStatus::Scheduled
                    && overlaps(a.start_time, a.end_time, start_time, end_time)
            })
            .map(|a| a.id))
    }

    async fn create_appointment(&mut self, new: &NewAppointment) -> StoreResult<Appointment> {
        let state = self.state();
        if !state.services.contains_key(&new.service_id) {
            return Err(DatabaseError::InvalidInput(format!(
                "service {} does not exist",
                new.service_id
            )));
        }

        let now = OffsetDateTime::now_utc();
        let appointment = Appointment {
            id: Uuid::now_v7(),
            customer_name: new.customer_name.clone(),
            customer_phone: new.customer_phone.clone(),
            service_id: new.service_id,
            start_time: new.start_time,
            end_time: new.end_time,
            status: AppointmentStatus::Scheduled,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        state.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn find_appointment(&mut self, id: Uuid) -> StoreResult<Option<Appointment>> {
        Ok(self.state().appointments.get(&id).cloned())
    }

    async fn cancel_optimistic(&mut self, id: Uuid, expected_version: i32) -> StoreResult<bool> {
        let Some(appointment) = self.state().appointments.get_mut(&id) else {
            return Ok(false);
        };
        if appointment.version != expected_version || appointment.status != AppointmentStatus::Scheduled {
            return Ok(false);
        }

        appointment.status = AppointmentStatus::Canceled;
        appointment.version += 1;
        appointment.updated_at = OffsetDateTime::now_utc();
        Ok(true)
    }
}
