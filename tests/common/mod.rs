#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use scheduling_api::db::memory::MemoryBackend;
use scheduling_api::db::{BreakWindow, BusinessHoursInput, NewAppointmentRequest, Service};
use scheduling_api::notifications::{NotificationError, NotificationEvent, NotificationSink};
use scheduling_api::scheduling::business::{replace_business_breaks, update_business_hours};
use scheduling_api::scheduling::store::Backend;

/// Friday, 2026-01-16.
pub const FRIDAY: &str = "2026-01-16";
pub const FRIDAY_DOW: i16 = 5;

/// Backend with one 30 minute service and Friday hours 09:00-18:00 with a
/// lunch break 12:00-13:00.
pub async fn seeded_backend() -> (MemoryBackend, Service) {
    let backend = MemoryBackend::new();
    let service = backend.insert_service("Haircut", 4500, 30).await;

    let mut session = backend.session().await.unwrap();
    update_business_hours(
        &mut session,
        &[BusinessHoursInput {
            day_of_week: FRIDAY_DOW,
            open_time: "09:00".to_string(),
            close_time: "18:00".to_string(),
            is_off: false,
        }],
    )
    .await
    .unwrap();
    replace_business_breaks(
        &mut session,
        FRIDAY_DOW,
        &[BreakWindow {
            start_time: "12:00".to_string(),
            end_time: "13:00".to_string(),
        }],
    )
    .await
    .unwrap();

    (backend, service)
}

pub fn booking_request(service: &Service, start_time: OffsetDateTime) -> NewAppointmentRequest {
    NewAppointmentRequest {
        customer_name: "Ana Souza".to_string(),
        customer_phone: "+5511999990000".to_string(),
        service_id: service.id,
        start_time,
    }
}

/// Sink that remembers every event it accepts.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<NotificationEvent>>,
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn enqueue(&self, event: NotificationEvent) -> Result<(), NotificationError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Sink whose every enqueue fails.
#[derive(Default)]
pub struct FailingSink {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl NotificationSink for FailingSink {
    async fn enqueue(&self, _event: NotificationEvent) -> Result<(), NotificationError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(NotificationError::Encode(
            serde_json::from_str::<serde_json::Value>("not json").unwrap_err(),
        ))
    }
}
