//! Outbound notification events. Delivery happens elsewhere; the booking
//! protocol only hands events to a [`NotificationSink`] and never fails
//! because of it.

mod redis_queue;

pub use redis_queue::RedisNotificationQueue;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;

use crate::db::Appointment;
use crate::scheduling::time::{iso_millis, to_iso};

pub const APPOINTMENT_CREATED: &str = "appointment.created";

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Queue error: {0}")]
    Queue(#[from] redis::RedisError),

    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub name: String,
    pub payload: serde_json::Value,
    #[serde(with = "iso_millis")]
    pub enqueued_at: OffsetDateTime,
}

impl NotificationEvent {
    pub fn appointment_created(appointment: &Appointment) -> Self {
        Self {
            name: APPOINTMENT_CREATED.to_string(),
            payload: json!({
                "appointmentId": appointment.id,
                "customerName": appointment.customer_name,
                "customerPhone": appointment.customer_phone,
                "serviceId": appointment.service_id,
                "startTime": to_iso(appointment.start_time),
                "endTime": to_iso(appointment.end_time),
            }),
            enqueued_at: OffsetDateTime::now_utc(),
        }
    }
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn enqueue(&self, event: NotificationEvent) -> Result<(), NotificationError>;
}

/// Sink used when no queue is configured: events are only logged.
#[derive(Debug, Clone, Default)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn enqueue(&self, event: NotificationEvent) -> Result<(), NotificationError> {
        info!(event = %event.name, payload = %event.payload, "Notification event (no queue configured)");
        Ok(())
    }
}
