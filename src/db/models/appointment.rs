use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;
use validator::Validate;

use crate::scheduling::time::iso_millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "appointment_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub service_id: Uuid,
    #[serde(with = "iso_millis")]
    pub start_time: OffsetDateTime,
    #[serde(with = "iso_millis")]
    pub end_time: OffsetDateTime,
    pub status: AppointmentStatus,
    pub version: i32,
    #[serde(with = "iso_millis")]
    pub created_at: OffsetDateTime,
    #[serde(with = "iso_millis")]
    pub updated_at: OffsetDateTime,
}

/// A booking request as submitted by a customer. The end time is derived
/// from the service duration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointmentRequest {
    #[validate(length(min = 1, max = 200, message = "customerName must have 1 to 200 characters"))]
    pub customer_name: String,
    #[validate(length(min = 6, max = 30, message = "customerPhone must have 6 to 30 characters"))]
    pub customer_phone: String,
    pub service_id: Uuid,
    #[serde(with = "iso_millis")]
    pub start_time: OffsetDateTime,
}

/// Row about to be inserted, always as `Scheduled` with version 0.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub customer_name: String,
    pub customer_phone: String,
    pub service_id: Uuid,
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
}
