use uuid::Uuid;
use tracing::info;

use crate::db::Appointment;
use crate::scheduling::error::{SchedulingError, SchedulingResult};
use crate::scheduling::store::AppointmentStore;

/// Cancels a scheduled appointment if it is still at `expected_version`.
///
/// A wrong version, an already canceled appointment and an unknown id all
/// produce the same conflict, so callers learn nothing about which one
/// applied.
pub async fn cancel_appointment<S>(store: &mut S, id: Uuid, expected_version: i32) -> SchedulingResult<Appointment>
where
    S: AppointmentStore,
{
    if !store.cancel_optimistic(id, expected_version).await? {
        return Err(SchedulingError::Conflict(
            "Version mismatch or appointment not found/already canceled".to_string(),
        ));
    }

    let appointment = store
        .find_appointment(id)
        .await?
        .ok_or_else(|| SchedulingError::NotFound("Appointment not found".to_string()))?;

    info!(appointment_id = %id, version = appointment.version, "Appointment canceled");
    Ok(appointment)
}

pub async fn get_appointment<S>(store: &mut S, id: Uuid) -> SchedulingResult<Appointment>
where
    S: AppointmentStore,
{
    store
        .find_appointment(id)
        .await?
        .ok_or_else(|| SchedulingError::NotFound("Appointment not found".to_string()))
}
