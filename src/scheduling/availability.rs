//! Free-slot listing for a service on one UTC date.

use uuid::Uuid;

use crate::scheduling::calendar::load_day_schedule;
use crate::scheduling::error::{SchedulingError, SchedulingResult};
use crate::scheduling::slots::{calculate_available_slots, Slot, Window};
use crate::scheduling::store::SchedulingStore;
use crate::scheduling::time::assert_iso_date;

#[derive(Debug, Clone)]
pub struct SlotQuery {
    pub service_id: Uuid,
    pub date: String,
    pub interval_minutes: i64,
}

/// Free slots for a service on a date. Reads run outside any transaction
/// since nothing is written afterwards.
pub async fn get_available_slots<S>(store: &mut S, query: &SlotQuery) -> SchedulingResult<Vec<Slot>>
where
    S: SchedulingStore,
{
    let day = assert_iso_date(&query.date)?;

    let service = store
        .get_service(query.service_id)
        .await?
        .ok_or_else(|| SchedulingError::NotFound("Service not found".to_string()))?;

    let resolved = load_day_schedule(store, day).await?;
    let busy: Vec<Window> = store
        .list_scheduled_within_date(day)
        .await?
        .iter()
        .map(Window::from)
        .collect();

    calculate_available_slots(
        &query.date,
        i64::from(service.duration_in_minutes),
        query.interval_minutes,
        resolved.schedule.as_ref(),
        &busy,
    )
}
