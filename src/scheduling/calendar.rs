//! Merges weekly business hours with a per-date override into the schedule
//! that actually applies on one concrete date.

use time::Date;

use crate::db::{BreakWindow, BusinessDateOverride, BusinessHours};
use crate::scheduling::store::{BusinessHoursStore, DateOverrideStore, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveDaySchedule {
    pub open_time: String,
    pub close_time: String,
    pub is_off: bool,
    pub breaks: Vec<BreakWindow>,
}

impl EffectiveDaySchedule {
    pub fn closed() -> Self {
        Self {
            open_time: "00:00".to_string(),
            close_time: "00:00".to_string(),
            is_off: true,
            breaks: Vec::new(),
        }
    }
}

/// The schedule for a date together with the override it was derived from.
#[derive(Debug, Clone, Default)]
pub struct ResolvedDay {
    pub schedule: Option<EffectiveDaySchedule>,
    pub date_override: Option<BusinessDateOverride>,
}

impl ResolvedDay {
    pub fn closed_by_override(&self) -> bool {
        is_closed_by_override(self.date_override.as_ref())
    }
}

pub fn is_closed_by_override(date_override: Option<&BusinessDateOverride>) -> bool {
    date_override.is_some_and(|o| o.is_off)
}

/// Resolution order:
/// 1. an override marked off closes the day outright;
/// 2. otherwise weekly hours apply, with the override's open/close times
///    (when given) replacing the weekly ones and the weekly breaks kept;
/// 3. without weekly hours the day is unconfigured (`None`).
pub fn resolve_day_schedule(
    weekly: Option<&BusinessHours>,
    date_override: Option<&BusinessDateOverride>,
) -> Option<EffectiveDaySchedule> {
    if is_closed_by_override(date_override) {
        return Some(EffectiveDaySchedule::closed());
    }

    let weekly = weekly?;
    let open_time = date_override
        .and_then(|o| o.open_time.clone())
        .unwrap_or_else(|| weekly.open_time.clone());
    let close_time = date_override
        .and_then(|o| o.close_time.clone())
        .unwrap_or_else(|| weekly.close_time.clone());

    Some(EffectiveDaySchedule {
        open_time,
        close_time,
        is_off: date_override.map_or(weekly.is_off, |o| o.is_off),
        breaks: weekly.breaks.clone(),
    })
}

/// Reads the weekly hours and override for `date` from `store` and resolves
/// them. Booking calls this with its transaction so the reads share the
/// snapshot of the conflict check.
pub async fn load_day_schedule<S>(store: &mut S, date: Date) -> StoreResult<ResolvedDay>
where
    S: BusinessHoursStore + DateOverrideStore,
{
    let day_of_week = i16::from(date.weekday().number_days_from_sunday());
    let weekly = store.get_by_day_of_week(day_of_week).await?;
    let date_override = store.get_by_date(date).await?;

    Ok(ResolvedDay {
        schedule: resolve_day_schedule(weekly.as_ref(), date_override.as_ref()),
        date_override,
    })
}
