//! Weekly hours, breaks and per-date overrides.

use tracing::info;
use validator::Validate;

use crate::db::{BreakWindow, BusinessDateOverride, BusinessHours, BusinessHoursInput, DateOverrideInput};
use crate::scheduling::error::{SchedulingError, SchedulingResult};
use crate::scheduling::store::{BusinessHoursStore, DateOverrideStore};
use crate::scheduling::time::{assert_iso_date, parse_time_to_minutes};

/// Requires `close_time` strictly after `open_time`.
fn ensure_opening_window(open_time: &str, close_time: &str) -> SchedulingResult<()> {
    if parse_time_to_minutes(close_time)? <= parse_time_to_minutes(open_time)? {
        return Err(SchedulingError::Validation(
            "closeTime must be later than openTime".to_string(),
        ));
    }
    Ok(())
}

pub async fn list_business_hours<S>(store: &mut S) -> SchedulingResult<Vec<BusinessHours>>
where
    S: BusinessHoursStore,
{
    Ok(store.list_business_hours().await?)
}

/// Batch upsert keyed by day of week. Times are always checked for format;
/// the ordering rule only applies to days that are open.
pub async fn update_business_hours<S>(
    store: &mut S,
    items: &[BusinessHoursInput],
) -> SchedulingResult<Vec<BusinessHours>>
where
    S: BusinessHoursStore,
{
    if items.is_empty() || items.len() > 7 {
        return Err(SchedulingError::Validation(
            "Provide between 1 and 7 weekdays".to_string(),
        ));
    }

    for item in items {
        item.validate()?;
        if item.is_off {
            parse_time_to_minutes(&item.open_time)?;
            parse_time_to_minutes(&item.close_time)?;
        } else {
            ensure_opening_window(&item.open_time, &item.close_time)?;
        }
    }

    store.upsert_business_hours(items).await?;
    info!(days = items.len(), "Business hours updated");

    Ok(store.list_business_hours().await?)
}

pub async fn replace_business_breaks<S>(
    store: &mut S,
    day_of_week: i16,
    breaks: &[BreakWindow],
) -> SchedulingResult<BusinessHours>
where
    S: BusinessHoursStore,
{
    if !(0..=6).contains(&day_of_week) {
        return Err(SchedulingError::Validation(
            "dayOfWeek must be between 0 and 6".to_string(),
        ));
    }
    for window in breaks {
        parse_time_to_minutes(&window.start_time)?;
        parse_time_to_minutes(&window.end_time)?;
    }

    store
        .replace_breaks(day_of_week, breaks)
        .await?
        .ok_or_else(|| {
            SchedulingError::NotFound(format!(
                "Business hours not configured for day {day_of_week}"
            ))
        })
}

pub async fn list_business_date_overrides<S>(store: &mut S) -> SchedulingResult<Vec<BusinessDateOverride>>
where
    S: DateOverrideStore,
{
    Ok(store.list_overrides().await?)
}

#[derive(Debug, Clone, Default)]
pub struct DateOverrideRequest {
    pub is_off: bool,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
}

/// Creates or replaces the override for `date`.
///
/// Reopening a date without explicit times borrows the weekly hours, so
/// those must exist for that weekday.
pub async fn upsert_business_date_override<S>(
    store: &mut S,
    date: &str,
    request: DateOverrideRequest,
) -> SchedulingResult<BusinessDateOverride>
where
    S: BusinessHoursStore + DateOverrideStore,
{
    let day = assert_iso_date(date)?;

    match (&request.open_time, &request.close_time) {
        (Some(open_time), Some(close_time)) => ensure_opening_window(open_time, close_time)?,
        (None, None) => {
            if !request.is_off {
                let day_of_week = i16::from(day.weekday().number_days_from_sunday());
                if store.get_by_day_of_week(day_of_week).await?.is_none() {
                    return Err(SchedulingError::NotFound(format!(
                        "Configure business hours for day {day_of_week} before opening {date} without times"
                    )));
                }
            }
        }
        _ => {
            return Err(SchedulingError::Validation(
                "openTime and closeTime must be provided together".to_string(),
            ))
        }
    }

    let saved = store
        .upsert_override(&DateOverrideInput {
            date: day,
            is_off: request.is_off,
            open_time: request.open_time,
            close_time: request.close_time,
        })
        .await?;

    info!(date = %date, is_off = saved.is_off, "Date override saved");
    Ok(saved)
}

pub async fn delete_business_date_override<S>(store: &mut S, date: &str) -> SchedulingResult<()>
where
    S: DateOverrideStore,
{
    let day = assert_iso_date(date)?;
    if !store.delete_override(day).await? {
        return Err(SchedulingError::NotFound(format!(
            "No override configured for {date}"
        )));
    }
    Ok(())
}
