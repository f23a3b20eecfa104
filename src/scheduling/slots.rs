//! Slot grid generation and the booking-time schedule check.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::db::{Appointment, BreakWindow};
use crate::scheduling::calendar::EffectiveDaySchedule;
use crate::scheduling::error::{SchedulingError, SchedulingResult};
use crate::scheduling::time::{
    date_at_utc_time, minutes_duration, parse_time_to_minutes, to_iso, TimeError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub start_time: String,
    pub end_time: String,
}

/// A half-open `[start, end)` interval in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

impl Window {
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self { start, end }
    }

    /// Windows touching at an endpoint do not overlap.
    pub fn overlaps(&self, other: &Window) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }
}

impl From<&Appointment> for Window {
    fn from(appointment: &Appointment) -> Self {
        Window::new(appointment.start_time, appointment.end_time)
    }
}

pub fn overlaps(
    a_start: OffsetDateTime,
    a_end: OffsetDateTime,
    b_start: OffsetDateTime,
    b_end: OffsetDateTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Break windows of `date` as instants; degenerate windows are dropped.
fn break_windows(date: &str, breaks: &[BreakWindow]) -> Result<Vec<Window>, TimeError> {
    let mut windows = Vec::with_capacity(breaks.len());
    for window in breaks {
        let start = date_at_utc_time(date, &window.start_time)?;
        let end = date_at_utc_time(date, &window.end_time)?;
        if end > start {
            windows.push(Window::new(start, end));
        }
    }
    Ok(windows)
}

/// Largest accepted grid step, in minutes.
pub const MAX_INTERVAL_MINUTES: i64 = 240;

/// Lazily walks the interval grid from opening to closing time, yielding
/// the candidates that hit neither a break nor a busy window.
#[derive(Debug, Clone)]
pub struct SlotGrid {
    /// `None` once the grid has stepped past the representable range.
    next_start: Option<OffsetDateTime>,
    close_at: OffsetDateTime,
    duration: Duration,
    interval: Duration,
    blocked: Vec<Window>,
}

impl SlotGrid {
    fn exhausted() -> Self {
        Self {
            next_start: None,
            close_at: OffsetDateTime::UNIX_EPOCH,
            duration: Duration::ZERO,
            interval: Duration::ZERO,
            blocked: Vec::new(),
        }
    }
}

impl Iterator for SlotGrid {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        while let Some(start) = self.next_start {
            let end = start
                .checked_add(self.duration)
                .filter(|end| *end <= self.close_at)?;
            let candidate = Window::new(start, end);
            self.next_start = start.checked_add(self.interval);

            if self.blocked.iter().any(|blocked| candidate.overlaps(blocked)) {
                continue;
            }

            return Some(Slot {
                start_time: to_iso(candidate.start),
                end_time: to_iso(candidate.end),
            });
        }
        None
    }
}

/// Builds the slot grid for `date`. A missing or closed schedule, or one
/// whose closing time is not after its opening time, yields an empty grid.
pub fn slot_grid(
    date: &str,
    service_duration_minutes: i64,
    interval_minutes: i64,
    schedule: Option<&EffectiveDaySchedule>,
    busy: &[Window],
) -> SchedulingResult<SlotGrid> {
    let Some(schedule) = schedule.filter(|s| !s.is_off) else {
        return Ok(SlotGrid::exhausted());
    };

    let duration = minutes_duration(service_duration_minutes)
        .filter(|duration| duration.is_positive())
        .ok_or_else(|| {
            SchedulingError::Validation(
                "Service duration must be a positive number of minutes".to_string(),
            )
        })?;
    if !(1..=MAX_INTERVAL_MINUTES).contains(&interval_minutes) {
        return Err(SchedulingError::Validation(format!(
            "Slot interval must be between 1 and {MAX_INTERVAL_MINUTES} minutes"
        )));
    }

    if parse_time_to_minutes(&schedule.close_time)? <= parse_time_to_minutes(&schedule.open_time)? {
        return Ok(SlotGrid::exhausted());
    }

    let mut blocked = break_windows(date, &schedule.breaks)?;
    blocked.extend_from_slice(busy);

    Ok(SlotGrid {
        next_start: Some(date_at_utc_time(date, &schedule.open_time)?),
        close_at: date_at_utc_time(date, &schedule.close_time)?,
        duration,
        interval: Duration::minutes(interval_minutes),
        blocked,
    })
}

/// Free slots of `service_duration_minutes` on the `interval_minutes` grid,
/// in ascending start order. `appointments` are the busy windows of the
/// day's scheduled appointments.
pub fn calculate_available_slots(
    date: &str,
    service_duration_minutes: i64,
    interval_minutes: i64,
    schedule: Option<&EffectiveDaySchedule>,
    appointments: &[Window],
) -> SchedulingResult<Vec<Slot>> {
    Ok(slot_grid(
        date,
        service_duration_minutes,
        interval_minutes,
        schedule,
        appointments,
    )?
    .collect())
}

/// True when `[start_time, end_time)` sits inside the open hours of an open
/// day and clear of every break.
pub fn is_slot_within_business_hours(
    date: &str,
    schedule: Option<&EffectiveDaySchedule>,
    start_time: OffsetDateTime,
    end_time: OffsetDateTime,
) -> SchedulingResult<bool> {
    let Some(schedule) = schedule.filter(|s| !s.is_off) else {
        return Ok(false);
    };

    let open_at = date_at_utc_time(date, &schedule.open_time)?;
    let close_at = date_at_utc_time(date, &schedule.close_time)?;
    if start_time < open_at || end_time > close_at {
        return Ok(false);
    }

    let requested = Window::new(start_time, end_time);
    Ok(!break_windows(date, &schedule.breaks)?
        .iter()
        .any(|window| requested.overlaps(window)))
}
