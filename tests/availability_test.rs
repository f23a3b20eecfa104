mod common;

use time::macros::datetime;
use uuid::Uuid;

use common::{booking_request, seeded_backend, FRIDAY, FRIDAY_DOW};
use scheduling_api::db::{BreakWindow, BusinessHoursInput};
use scheduling_api::notifications::LogNotificationSink;
use scheduling_api::scheduling::availability::{get_available_slots, SlotQuery};
use scheduling_api::scheduling::booking::create_appointment;
use scheduling_api::scheduling::business::{
    delete_business_date_override, list_business_date_overrides, list_business_hours,
    replace_business_breaks, update_business_hours, upsert_business_date_override,
    DateOverrideRequest,
};
use scheduling_api::scheduling::cancellation::cancel_appointment;
use scheduling_api::scheduling::store::Backend;
use scheduling_api::scheduling::{RetryPolicy, SchedulingError};

fn query(service_id: Uuid, date: &str) -> SlotQuery {
    SlotQuery {
        service_id,
        date: date.to_string(),
        interval_minutes: 30,
    }
}

#[tokio::test]
async fn slots_skip_the_break_and_booked_appointments() {
    let (backend, service) = seeded_backend().await;
    let booked = create_appointment(
        &backend,
        &LogNotificationSink,
        RetryPolicy::default(),
        booking_request(&service, datetime!(2026-01-16 09:30 UTC)),
    )
    .await
    .unwrap();

    let mut session = backend.session().await.unwrap();
    let slots = get_available_slots(&mut session, &query(service.id, FRIDAY))
        .await
        .unwrap();

    // 09:00-18:00 on a 30 minute grid, minus lunch and the 09:30 booking
    assert_eq!(slots.len(), 18 - 2 - 1);
    assert_eq!(slots[0].start_time, "2026-01-16T09:00:00.000Z");
    assert_eq!(slots[1].start_time, "2026-01-16T10:00:00.000Z");
    assert!(slots.iter().all(|s| !s.start_time.contains("T12:")));
    assert_eq!(slots.last().unwrap().end_time, "2026-01-16T18:00:00.000Z");

    cancel_appointment(&mut session, booked.id, booked.version)
        .await
        .unwrap();
    let after_cancel = get_available_slots(&mut session, &query(service.id, FRIDAY))
        .await
        .unwrap();
    assert_eq!(after_cancel.len(), 16);
}

#[tokio::test]
async fn slots_reject_bad_input() {
    let (backend, service) = seeded_backend().await;
    let mut session = backend.session().await.unwrap();

    let bad_date = get_available_slots(&mut session, &query(service.id, "2026-02-30")).await;
    assert!(matches!(bad_date, Err(SchedulingError::Validation(_))));

    let unknown = get_available_slots(&mut session, &query(Uuid::now_v7(), FRIDAY)).await;
    assert!(matches!(unknown, Err(SchedulingError::NotFound(_))));

    let mut zero_interval = query(service.id, FRIDAY);
    zero_interval.interval_minutes = 0;
    let zero = get_available_slots(&mut session, &zero_interval).await;
    assert!(matches!(zero, Err(SchedulingError::Validation(_))));

    let mut huge_interval = query(service.id, FRIDAY);
    huge_interval.interval_minutes = 1_000_000_000_000;
    let huge = get_available_slots(&mut session, &huge_interval).await;
    assert!(matches!(huge, Err(SchedulingError::Validation(_))));
}

#[tokio::test]
async fn slots_on_the_last_calendar_day() {
    // 9999-12-31 is a Friday
    let (backend, service) = seeded_backend().await;
    let mut session = backend.session().await.unwrap();

    let slots = get_available_slots(&mut session, &query(service.id, "9999-12-31"))
        .await
        .unwrap();
    assert_eq!(slots[0].start_time, "9999-12-31T09:00:00.000Z");
    assert_eq!(slots.last().unwrap().end_time, "9999-12-31T18:00:00.000Z");
}

#[tokio::test]
async fn overrides_close_reopen_and_reshape_a_day() {
    let (backend, service) = seeded_backend().await;
    let mut session = backend.session().await.unwrap();

    upsert_business_date_override(
        &mut session,
        FRIDAY,
        DateOverrideRequest {
            is_off: true,
            ..DateOverrideRequest::default()
        },
    )
    .await
    .unwrap();
    let closed = get_available_slots(&mut session, &query(service.id, FRIDAY))
        .await
        .unwrap();
    assert!(closed.is_empty());

    upsert_business_date_override(
        &mut session,
        FRIDAY,
        DateOverrideRequest {
            is_off: false,
            open_time: Some("11:00".to_string()),
            close_time: Some("14:00".to_string()),
        },
    )
    .await
    .unwrap();
    let short_day = get_available_slots(&mut session, &query(service.id, FRIDAY))
        .await
        .unwrap();
    // Weekly lunch break still applies
    let starts: Vec<&str> = short_day.iter().map(|s| &s.start_time[11..16]).collect();
    assert_eq!(starts, vec!["11:00", "11:30", "13:00", "13:30"]);

    assert_eq!(list_business_date_overrides(&mut session).await.unwrap().len(), 1);
    delete_business_date_override(&mut session, FRIDAY).await.unwrap();
    assert!(list_business_date_overrides(&mut session).await.unwrap().is_empty());

    let missing = delete_business_date_override(&mut session, FRIDAY).await;
    assert!(matches!(missing, Err(SchedulingError::NotFound(_))));
}

#[tokio::test]
async fn override_validation() {
    let (backend, _) = seeded_backend().await;
    let mut session = backend.session().await.unwrap();

    let half = upsert_business_date_override(
        &mut session,
        FRIDAY,
        DateOverrideRequest {
            is_off: false,
            open_time: Some("10:00".to_string()),
            close_time: None,
        },
    )
    .await;
    assert!(matches!(half, Err(SchedulingError::Validation(_))));

    let inverted = upsert_business_date_override(
        &mut session,
        FRIDAY,
        DateOverrideRequest {
            is_off: false,
            open_time: Some("14:00".to_string()),
            close_time: Some("10:00".to_string()),
        },
    )
    .await;
    assert!(matches!(inverted, Err(SchedulingError::Validation(_))));

    // Saturday has no weekly hours to borrow
    let reopen_unconfigured = upsert_business_date_override(
        &mut session,
        "2026-01-17",
        DateOverrideRequest::default(),
    )
    .await;
    assert!(matches!(reopen_unconfigured, Err(SchedulingError::NotFound(_))));

    let bad_date =
        upsert_business_date_override(&mut session, "16/01/2026", DateOverrideRequest::default())
            .await;
    assert!(matches!(bad_date, Err(SchedulingError::Validation(_))));
}

#[tokio::test]
async fn business_hours_updates_keep_breaks_and_validate_input() {
    let (backend, _) = seeded_backend().await;
    let mut session = backend.session().await.unwrap();

    let updated = update_business_hours(
        &mut session,
        &[
            BusinessHoursInput {
                day_of_week: FRIDAY_DOW,
                open_time: "08:00".to_string(),
                close_time: "16:00".to_string(),
                is_off: false,
            },
            BusinessHoursInput {
                day_of_week: 0,
                open_time: "00:00".to_string(),
                close_time: "00:00".to_string(),
                is_off: true,
            },
        ],
    )
    .await
    .unwrap();
    assert_eq!(updated.len(), 2);
    assert_eq!(updated[0].day_of_week, 0);
    let friday = &updated[1];
    assert_eq!(friday.open_time, "08:00");
    assert_eq!(friday.breaks.len(), 1);

    let inverted = update_business_hours(
        &mut session,
        &[BusinessHoursInput {
            day_of_week: 1,
            open_time: "18:00".to_string(),
            close_time: "09:00".to_string(),
            is_off: false,
        }],
    )
    .await;
    assert!(matches!(inverted, Err(SchedulingError::Validation(_))));

    let out_of_range = update_business_hours(
        &mut session,
        &[BusinessHoursInput {
            day_of_week: 7,
            open_time: "09:00".to_string(),
            close_time: "18:00".to_string(),
            is_off: false,
        }],
    )
    .await;
    assert!(matches!(out_of_range, Err(SchedulingError::Validation(_))));

    let empty = update_business_hours(&mut session, &[]).await;
    assert!(matches!(empty, Err(SchedulingError::Validation(_))));

    assert_eq!(list_business_hours(&mut session).await.unwrap().len(), 2);
}

#[tokio::test]
async fn replacing_breaks_requires_configured_hours() {
    let (backend, _) = seeded_backend().await;
    let mut session = backend.session().await.unwrap();

    let replaced = replace_business_breaks(
        &mut session,
        FRIDAY_DOW,
        &[
            BreakWindow {
                start_time: "10:00".to_string(),
                end_time: "10:15".to_string(),
            },
            BreakWindow {
                start_time: "15:00".to_string(),
                end_time: "15:30".to_string(),
            },
        ],
    )
    .await
    .unwrap();
    assert_eq!(replaced.breaks.len(), 2);

    let unconfigured = replace_business_breaks(&mut session, 2, &[]).await;
    assert!(matches!(unconfigured, Err(SchedulingError::NotFound(_))));

    let malformed = replace_business_breaks(
        &mut session,
        FRIDAY_DOW,
        &[BreakWindow {
            start_time: "3pm".to_string(),
            end_time: "15:30".to_string(),
        }],
    )
    .await;
    assert!(matches!(malformed, Err(SchedulingError::Validation(_))));
}
