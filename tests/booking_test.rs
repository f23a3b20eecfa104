mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use time::macros::datetime;
use uuid::Uuid;

use common::{booking_request, seeded_backend, FailingSink, RecordingSink, FRIDAY};
use scheduling_api::db::{AppointmentStatus, DatabaseError};
use scheduling_api::notifications::{LogNotificationSink, APPOINTMENT_CREATED};
use scheduling_api::scheduling::booking::create_appointment;
use scheduling_api::scheduling::business::{upsert_business_date_override, DateOverrideRequest};
use scheduling_api::scheduling::store::Backend;
use scheduling_api::scheduling::{RetryPolicy, SchedulingError};

fn fast_retries() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        backoff_step: Duration::from_millis(1),
    }
}

#[tokio::test]
async fn books_a_free_slot_and_notifies() {
    let (backend, service) = seeded_backend().await;
    let sink = RecordingSink::default();

    let created = create_appointment(
        &backend,
        &sink,
        fast_retries(),
        booking_request(&service, datetime!(2026-01-16 10:00 UTC)),
    )
    .await
    .unwrap();

    assert_eq!(created.end_time, datetime!(2026-01-16 10:30 UTC));
    assert_eq!(created.status, AppointmentStatus::Scheduled);
    assert_eq!(created.version, 0);
    assert_eq!(backend.transactions_started(), 1);

    let events = sink.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, APPOINTMENT_CREATED);
    assert_eq!(events[0].payload["appointmentId"], created.id.to_string());
    assert_eq!(events[0].payload["startTime"], "2026-01-16T10:00:00.000Z");
}

#[tokio::test]
async fn rejects_invalid_customer_data_before_touching_the_store() {
    let (backend, service) = seeded_backend().await;
    let mut request = booking_request(&service, datetime!(2026-01-16 10:00 UTC));
    request.customer_phone = "123".to_string();

    let err = create_appointment(&backend, &LogNotificationSink, fast_retries(), request)
        .await
        .unwrap_err();

    assert!(matches!(err, SchedulingError::Validation(_)));
    assert_eq!(backend.transactions_started(), 0);
}

#[tokio::test]
async fn unknown_service_is_not_found() {
    let (backend, service) = seeded_backend().await;
    let mut request = booking_request(&service, datetime!(2026-01-16 10:00 UTC));
    request.service_id = Uuid::now_v7();

    let err = create_appointment(&backend, &LogNotificationSink, fast_retries(), request)
        .await
        .unwrap_err();

    assert!(matches!(err, SchedulingError::NotFound(_)));
}

#[tokio::test]
async fn closed_date_override_is_a_conflict() {
    let (backend, service) = seeded_backend().await;
    {
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
    }

    let err = create_appointment(
        &backend,
        &LogNotificationSink,
        fast_retries(),
        booking_request(&service, datetime!(2026-01-16 10:00 UTC)),
    )
    .await
    .unwrap_err();

    match err {
        SchedulingError::Conflict(message) => assert!(message.contains(FRIDAY)),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn outside_hours_or_inside_a_break_is_a_validation_error() {
    let (backend, service) = seeded_backend().await;

    for start in [
        datetime!(2026-01-16 08:45 UTC),
        datetime!(2026-01-16 17:45 UTC),
        datetime!(2026-01-16 11:45 UTC),
        datetime!(2026-01-16 12:15 UTC),
        // Saturday has no configured hours
        datetime!(2026-01-17 10:00 UTC),
    ] {
        let err = create_appointment(
            &backend,
            &LogNotificationSink,
            fast_retries(),
            booking_request(&service, start),
        )
        .await
        .unwrap_err();
        assert!(
            matches!(err, SchedulingError::Validation(_)),
            "{start} should be rejected, got {err:?}"
        );
    }

    assert!(backend.appointments().await.is_empty());
}

#[tokio::test]
async fn overlapping_booking_is_a_conflict_but_adjacent_is_fine() {
    let (backend, service) = seeded_backend().await;
    let (backend, service) = (&backend, &service);
    let book = move |hour: i64, minute: i64| {
        let start = datetime!(2026-01-16 00:00 UTC)
            + time::Duration::hours(hour)
            + time::Duration::minutes(minute);
        create_appointment(
            backend,
            &LogNotificationSink,
            fast_retries(),
            booking_request(service, start),
        )
    };

    book(10, 0).await.unwrap();

    let err = book(10, 15).await.unwrap_err();
    assert!(matches!(err, SchedulingError::Conflict(ref m) if m == "Time slot already taken"));

    book(10, 30).await.unwrap();
    book(9, 30).await.unwrap();
    assert_eq!(backend.appointments().await.len(), 3);
}

#[tokio::test]
async fn retries_serialization_failures_until_commit_succeeds() {
    let (backend, service) = seeded_backend().await;
    backend.fail_next_commits(2);

    let created = create_appointment(
        &backend,
        &LogNotificationSink,
        fast_retries(),
        booking_request(&service, datetime!(2026-01-16 14:00 UTC)),
    )
    .await
    .unwrap();

    assert_eq!(backend.transactions_started(), 3);
    let stored = backend.appointments().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, created.id);
}

#[tokio::test]
async fn gives_up_after_max_attempts_with_the_storage_error() {
    let (backend, service) = seeded_backend().await;
    backend.fail_next_commits(5);

    let err = create_appointment(
        &backend,
        &LogNotificationSink,
        fast_retries(),
        booking_request(&service, datetime!(2026-01-16 14:00 UTC)),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        SchedulingError::Storage(DatabaseError::SerializationFailure(_))
    ));
    assert_eq!(backend.transactions_started(), 3);
    assert!(backend.appointments().await.is_empty());
}

#[tokio::test]
async fn concurrent_requests_for_one_slot_book_it_once() {
    let (backend, service) = seeded_backend().await;
    let request = booking_request(&service, datetime!(2026-01-16 15:00 UTC));

    let (first, second) = tokio::join!(
        create_appointment(&backend, &LogNotificationSink, fast_retries(), request.clone()),
        create_appointment(&backend, &LogNotificationSink, fast_retries(), request),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|r| matches!(r, Err(SchedulingError::Conflict(_)))));
    assert_eq!(backend.appointments().await.len(), 1);
}

#[tokio::test]
async fn notification_failure_does_not_undo_the_booking() {
    let (backend, service) = seeded_backend().await;
    let sink = FailingSink::default();

    let created = create_appointment(
        &backend,
        &sink,
        fast_retries(),
        booking_request(&service, datetime!(2026-01-16 16:00 UTC)),
    )
    .await
    .unwrap();

    assert_eq!(sink.attempts.load(Ordering::SeqCst), 1);
    assert_eq!(backend.appointments().await[0].id, created.id);
}

#[tokio::test]
async fn booking_that_would_end_past_the_calendar_is_rejected() {
    // 9999-12-31 is a Friday, so the seeded Friday hours apply
    let (backend, service) = seeded_backend().await;

    let err = create_appointment(
        &backend,
        &LogNotificationSink,
        fast_retries(),
        booking_request(&service, datetime!(9999-12-31 23:45 UTC)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));

    let created = create_appointment(
        &backend,
        &LogNotificationSink,
        fast_retries(),
        booking_request(&service, datetime!(9999-12-31 10:00 UTC)),
    )
    .await
    .unwrap();
    assert_eq!(created.end_time, datetime!(9999-12-31 10:30 UTC));
}
