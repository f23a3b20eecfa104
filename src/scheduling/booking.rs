//! Appointment creation under a serializable transaction.

use futures_util::FutureExt;
use tracing::{error, info};
use validator::Validate;

use crate::db::{Appointment, NewAppointment, NewAppointmentRequest};
use crate::notifications::{NotificationEvent, NotificationSink};
use crate::scheduling::calendar::load_day_schedule;
use crate::scheduling::error::{SchedulingError, SchedulingResult};
use crate::scheduling::slots::is_slot_within_business_hours;
use crate::scheduling::store::SchedulingStore;
use crate::scheduling::time::{add_minutes, assert_iso_date, format_iso_date, utc_date};
use crate::scheduling::transaction::{run_serializable, RetryPolicy, TransactionManager};

/// Books an appointment, replaying the transaction on serialization
/// failures per `policy`, then hands an `appointment.created` event to
/// `notifier`. A notification failure is logged and never undoes the
/// booking.
pub async fn create_appointment<M, N>(
    manager: &M,
    notifier: &N,
    policy: RetryPolicy,
    request: NewAppointmentRequest,
) -> SchedulingResult<Appointment>
where
    M: TransactionManager,
    N: NotificationSink + ?Sized,
{
    request.validate()?;

    let created = run_serializable(manager, policy, |tx| {
        let request = request.clone();
        async move { book_within(tx, &request).await }.boxed()
    })
    .await?;

    info!(
        appointment_id = %created.id,
        service_id = %created.service_id,
        start_time = %created.start_time,
        "Appointment created"
    );

    publish_created(notifier, &created).await;
    Ok(created)
}

/// One booking attempt against `store`, which must be a serializable
/// transaction for the conflict check to be race free.
pub async fn book_within<S>(store: &mut S, request: &NewAppointmentRequest) -> SchedulingResult<Appointment>
where
    S: SchedulingStore,
{
    let service = store
        .get_service(request.service_id)
        .await?
        .ok_or_else(|| SchedulingError::NotFound("Service not found".to_string()))?;

    let start_time = request.start_time;
    let end_time = add_minutes(start_time, i64::from(service.duration_in_minutes))?;

    let date = format_iso_date(utc_date(start_time));
    let day = assert_iso_date(&date)?;

    let resolved = load_day_schedule(store, day).await?;
    if resolved.closed_by_override() {
        return Err(SchedulingError::Conflict(format!(
            "Day unavailable: closed on {date}"
        )));
    }

    if !is_slot_within_business_hours(&date, resolved.schedule.as_ref(), start_time, end_time)? {
        return Err(SchedulingError::Validation(
            "Time outside configured schedule".to_string(),
        ));
    }

    if store
        .find_scheduled_conflict(start_time, end_time)
        .await?
        .is_some()
    {
        return Err(SchedulingError::Conflict(
            "Time slot already taken".to_string(),
        ));
    }

    let appointment = store
        .create_appointment(&NewAppointment {
            customer_name: request.customer_name.clone(),
            customer_phone: request.customer_phone.clone(),
            service_id: service.id,
            start_time,
            end_time,
        })
        .await?;

    Ok(appointment)
}

async fn publish_created<N>(notifier: &N, appointment: &Appointment)
where
    N: NotificationSink + ?Sized,
{
    let event = NotificationEvent::appointment_created(appointment);
    if let Err(err) = notifier.enqueue(event).await {
        error!(
            appointment_id = %appointment.id,
            error = %err,
            "Failed to enqueue appointment notification"
        );
    }
}
