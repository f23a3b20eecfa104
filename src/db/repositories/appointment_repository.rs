use sqlx::{Error, PgConnection};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::db::models::{Appointment, AppointmentStatus, NewAppointment};
use crate::scheduling::time::utc_day_bounds;

const APPOINTMENT_COLUMNS: &str = "id, customer_name, customer_phone, service_id, start_time, end_time, \
     status, version, created_at, updated_at";

pub struct AppointmentRepository;

impl AppointmentRepository {
    pub async fn list_scheduled_within_date(conn: &mut PgConnection, date: Date) -> Result<Vec<Appointment>, Error> {
        let (day_start, day_end) = utc_day_bounds(date);

        sqlx::query_as::<_, Appointment>(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments
            WHERE status = $1 AND start_time < $3 AND end_time > $2
            ORDER BY start_time ASC
            "#
        ))
        .bind(AppointmentStatus::Scheduled)
        .bind(day_start)
        .bind(day_end)
        .fetch_all(conn)
        .await
    }

    pub async fn find_scheduled_conflict(
        conn: &mut PgConnection,
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
    ) -> Result<Option<Uuid>, Error> {
        sqlx::query_scalar(
            r#"
            SELECT id
            FROM appointments
            WHERE status = $1 AND start_time < $3 AND end_time > $2
            LIMIT 1
            "#,
        )
        .bind(AppointmentStatus::Scheduled)
        .bind(start_time)
        .bind(end_time)
        .fetch_optional(conn)
        .await
    }

    pub async fn create(conn: &mut PgConnection, new: &NewAppointment) -> Result<Appointment, Error> {
        sqlx::query_as::<_, Appointment>(&format!(
            r#"
            INSERT INTO appointments (customer_name, customer_phone, service_id, start_time, end_time, status, version)
            VALUES ($1, $2, $3, $4, $5, $6, 0)
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(&new.customer_name)
        .bind(&new.customer_phone)
        .bind(new.service_id)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(AppointmentStatus::Scheduled)
        .fetch_one(conn)
        .await
    }

    pub async fn find_by_id(conn: &mut PgConnection, appointment_id: Uuid) -> Result<Option<Appointment>, Error> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(appointment_id)
        .fetch_optional(conn)
        .await
    }

    /// Compare-and-swap in one statement: only a scheduled row still at
    /// `expected_version` is canceled.
    pub async fn cancel_optimistic(
        conn: &mut PgConnection,
        appointment_id: Uuid,
        expected_version: i32,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE appointments
            SET status = $3, version = version + 1, updated_at = NOW()
            WHERE id = $1 AND version = $2 AND status = $4
            "#,
        )
        .bind(appointment_id)
        .bind(expected_version)
        .bind(AppointmentStatus::Canceled)
        .bind(AppointmentStatus::Scheduled)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
