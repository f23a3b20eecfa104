use std::collections::HashMap;

use sqlx::{Connection, Error, PgConnection};
use uuid::Uuid;

use crate::db::models::{BreakWindow, BusinessHours, BusinessHoursInput, BusinessHoursRow};

#[derive(sqlx::FromRow)]
struct BreakRow {
    business_hours_id: Uuid,
    start_time: String,
    end_time: String,
}

pub struct BusinessHoursRepository;

impl BusinessHoursRepository {
    pub async fn get_by_day_of_week(
        conn: &mut PgConnection,
        day_of_week: i16,
    ) -> Result<Option<BusinessHours>, Error> {
        let row = sqlx::query_as::<_, BusinessHoursRow>(
            r#"
            SELECT id, day_of_week, open_time, close_time, is_off
            FROM business_hours
            WHERE day_of_week = $1
            "#,
        )
        .bind(day_of_week)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let breaks = Self::breaks_for(conn, row.id).await?;
        Ok(Some(row.with_breaks(breaks)))
    }

    pub async fn list(conn: &mut PgConnection) -> Result<Vec<BusinessHours>, Error> {
        let rows = sqlx::query_as::<_, BusinessHoursRow>(
            r#"
            SELECT id, day_of_week, open_time, close_time, is_off
            FROM business_hours
            ORDER BY day_of_week ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        let break_rows = sqlx::query_as::<_, BreakRow>(
            r#"
            SELECT business_hours_id, start_time, end_time
            FROM business_breaks
            ORDER BY start_time ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        let mut breaks: HashMap<Uuid, Vec<BreakWindow>> = HashMap::new();
        for row in break_rows {
            breaks.entry(row.business_hours_id).or_default().push(BreakWindow {
                start_time: row.start_time,
                end_time: row.end_time,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let day_breaks = breaks.remove(&row.id).unwrap_or_default();
                row.with_breaks(day_breaks)
            })
            .collect())
    }

    /// Upserts every weekday in one transaction; a failing row leaves the
    /// table untouched.
    pub async fn upsert_many(conn: &mut PgConnection, items: &[BusinessHoursInput]) -> Result<(), Error> {
        let mut tx = conn.begin().await?;
        for item in items {
            Self::upsert(&mut *tx, item).await?;
        }
        tx.commit().await
    }

    async fn upsert(conn: &mut PgConnection, item: &BusinessHoursInput) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO business_hours (day_of_week, open_time, close_time, is_off)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (day_of_week) DO UPDATE
            SET open_time = EXCLUDED.open_time,
                close_time = EXCLUDED.close_time,
                is_off = EXCLUDED.is_off,
                updated_at = NOW()
            "#,
        )
        .bind(item.day_of_week)
        .bind(&item.open_time)
        .bind(&item.close_time)
        .bind(item.is_off)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Swaps the break list of an existing weekday in one transaction.
    /// Returns `false` when the weekday has no hours row.
    pub async fn replace_breaks(
        conn: &mut PgConnection,
        day_of_week: i16,
        breaks: &[BreakWindow],
    ) -> Result<bool, Error> {
        let mut tx = conn.begin().await?;

        let hours_id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM business_hours WHERE day_of_week = $1 FOR UPDATE")
                .bind(day_of_week)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(hours_id) = hours_id else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM business_breaks WHERE business_hours_id = $1")
            .bind(hours_id)
            .execute(&mut *tx)
            .await?;

        for window in breaks {
            sqlx::query(
                r#"
                INSERT INTO business_breaks (business_hours_id, start_time, end_time)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(hours_id)
            .bind(&window.start_time)
            .bind(&window.end_time)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn breaks_for(conn: &mut PgConnection, hours_id: Uuid) -> Result<Vec<BreakWindow>, Error> {
        sqlx::query_as::<_, BreakWindow>(
            r#"
            SELECT start_time, end_time
            FROM business_breaks
            WHERE business_hours_id = $1
            ORDER BY start_time ASC
            "#,
        )
        .bind(hours_id)
        .fetch_all(conn)
        .await
    }
}
