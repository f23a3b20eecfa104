use sqlx::{Error, PgConnection};
use time::Date;

use crate::db::models::{BusinessDateOverride, DateOverrideInput};

pub struct DateOverrideRepository;

impl DateOverrideRepository {
    pub async fn get_by_date(conn: &mut PgConnection, date: Date) -> Result<Option<BusinessDateOverride>, Error> {
        sqlx::query_as::<_, BusinessDateOverride>(
            r#"
            SELECT id, date, is_off, open_time, close_time
            FROM business_date_overrides
            WHERE date = $1
            "#,
        )
        .bind(date)
        .fetch_optional(conn)
        .await
    }

    pub async fn list(conn: &mut PgConnection) -> Result<Vec<BusinessDateOverride>, Error> {
        sqlx::query_as::<_, BusinessDateOverride>(
            r#"
            SELECT id, date, is_off, open_time, close_time
            FROM business_date_overrides
            ORDER BY date ASC
            "#,
        )
        .fetch_all(conn)
        .await
    }

    pub async fn upsert(conn: &mut PgConnection, input: &DateOverrideInput) -> Result<BusinessDateOverride, Error> {
        sqlx::query_as::<_, BusinessDateOverride>(
            r#"
            INSERT INTO business_date_overrides (date, is_off, open_time, close_time)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (date) DO UPDATE
            SET is_off = EXCLUDED.is_off,
                open_time = EXCLUDED.open_time,
                close_time = EXCLUDED.close_time,
                updated_at = NOW()
            RETURNING id, date, is_off, open_time, close_time
            "#,
        )
        .bind(input.date)
        .bind(input.is_off)
        .bind(&input.open_time)
        .bind(&input.close_time)
        .fetch_one(conn)
        .await
    }

    pub async fn delete(conn: &mut PgConnection, date: Date) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM business_date_overrides WHERE date = $1")
            .bind(date)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
