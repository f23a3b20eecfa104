use sqlx::{Error, PgConnection};
use uuid::Uuid;

use crate::db::models::Service;

pub struct ServiceRepository;

impl ServiceRepository {
    pub async fn get_by_id(conn: &mut PgConnection, service_id: Uuid) -> Result<Option<Service>, Error> {
        sqlx::query_as::<_, Service>(
            r#"
            SELECT id, name, price_in_cents, duration_in_minutes
            FROM services
            WHERE id = $1
            "#,
        )
        .bind(service_id)
        .fetch_optional(conn)
        .await
    }
}
