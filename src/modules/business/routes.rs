use axum::{
    routing::{get, put},
    Router,
};

use super::handlers::{
    delete_business_day, list_business_days, list_business_hours, replace_breaks,
    update_business_hours, upsert_business_day,
};
use crate::app_state::AppState;
use crate::scheduling::Backend;

pub fn business_routes<B: Backend>() -> Router<AppState<B>> {
    Router::new()
        .route(
            "/business-hours",
            get(list_business_hours::<B>).put(update_business_hours::<B>),
        )
        .route("/business-hours/:dayOfWeek/breaks", put(replace_breaks::<B>))
        .route("/business-days", get(list_business_days::<B>))
        .route(
            "/business-days/:date",
            put(upsert_business_day::<B>).delete(delete_business_day::<B>),
        )
}
