use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers::{cancel_appointment, create_appointment, get_appointment, list_slots};
use crate::app_state::AppState;
use crate::scheduling::Backend;

pub fn appointment_routes<B: Backend>() -> Router<AppState<B>> {
    Router::new()
        .route("/slots", get(list_slots::<B>))
        .route("/appointments", post(create_appointment::<B>))
        .route("/appointments/:id", get(get_appointment::<B>))
        .route("/appointments/:id/cancel", patch(cancel_appointment::<B>))
}
