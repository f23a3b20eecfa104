use axum::{extract::State, middleware, routing::get, Json, Router};
use serde_json::json;
use time::OffsetDateTime;
use tower_http::cors::CorsLayer;

use crate::{
    app_state::AppState,
    middleware::tracing::observability_middleware,
    modules::{appointments::routes::appointment_routes, business::routes::business_routes},
    scheduling::{time::to_iso, Backend},
};

pub fn create_router<B: Backend>(state: AppState<B>) -> Router {
    Router::new()
        .route("/health", get(health_check::<B>))
        .merge(appointment_routes::<B>())
        .merge(business_routes::<B>())
        .layer(middleware::from_fn(observability_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check<B: Backend>(State(state): State<AppState<B>>) -> Json<serde_json::Value> {
    let db_status = match state.backend.ping().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::info!("Database health check failed: {}", e);
            "unhealthy"
        }
    };

    let telemetry_health = crate::telemetry::telemetry_health_check();

    Json(json!({
        "status": "ok",
        "name": state.app_name,
        "timestamp": to_iso(OffsetDateTime::now_utc()),
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "database": db_status,
            "telemetry": telemetry_health
        }
    }))
}
