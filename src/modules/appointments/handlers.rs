use axum::{
    extract::{rejection::{JsonRejection, PathRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::{Appointment, NewAppointmentRequest};
use crate::error::AppResult;
use crate::scheduling::availability::{get_available_slots, SlotQuery};
use crate::scheduling::slots::Slot;
use crate::scheduling::{booking, cancellation, Backend};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotParams {
    pub service_id: Uuid,
    pub date: String,
    pub interval_minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CancelBody {
    pub version: i32,
}

pub async fn list_slots<B: Backend>(
    State(state): State<AppState<B>>,
    params: Result<Query<SlotParams>, QueryRejection>,
) -> AppResult<Json<Vec<Slot>>> {
    let Query(params) = params?;
    let query = SlotQuery {
        service_id: params.service_id,
        date: params.date,
        interval_minutes: params.interval_minutes.unwrap_or(state.slot_interval_minutes),
    };

    let mut session = state.backend.session().await?;
    Ok(Json(get_available_slots(&mut session, &query).await?))
}

pub async fn create_appointment<B: Backend>(
    State(state): State<AppState<B>>,
    payload: Result<Json<NewAppointmentRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Appointment>)> {
    let Json(request) = payload?;
    let created = booking::create_appointment(
        &state.backend,
        state.notifier.as_ref(),
        state.retry,
        request,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_appointment<B: Backend>(
    State(state): State<AppState<B>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Appointment>> {
    let Path(id) = id?;
    let mut session = state.backend.session().await?;
    Ok(Json(cancellation::get_appointment(&mut session, id).await?))
}

pub async fn cancel_appointment<B: Backend>(
    State(state): State<AppState<B>>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CancelBody>, JsonRejection>,
) -> AppResult<Json<Appointment>> {
    let Path(id) = id?;
    let Json(body) = payload?;

    let mut session = state.backend.session().await?;
    Ok(Json(
        cancellation::cancel_appointment(&mut session, id, body.version).await?,
    ))
}
