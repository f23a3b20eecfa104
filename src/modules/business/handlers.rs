use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::db::{BreakWindow, BusinessDateOverride, BusinessHours, BusinessHoursInput};
use crate::error::AppResult;
use crate::scheduling::business::{self, DateOverrideRequest};
use crate::scheduling::Backend;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateOverrideBody {
    pub is_off: bool,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
}

pub async fn list_business_hours<B: Backend>(
    State(state): State<AppState<B>>,
) -> AppResult<Json<Vec<BusinessHours>>> {
    let mut session = state.backend.session().await?;
    Ok(Json(business::list_business_hours(&mut session).await?))
}

pub async fn update_business_hours<B: Backend>(
    State(state): State<AppState<B>>,
    payload: Result<Json<Vec<BusinessHoursInput>>, JsonRejection>,
) -> AppResult<Json<Vec<BusinessHours>>> {
    let Json(items) = payload?;
    let mut session = state.backend.session().await?;
    Ok(Json(business::update_business_hours(&mut session, &items).await?))
}

pub async fn replace_breaks<B: Backend>(
    State(state): State<AppState<B>>,
    day_of_week: Result<Path<i16>, PathRejection>,
    payload: Result<Json<Vec<BreakWindow>>, JsonRejection>,
) -> AppResult<Json<BusinessHours>> {
    let Path(day_of_week) = day_of_week?;
    let Json(breaks) = payload?;

    let mut session = state.backend.session().await?;
    Ok(Json(
        business::replace_business_breaks(&mut session, day_of_week, &breaks).await?,
    ))
}

pub async fn list_business_days<B: Backend>(
    State(state): State<AppState<B>>,
) -> AppResult<Json<Vec<BusinessDateOverride>>> {
    let mut session = state.backend.session().await?;
    Ok(Json(business::list_business_date_overrides(&mut session).await?))
}

pub async fn upsert_business_day<B: Backend>(
    State(state): State<AppState<B>>,
    date: Result<Path<String>, PathRejection>,
    payload: Result<Json<DateOverrideBody>, JsonRejection>,
) -> AppResult<Json<BusinessDateOverride>> {
    let Path(date) = date?;
    let Json(body) = payload?;
    let request = DateOverrideRequest {
        is_off: body.is_off,
        open_time: body.open_time,
        close_time: body.close_time,
    };

    let mut session = state.backend.session().await?;
    Ok(Json(
        business::upsert_business_date_override(&mut session, &date, request).await?,
    ))
}

pub async fn delete_business_day<B: Backend>(
    State(state): State<AppState<B>>,
    date: Result<Path<String>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(date) = date?;
    let mut session = state.backend.session().await?;
    business::delete_business_date_override(&mut session, &date).await?;
    Ok(StatusCode::NO_CONTENT)
}
