//! # REST API for Pregnancy Dates
//!
//! Reading and editing the pregnancy anchor, plus the stateless LMP / due
//! date conversion the edit form uses while the user types.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use log::info;
use serde::Deserialize;

use super::mappers::{to_dates_response, to_progress_response};
use super::{error_response, SignedInUser};
use crate::domain::commands::profile::UpdatePregnancyDatesCommand;
use crate::AppState;
use shared::UpdatePregnancyDatesRequest;

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub lmp: Option<String>,
    pub due_date: Option<String>,
}

pub async fn get_progress(
    State(state): State<AppState>,
    SignedInUser(user): SignedInUser,
) -> impl IntoResponse {
    info!("GET /api/pregnancy/progress - user: {}", user.uid);

    match state.profile_service.progress(&user.uid, Utc::now()).await {
        Ok(result) => (StatusCode::OK, Json(to_progress_response(&result))).into_response(),
        Err(e) => error_response("Failed to compute pregnancy progress", e),
    }
}

pub async fn get_pregnancy_settings(
    State(state): State<AppState>,
    SignedInUser(user): SignedInUser,
) -> impl IntoResponse {
    info!("GET /api/pregnancy/settings - user: {}", user.uid);

    match state.profile_service.settings(&user.uid).await {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => error_response("Failed to load pregnancy settings", e),
    }
}

pub async fn update_pregnancy_dates(
    State(state): State<AppState>,
    SignedInUser(user): SignedInUser,
    Json(request): Json<UpdatePregnancyDatesRequest>,
) -> impl IntoResponse {
    info!("PUT /api/pregnancy/dates - user: {}, request: {:?}", user.uid, request);

    let command = UpdatePregnancyDatesCommand {
        user_id: user.uid,
        lmp: request.lmp,
        due_date: request.due_date,
    };
    match state.profile_service.update_pregnancy_dates(command, Utc::now()).await {
        Ok(anchor) => (StatusCode::OK, Json(to_dates_response(&anchor))).into_response(),
        Err(e) => error_response("Failed to update pregnancy dates", e),
    }
}

/// Fill in the other date for whichever one was given
pub async fn convert_dates(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
) -> impl IntoResponse {
    info!("GET /api/pregnancy/convert - query: {:?}", query);

    match state
        .profile_service
        .convert_dates(query.lmp.as_deref(), query.due_date.as_deref())
    {
        Ok(anchor) => (StatusCode::OK, Json(to_dates_response(&anchor))).into_response(),
        Err(e) => error_response("Failed to convert pregnancy dates", e),
    }
}
