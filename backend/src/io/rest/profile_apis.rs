//! # REST API for the Profile Dashboard

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use log::info;

use super::mappers::to_overview_response;
use super::{error_response, SignedInUser};
use crate::AppState;

/// Progress, due date countdown, mood curve and recent questions in one call
pub async fn get_profile_overview(
    State(state): State<AppState>,
    SignedInUser(user): SignedInUser,
) -> impl IntoResponse {
    info!("GET /api/profile/overview - user: {}", user.uid);

    match state.profile_service.overview(&user, Utc::now()).await {
        Ok(overview) => (StatusCode::OK, Json(to_overview_response(overview))).into_response(),
        Err(e) => error_response("Failed to build profile overview", e),
    }
}
