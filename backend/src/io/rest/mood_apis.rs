//! # REST API for Mood Tracking

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use log::info;
use serde::Deserialize;

use super::mappers::to_record_mood_response;
use super::{error_response, validate_days, SignedInUser};
use crate::domain::commands::mood::RecordMoodCommand;
use crate::domain::history::MOOD_CHART_DAYS;
use crate::domain::TrackerError;
use crate::AppState;
use shared::{CurrentMoodResponse, Mood, MoodChartResponse, MoodHistoryResponse, RecordMoodRequest};

/// Longest chart a client may ask for
pub const MAX_CHART_DAYS: i64 = 366;

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub days: Option<i64>,
}

pub async fn get_current_mood(
    State(state): State<AppState>,
    SignedInUser(user): SignedInUser,
) -> impl IntoResponse {
    info!("GET /api/mood - user: {}", user.uid);

    match state.mood_service.current_mood(&user.uid).await {
        Ok(mood) => (StatusCode::OK, Json(CurrentMoodResponse { mood })).into_response(),
        Err(e) => error_response("Failed to load current mood", e),
    }
}

pub async fn record_mood(
    State(state): State<AppState>,
    SignedInUser(user): SignedInUser,
    Json(request): Json<RecordMoodRequest>,
) -> impl IntoResponse {
    info!("POST /api/mood - user: {}, request: {:?}", user.uid, request);

    let mood = match Mood::from_label(&request.mood) {
        Ok(mood) => mood,
        Err(e) => {
            return error_response("Rejected mood", TrackerError::UnknownMoodLabel(e.0).into());
        }
    };

    let command = RecordMoodCommand { user_id: user.uid, mood };
    match state.mood_service.record_mood(command, Utc::now()).await {
        Ok(result) => (StatusCode::OK, Json(to_record_mood_response(result))).into_response(),
        Err(e) => error_response("Failed to record mood", e),
    }
}

pub async fn get_mood_history(
    State(state): State<AppState>,
    SignedInUser(user): SignedInUser,
) -> impl IntoResponse {
    info!("GET /api/mood/history - user: {}", user.uid);

    match state.mood_service.mood_history(&user.uid).await {
        Ok(history) => (StatusCode::OK, Json(MoodHistoryResponse { history })).into_response(),
        Err(e) => error_response("Failed to load mood history", e),
    }
}

pub async fn get_mood_chart(
    State(state): State<AppState>,
    SignedInUser(user): SignedInUser,
    Query(query): Query<ChartQuery>,
) -> impl IntoResponse {
    info!("GET /api/mood/chart - user: {}, query: {:?}", user.uid, query);

    let days = query.days.unwrap_or(MOOD_CHART_DAYS as i64);
    let days = match validate_days(days, 1, MAX_CHART_DAYS) {
        Ok(days) => days as usize,
        Err(e) => return error_response("Rejected chart range", e.into()),
    };

    match state.mood_service.mood_chart(&user.uid, days, Utc::now()).await {
        Ok(points) => (StatusCode::OK, Json(MoodChartResponse { points })).into_response(),
        Err(e) => error_response("Failed to build mood chart", e),
    }
}
