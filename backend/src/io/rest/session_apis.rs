//! # REST API for the Mock Session
//!
//! Sign-in, sign-out, and profile edits for the single signed-in user.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::info;

use super::error_response;
use crate::domain::commands::session::{LoginCommand, UpdateUserCommand};
use crate::AppState;
use shared::{LoginRequest, SessionResponse, UpdateUserRequest};

/// Current user, or `{"user": null}` when signed out
pub async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/session");

    Json(SessionResponse {
        user: state.session_service.current_user(),
    })
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    info!("POST /api/session/login - request: {:?}", request);

    let command = LoginCommand {
        name: request.name,
        email: request.email,
    };
    match state.session_service.login(command).await {
        Ok(user) => (StatusCode::OK, Json(SessionResponse { user: Some(user) })).into_response(),
        Err(e) => error_response("Failed to sign in", e),
    }
}

pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/session/logout");

    match state.session_service.logout().await {
        Ok(()) => (StatusCode::OK, Json(SessionResponse { user: None })).into_response(),
        Err(e) => error_response("Failed to sign out", e),
    }
}

pub async fn update_session_profile(
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    info!("PUT /api/session/profile - request: {:?}", request);

    let command = UpdateUserCommand {
        display_name: request.display_name,
        photo_url: request.photo_url,
    };
    match state.session_service.update_profile(command).await {
        Ok(user) => (StatusCode::OK, Json(SessionResponse { user: Some(user) })).into_response(),
        Err(e) => error_response("Failed to update profile", e),
    }
}
