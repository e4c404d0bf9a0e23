//! # REST API Interface Layer
//!
//! HTTP endpoints for the pregnancy companion, nested under `/api`.
//!
//! Handlers translate between the DTOs in `shared` and the domain commands,
//! log each request, and turn domain errors into status codes:
//!
//! - invalid dates, unknown mood labels and validation failures: `400`
//! - no signed-in user: `401`
//! - persistence backend unreachable: `503`
//! - anything else: `500`
//!
//! Except for the session endpoints and date conversion, every endpoint acts
//! on the signed-in session user.

pub mod chat_apis;
pub mod mappers;
pub mod mood_apis;
pub mod pregnancy_apis;
pub mod profile_apis;
pub mod session_apis;

pub use chat_apis::*;
pub use mood_apis::*;
pub use pregnancy_apis::*;
pub use profile_apis::*;
pub use session_apis::*;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use log::{error, warn};
use shared::User;

use crate::domain::{ProfileValidationError, TrackerError};
use crate::AppState;

/// Status code for an error coming out of the domain layer
pub fn status_for(error: &anyhow::Error) -> StatusCode {
    if let Some(tracker_error) = error.downcast_ref::<TrackerError>() {
        return match tracker_error {
            TrackerError::InvalidDate(_) | TrackerError::UnknownMoodLabel(_) => StatusCode::BAD_REQUEST,
            TrackerError::NotSignedIn => StatusCode::UNAUTHORIZED,
            TrackerError::PersistenceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            TrackerError::AssistantUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
    }
    if error.downcast_ref::<ProfileValidationError>().is_some() {
        return StatusCode::BAD_REQUEST;
    }
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Log `error` and render it as a plain-text response
pub fn error_response(context: &str, error: anyhow::Error) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        error!("{}: {:#}", context, error);
    } else {
        warn!("{}: {}", context, error);
    }
    (status, error.to_string()).into_response()
}

/// Extractor for the signed-in user; rejects with `401` when signed out
pub struct SignedInUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for SignedInUser {
    type Rejection = Response;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        state
            .session_service
            .require_user()
            .map(SignedInUser)
            .map_err(|e| error_response("Rejected request without session", e))
    }
}

/// Check a `days` query parameter against `1..=max` (or `0..=max`)
pub(crate) fn validate_days(days: i64, min: i64, max: i64) -> Result<i64, ProfileValidationError> {
    if (min..=max).contains(&days) {
        Ok(days)
    } else {
        Err(ProfileValidationError::DaysOutOfRange { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (anyhow::Error::new(TrackerError::InvalidDate("x".into())), StatusCode::BAD_REQUEST),
            (anyhow::Error::new(TrackerError::UnknownMoodLabel("x".into())), StatusCode::BAD_REQUEST),
            (anyhow::Error::new(TrackerError::NotSignedIn), StatusCode::UNAUTHORIZED),
            (
                anyhow::Error::new(TrackerError::PersistenceUnavailable("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (anyhow::Error::new(ProfileValidationError::MissingAnchor), StatusCode::BAD_REQUEST),
            (anyhow::anyhow!("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(status_for(&error), expected, "{}", error);
        }
    }

    #[test]
    fn test_status_survives_context() {
        let result: anyhow::Result<()> = Err(TrackerError::PersistenceUnavailable("disk".into()))
            .context("saving mood history");
        assert_eq!(status_for(&result.unwrap_err()), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_validate_days() {
        assert_eq!(validate_days(7, 1, 366), Ok(7));
        assert!(validate_days(0, 1, 366).is_err());
        assert_eq!(validate_days(0, 0, 366), Ok(0));
        assert!(validate_days(400, 1, 366).is_err());
    }
}
