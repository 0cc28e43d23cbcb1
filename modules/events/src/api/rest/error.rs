use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::domain::error::DomainError;

/// REST-facing error: status code plus a client-renderable message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

/// Map domain errors to HTTP status codes.
/// State-based rejections surface as 409 with their specific reason so
/// the caller can render an actionable message.
impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        let status = match &e {
            DomainError::EventNotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::InactiveEvent
            | DomainError::AlreadyRegistered
            | DomainError::EventFull
            | DomainError::NotRegistered
            | DomainError::EventNotEnded
            | DomainError::NotAParticipant
            | DomainError::DuplicateFeedback => StatusCode::CONFLICT,
            DomainError::InvalidRating { .. } | DomainError::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            DomainError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = %e, "Internal error");
            return Self::internal();
        }

        Self::new(status, e.to_string())
    }
}
