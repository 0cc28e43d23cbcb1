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

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Not authorized")
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Admin access required")
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

/// Map domain errors to HTTP status codes
impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        let status = match &e {
            DomainError::UserNotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::IdentityTaken | DomainError::CannotDeleteAdmin => StatusCode::CONFLICT,
            DomainError::InvalidRegistrationNumber { .. }
            | DomainError::InvalidEmail { .. }
            | DomainError::EmptyName
            | DomainError::PasswordTooShort { .. } => StatusCode::BAD_REQUEST,
            DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
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
