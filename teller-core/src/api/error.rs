//! Error envelope for HTTP responses

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::domain::result::Error;

/// Message returned in place of server-side failure details
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// An error ready to be rendered as `{ "error": "<message>" }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
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
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if !err.is_client_safe() {
            error!(error = %err, "request failed");
            return ApiError::internal();
        }

        match err {
            Error::Validation(msg) => ApiError::bad_request(msg),
            Error::Auth(reason) => ApiError::new(StatusCode::FORBIDDEN, reason.as_str()),
            Error::NotFound(msg) => ApiError::new(StatusCode::NOT_FOUND, msg),
            e @ Error::InsufficientFunds { .. } => ApiError::bad_request(e.to_string()),
            Error::Conflict(msg) => ApiError::new(StatusCode::CONFLICT, msg),
            e => {
                error!(error = %e, "unmapped client error");
                ApiError::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}
