//! Structured errors for the pagetitle HTTP API.
//!
//! Only whole-request failures become an `ApiError`; per-URL failures are
//! reported inside the response items as an [`ErrorBody`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pagetitle_core::Error;
use serde::{Deserialize, Serialize};

/// Code and message describing a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl From<&Error> for ErrorBody {
    fn from(err: &Error) -> Self {
        Self { code: err.code().to_string(), message: err.detail() }
    }
}

/// Whole-request failure.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { status, body: ErrorBody { code: code.into(), message: message.into() } }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.body })).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if err.is_client_error() {
            return Self::new(StatusCode::BAD_REQUEST, err.code(), err.detail());
        }

        tracing::error!(error = %err, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.code(), "An internal error occurred")
    }
}
