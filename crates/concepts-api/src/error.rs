//! HTTP error mapping.
//!
//! Core errors are converted in exactly one place, [`From<Error> for ApiError`],
//! and rendered by [`IntoResponse`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use concepts_core::Error;

/// Body of every 4xx/5xx response that carries one.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// 400 with `{"message": ...}`
    BadRequest(String),
    /// 404 with no body
    NotFound,
    /// 503 with `{"message": ...}`
    Unavailable(String),
    /// 500 with `{"message": ...}`
    Internal(Error),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) | Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::NotFound(_) => ApiError::NotFound,
            Error::Unavailable(msg) => ApiError::Unavailable(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound => return StatusCode::NOT_FOUND.into_response(),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Internal(err) => {
                error!(
                    subsystem = "api",
                    component = "error_mapping",
                    error = %err,
                    "Request failed"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}
