//! Maps core errors onto HTTP responses.
//!
//! Body shape: `{ "message": "...", "errors": { "<field>": "<reason>" } }`,
//! `errors` only for validation failures.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ori_core::error::AppError;
use serde_json::json;
use tracing::debug;

#[derive(Debug)]
pub enum ApiError {
    App(AppError),
    /// Body was not valid JSON or had the wrong content type.
    MalformedBody(String),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::App(err) => match err {
                AppError::MissingRequiredField(_)
                | AppError::InvalidMediaType(_)
                | AppError::InvalidFieldValue(_) => StatusCode::BAD_REQUEST,
                AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                AppError::Forbidden(_) => StatusCode::FORBIDDEN,
                AppError::NotFound(..) => StatusCode::NOT_FOUND,
                AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::MalformedBody(reason) => json!({ "message": format!("Malformed request body: {reason}") }),
            // cause already logged by the service
            ApiError::App(AppError::Internal(_)) => json!({ "message": "Internal server error" }),
            ApiError::App(err) => match err.field_errors() {
                Some(errors) => json!({ "message": err.to_string(), "errors": errors }),
                None => json!({ "message": err.to_string() }),
            },
        };

        if status.is_client_error() {
            debug!(%status, error = ?self, "request rejected");
        }
        (status, Json(body)).into_response()
    }
}
