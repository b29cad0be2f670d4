use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use voltroute_core::error::{PlanError, SessionError};

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Timeout(String),
    InternalServerError(String),
}

impl From<PlanError> for ApiError {
    fn from(error: PlanError) -> Self {
        match error {
            PlanError::InvalidVehicleProfile(_) => ApiError::BadRequest(error.to_string()),
            PlanError::NoPathFound => ApiError::NotFound(error.to_string()),
            PlanError::Timeout => ApiError::Timeout(error.to_string()),
            PlanError::Cancelled => ApiError::InternalServerError(error.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::NotFound(_) => ApiError::NotFound(error.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::InternalServerError(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Timeout(message) => (StatusCode::GATEWAY_TIMEOUT, message),
            ApiError::InternalServerError(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
