//! Mapping engine and plugin failures onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use graphlens_core::{EngineError, ErrorResponse};

/// An error body `{"error": message}` with its status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    /// Plugin failures keep engine errors' own status; anything else gets `fallback`.
    pub fn plugin(err: anyhow::Error, fallback: StatusCode) -> Self {
        match err.downcast_ref::<EngineError>() {
            Some(engine) => ApiError::new(ApiError::from(engine.clone()).status, format!("{err:#}")),
            None => ApiError::new(fallback, format!("{err:#}")),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let status = match err {
            EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
            EngineError::Validation(_)
            | EngineError::Parse(_)
            | EngineError::Coercion { .. }
            | EngineError::Type { .. } => StatusCode::BAD_REQUEST,
        };
        ApiError::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}
