use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::application::services::{AnswerError, BackfillError, IngestionError};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    PolicyRejection(String),
    NotFound(String),
    UpstreamError(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PolicyRejection(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::UpstreamError(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<AnswerError> for ApiError {
    fn from(error: AnswerError) -> Self {
        match error {
            AnswerError::PolicyRejection => ApiError::PolicyRejection(error.to_string()),
            AnswerError::NoDocumentation(msg) => ApiError::NotFound(msg),
            AnswerError::ProviderError(msg) => ApiError::UpstreamError(msg),
            AnswerError::StoreError(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<IngestionError> for ApiError {
    fn from(error: IngestionError) -> Self {
        ApiError::InternalError(error.to_string())
    }
}

impl From<BackfillError> for ApiError {
    fn from(error: BackfillError) -> Self {
        match error {
            BackfillError::ProviderError(msg) => ApiError::UpstreamError(msg),
            BackfillError::DimensionMismatch { .. } => ApiError::UpstreamError(error.to_string()),
            BackfillError::StoreError(msg) => ApiError::InternalError(msg),
        }
    }
}
