// HTTP error responses
use crate::domain::DomainError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidArgument(#[from] DomainError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidArgument(DomainError::InvalidArgument { field, message }) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": {
                        "code": "invalid_argument",
                        "field": field,
                        "message": message,
                    }
                })),
            )
                .into_response(),
            ApiError::Internal(err) => {
                tracing::error!("Request failed: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": {
                            "code": "internal",
                            "message": "internal server error",
                        }
                    })),
                )
                    .into_response()
            }
        }
    }
}
