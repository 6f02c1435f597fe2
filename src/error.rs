use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use redis::RedisError;
use serde::Serialize;
use thiserror::Error as ThisError;
use tracing::error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Everything a route can fail with. Both variants are reported as `500` with a JSON body
/// carrying the message.
#[derive(Debug, ThisError, PartialEq)]
pub enum ApiError {
    #[error("Redis connection not available")]
    ConnectionUnavailable,
    #[error("{message}")]
    OperationFailure { message: String },
}

impl From<RedisError> for ApiError {
    fn from(err: RedisError) -> Self {
        ApiError::OperationFailure {
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);

        let body = ErrorBody {
            error: self.to_string(),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
