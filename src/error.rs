//! Application-wide error taxonomy and its HTTP mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error response body returned to HTTP callers.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    pub message: String,
    pub correlation_id: String,
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid request body")]
    BadRequest(String),

    #[error("malformed JSON body")]
    JsonRejection(#[from] JsonRejection),

    #[error("worker signature missing or invalid")]
    InvalidSignature,

    #[error("job store unavailable")]
    StoreUnavailable(String),

    #[error("job {0} not found")]
    JobNotFound(String),

    #[error("queue publish failed")]
    QueuePublishFailed(String),

    #[error("catalog request failed: {status} {body}")]
    CatalogError { status: u16, body: String },

    #[error("streaming service request failed: {status} {body}")]
    StreamingError { status: u16, body: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::JsonRejection(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidSignature => StatusCode::UNAUTHORIZED,
            AppError::JobNotFound(_) => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::QueuePublishFailed(_) => StatusCode::OK,
            AppError::CatalogError { .. } | AppError::StreamingError { .. } => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::JsonRejection(_) => "MALFORMED_JSON",
            AppError::InvalidSignature => "INVALID_SIGNATURE",
            AppError::JobNotFound(_) => "JOB_NOT_FOUND",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::QueuePublishFailed(_) => "QUEUE_PUBLISH_FAILED",
            AppError::CatalogError { .. } => "CATALOG_ERROR",
            AppError::StreamingError { .. } => "STREAMING_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::JsonRejection(e) => e.body_text(),
            AppError::InvalidSignature => "request signature missing or invalid".to_string(),
            AppError::JobNotFound(id) => format!("job {} not found", id),
            AppError::StoreUnavailable(_) => "job store is temporarily unavailable".to_string(),
            AppError::QueuePublishFailed(_) => {
                "first song resolved, background processing could not be queued".to_string()
            }
            AppError::CatalogError { .. } => "catalog lookup failed".to_string(),
            AppError::StreamingError { .. } => "streaming service request failed".to_string(),
            AppError::Configuration(_) | AppError::Internal(_) => {
                "an unexpected error occurred".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let correlation_id = Uuid::new_v4().to_string();
        let status = self.status_code();
        let error_code = self.error_code();
        let user_message = self.user_message();

        match &self {
            AppError::StoreUnavailable(_) | AppError::Internal(_) | AppError::Configuration(_) => {
                tracing::error!(correlation_id = %correlation_id, error_code, error = %self, "server error");
            }
            AppError::CatalogError { .. } | AppError::StreamingError { .. } => {
                tracing::warn!(correlation_id = %correlation_id, error_code, error = %self, "upstream error");
            }
            _ => {
                tracing::info!(correlation_id = %correlation_id, error_code, error = %self, "client error");
            }
        }

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            message: user_message,
            correlation_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Internal(format!("http client error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("invalid JSON: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
