use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Remote text not found: {0}")]
    RemoteNotFound(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Read failure: {0}")]
    ReadFailure(String),

    #[error("Write failure: {0}")]
    WriteFailure(String),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotAuthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::RemoteNotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ReadFailure(_) | AppError::WriteFailure(_) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::CatalogUnavailable(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::Cache(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
