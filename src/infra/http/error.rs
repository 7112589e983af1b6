use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::error::AppError;
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;
use crate::infra::error::InfraError;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const NOT_FOUND: &str = "not_found";
    pub const DUPLICATE: &str = "duplicate";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const DB_TIMEOUT: &str = "db_timeout";
    pub const UNAVAILABLE: &str = "service_unavailable";
    pub const INTERNAL: &str = "internal_error";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Vec<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn invalid_input(details: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: codes::INVALID_INPUT,
            message: "Request could not be processed".to_string(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, codes::UNAUTHORIZED, message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, "Resource not found")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message,
                details: self.details,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation { errors } => ApiError::invalid_input(errors),
            AppError::Domain(DomainError::Validation { message }) => {
                ApiError::invalid_input(vec![message])
            }
            AppError::Domain(DomainError::NotFound { .. }) | AppError::NotFound => {
                ApiError::not_found()
            }
            AppError::Unauthorized(message) => ApiError::unauthorized(message),
            AppError::Repo(RepoError::NotFound) => ApiError::not_found(),
            AppError::Repo(RepoError::Duplicate { constraint }) => ApiError {
                status: StatusCode::CONFLICT,
                code: codes::DUPLICATE,
                message: "Duplicate record".to_string(),
                details: vec![constraint],
            },
            AppError::Repo(RepoError::InvalidInput { message }) => {
                ApiError::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message)
            }
            AppError::Repo(RepoError::Timeout) => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::DB_TIMEOUT,
                "Database timeout",
            ),
            AppError::Repo(RepoError::Persistence(_))
            | AppError::Infra(InfraError::Database { .. }) => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::UNAVAILABLE,
                "Service temporarily unavailable",
            ),
            AppError::Kv(_) => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::UNAVAILABLE,
                "Counter store unavailable",
            ),
            AppError::Infra(_) | AppError::Unexpected(_) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::INTERNAL,
                "Unexpected error occurred",
            ),
        }
    }
}
