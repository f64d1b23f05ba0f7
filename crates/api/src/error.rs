use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::repositories::StoreError;
use domain::services::ServiceError;
use serde::Serialize;
use thiserror::Error;

pub const VALIDATION_FAILED: &str = "Validation failed";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error. Please try again later.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// One message per failed check, in the order the checks ran.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Every error response has this shape.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
    /// Server-side detail, only populated in debug builds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            detail: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: VALIDATION_FAILED.into(),
                    details: Some(details),
                    detail: None,
                },
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorBody::message(msg)),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ErrorBody::message(msg)),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorBody::message(msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorBody::message(msg)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, ErrorBody::message(msg)),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorBody::message("Too many requests. Please try again later."),
            ),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: INTERNAL_ERROR_MESSAGE.into(),
                        details: None,
                        detail: cfg!(debug_assertions).then_some(msg),
                    },
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, ErrorBody::message(msg))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Invalid(errors) => ApiError::Validation(errors.messages()),
            ServiceError::DuplicateEmail | ServiceError::DuplicateCode => {
                ApiError::Conflict(err.to_string())
            }
            ServiceError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ServiceError::BadRequest(msg) => ApiError::BadRequest(msg),
            ServiceError::Store(store) => store.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ApiError::Conflict(err.to_string()),
            StoreError::DuplicateCode => ApiError::Conflict(ServiceError::DuplicateCode.to_string()),
            StoreError::Backend(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
            })
            .collect();
        details.sort();
        ApiError::Validation(details)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(vec![rejection.body_text()])
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
