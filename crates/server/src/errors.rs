use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::Detail;
use models::errors::FieldErrors;
use serde_json::json;
use service::auth::errors::AuthError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

pub const NOT_FOUND: &str = "Not found.";
pub const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
pub const INVALID_TOKEN: &str = "Given token not valid for any token type";

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400 with `{"errors": {field: [msgs]}}`
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    /// 401 with `{"detail": ...}`
    #[error("{0}")]
    Unauthenticated(String),
    /// 404; also used for records the caller may not see
    #[error("not found")]
    NotFound,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthenticated() -> Self { ApiError::Unauthenticated(NOT_AUTHENTICATED.to_string()) }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(errs) => (status, Json(json!({ "errors": errs }))).into_response(),
            ApiError::Unauthenticated(msg) => (status, Json(Detail::new(msg))).into_response(),
            ApiError::NotFound => (status, Json(Detail::new(NOT_FOUND))).into_response(),
            ApiError::Internal(msg) => {
                // 细节只写日志，不返回给客户端
                error!(event = "request_failed", error = %msg);
                (status, Json(Detail::new("internal error"))).into_response()
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(errs) => ApiError::Validation(errs),
            ServiceError::NotFound(_) => ApiError::NotFound,
            ServiceError::Unauthenticated => ApiError::unauthenticated(),
            ServiceError::Db(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Unauthorized => ApiError::Unauthenticated(AuthError::Unauthorized.to_string()),
            AuthError::InvalidToken | AuthError::NotFound => ApiError::Unauthenticated(AuthError::InvalidToken.to_string()),
            AuthError::Validation(msg) => ApiError::Validation(FieldErrors::single("password", msg)),
            other => ApiError::Internal(format!("[{}] {}", other.code(), other)),
        }
    }
}
