/// Error types for feed-service
///
/// Every caller-facing failure maps to one of the variants below and is
/// rendered as the `{"status":"error", ...}` envelope the API speaks.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use once_cell::sync::Lazy;
use serde::Serialize;
use thiserror::Error;

/// Result type for feed-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Per-field detail attached to validation failures.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Application error taxonomy
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad input shape or range; carries the offending field(s)
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Referenced entity absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Concurrent relationship mutation exhausted its retries
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Ownership or profile-access mismatch
    #[error("Forbidden: {0}")]
    Authorization(String),

    /// Unexpected failure; logged in full, surfaced generically
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Single-field validation failure.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError {
            field: field.to_string(),
            message: message.into(),
        }])
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Vec::new();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                fields.push(FieldError {
                    field: field.to_string(),
                    message,
                });
            }
        }
        AppError::Validation(fields)
    }
}

/// Internal detail is echoed back to the caller only in development.
static DIAGNOSTIC_MODE: Lazy<bool> = Lazy::new(|| {
    std::env::var("APP_ENV")
        .map(|env| env == "development")
        .unwrap_or(false)
});

impl AppError {
    /// Stable machine-readable kind carried on every error response.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Authorization(_) => "FORBIDDEN",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        match self {
            AppError::Validation(errors) => HttpResponse::build(status).json(serde_json::json!({
                "status": "error",
                "code": self.code(),
                "message": "Validation failed",
                "errors": errors,
            })),
            AppError::Internal(detail) => {
                tracing::error!(detail = %detail, "internal error");
                if *DIAGNOSTIC_MODE {
                    HttpResponse::build(status).json(serde_json::json!({
                        "status": "error",
                        "code": self.code(),
                        "message": "Internal server error",
                        "error": detail,
                    }))
                } else {
                    HttpResponse::build(status).json(serde_json::json!({
                        "status": "error",
                        "code": self.code(),
                        "message": "Internal server error",
                    }))
                }
            }
            other => HttpResponse::build(status).json(serde_json::json!({
                "status": "error",
                "code": other.code(),
                "message": other.to_string(),
            })),
        }
    }
}
