//! Error handling for the Invoice Management System
//!
//! Every failure is rendered as `{"error": {"code", "message", "field"?}}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Document rendering failed: {0}")]
    Document(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Helper for field-level validation failures
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Map a unique-constraint violation to `DuplicateEntry`, pass anything else through
    pub fn from_unique_violation(err: sqlx::Error, field: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry(field.to_string())
            }
            _ => AppError::DatabaseError(err),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials
            | AppError::AccountDisabled
            | AppError::TokenExpired
            | AppError::InvalidToken
            | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AppError::Validation { .. } | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateEntry(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidStateTransition(_)
            | AppError::EmptyCart
            | AppError::InsufficientStock(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Document(_)
            | AppError::DatabaseError(_)
            | AppError::Internal(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> ErrorDetail {
        let (code, message, field) = match self {
            AppError::InvalidCredentials => (
                "INVALID_CREDENTIALS",
                "Invalid username or password".to_string(),
                None,
            ),
            AppError::AccountDisabled => ("ACCOUNT_DISABLED", "Account is disabled".to_string(), None),
            AppError::TokenExpired => ("TOKEN_EXPIRED", "Token has expired".to_string(), None),
            AppError::InvalidToken => ("INVALID_TOKEN", "Invalid token".to_string(), None),
            AppError::InsufficientPermissions => (
                "INSUFFICIENT_PERMISSIONS",
                "You do not have permission to access this section".to_string(),
                None,
            ),
            AppError::Unauthorized(msg) => ("UNAUTHORIZED", msg.clone(), None),
            AppError::Validation { field, message } => {
                ("VALIDATION_ERROR", message.clone(), Some(field.clone()))
            }
            AppError::ValidationError(msg) => ("VALIDATION_ERROR", msg.clone(), None),
            AppError::DuplicateEntry(field) => (
                "DUPLICATE_ENTRY",
                format!("A record with this {} already exists", field),
                Some(field.clone()),
            ),
            AppError::NotFound(resource) => ("NOT_FOUND", format!("{} not found", resource), None),
            AppError::InvalidStateTransition(msg) => ("INVALID_STATE_TRANSITION", msg.clone(), None),
            AppError::EmptyCart => ("EMPTY_CART", "Your cart is empty".to_string(), None),
            AppError::InsufficientStock(msg) => ("INSUFFICIENT_STOCK", msg.clone(), None),
            AppError::Document(_) => (
                "DOCUMENT_ERROR",
                "The document could not be generated".to_string(),
                None,
            ),
            AppError::DatabaseError(_) => (
                "DATABASE_ERROR",
                "A database error occurred".to_string(),
                None,
            ),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone(), None),
            AppError::InternalError(_) => (
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
                None,
            ),
        };

        ErrorDetail {
            code: code.to_string(),
            message,
            field,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        match fields.first() {
            Some((field, errs)) => {
                let message = errs
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("{} is invalid", field));
                AppError::validation(field, message)
            }
            None => AppError::ValidationError(errors.to_string()),
        }
    }
}

impl From<shared::DomainError> for AppError {
    fn from(err: shared::DomainError) -> Self {
        match err {
            shared::DomainError::InvalidTransition { .. } => {
                AppError::InvalidStateTransition(err.to_string())
            }
            shared::DomainError::MalformedInvoiceNumber(_) => {
                AppError::NotFound("Invoice".to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.detail(),
            }),
        )
            .into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct SignupForm {
        #[validate(length(min = 3, message = "Username is too short"))]
        username: String,
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InsufficientPermissions.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::EmptyCart.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            AppError::DuplicateEntry("username".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::NotFound("Invoice".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_validator_errors_keep_field_and_message() {
        let form = SignupForm {
            username: "ab".into(),
        };
        let err: AppError = form.validate().unwrap_err().into();
        match err {
            AppError::Validation { field, message } => {
                assert_eq!(field, "username");
                assert_eq!(message, "Username is too short");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_domain_transition_error_maps_to_422() {
        let err: AppError = shared::InvoiceStatus::Paid
            .transition_to(shared::InvoiceStatus::Paid)
            .unwrap_err()
            .into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
