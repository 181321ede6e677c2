use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::services::purchase::PurchaseError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Purchase quota exceeded: {purchased} of {cap} already bought")]
    QuotaExceeded { purchased: i64, cap: i64 },

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::QuotaExceeded { .. } => StatusCode::BAD_REQUEST,
            AppError::InsufficientStock(_) => StatusCode::BAD_REQUEST,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            AppError::InsufficientStock(_) => "INSUFFICIENT_STOCK",
            AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::InsufficientStock(msg)
            | AppError::ServiceUnavailable(msg)
            | AppError::InternalServerError(msg) => {
                error!(error = ?self, message = %msg, "Application error");
            }
            AppError::QuotaExceeded { purchased, cap } => {
                error!(error = ?self, purchased, cap, "Purchase quota exceeded");
            }
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level message to the client
        let public_message = match &self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::InsufficientStock(msg)
            | AppError::ServiceUnavailable(msg)
            | AppError::InternalServerError(msg) => msg.clone(),
            AppError::QuotaExceeded { purchased, cap } => format!(
                "You have already purchased {} ticket(s). The limit is {} per user.",
                purchased, cap
            ),
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
        };

        // Do not expose internal details in the API response
        let details = None;

        error_response(code, public_message, details, status)
    }
}

impl From<PurchaseError> for AppError {
    fn from(err: PurchaseError) -> Self {
        match err {
            PurchaseError::InvalidQuantity => {
                AppError::ValidationError("Quantity must be a positive integer".to_string())
            }
            PurchaseError::QuotaExceeded { purchased, cap } => {
                AppError::QuotaExceeded { purchased, cap }
            }
            PurchaseError::TicketNotFound => {
                AppError::NotFound("Ticket does not exist".to_string())
            }
            PurchaseError::InsufficientStock { .. } => {
                AppError::InsufficientStock("Not enough tickets in stock".to_string())
            }
            PurchaseError::Unavailable(e) => {
                AppError::ServiceUnavailable(format!("Database temporarily unavailable: {}", e))
            }
            PurchaseError::Database(e) => AppError::DatabaseError(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_exceeded_maps_to_bad_request() {
        let err = AppError::QuotaExceeded { purchased: 2, cap: 2 };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "QUOTA_EXCEEDED");
    }

    #[test]
    fn test_insufficient_stock_maps_to_bad_request() {
        let err = AppError::InsufficientStock("Not enough tickets in stock".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "INSUFFICIENT_STOCK");
    }

    #[test]
    fn test_unavailable_maps_to_503() {
        let err = AppError::ServiceUnavailable("pool exhausted".to_string());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_purchase_error_conversions() {
        let err: AppError = PurchaseError::TicketNotFound.into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err: AppError = PurchaseError::InvalidQuantity.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: AppError = PurchaseError::QuotaExceeded { purchased: 1, cap: 2 }.into();
        assert!(matches!(err, AppError::QuotaExceeded { purchased: 1, cap: 2 }));
    }

    #[test]
    fn test_quota_message_carries_counts() {
        let err = AppError::QuotaExceeded { purchased: 2, cap: 2 };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
