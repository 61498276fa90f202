//! Error types for the wallet service.

use crate::domain::PaymentStatus;
use crate::ports::GatewayError;

/// Domain-level errors (business rule violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(i64),

    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: i64, requested: i64 },

    #[error("Balance overflow")]
    BalanceOverflow,

    #[error("Invalid payment status {status}: {message}")]
    InvalidPaymentStatus {
        status: PaymentStatus,
        message: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Application-level errors returned by the services.
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(i64),

    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: i64, requested: i64 },

    #[error("Invalid payment status {status}: {message}")]
    InvalidPaymentStatus {
        status: PaymentStatus,
        message: String,
    },

    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidAmount(_) => "invalid_amount",
            AppError::InsufficientBalance { .. } => "insufficient_balance",
            AppError::InvalidPaymentStatus { .. } => "invalid_payment_status",
            AppError::PaymentNotFound(_) => "payment_not_found",
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::Gateway(_) => "gateway_error",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidAmount(v) => AppError::InvalidAmount(v),
            DomainError::InsufficientBalance {
                available,
                requested,
            } => AppError::InsufficientBalance {
                available,
                requested,
            },
            DomainError::InvalidPaymentStatus { status, message } => {
                AppError::InvalidPaymentStatus { status, message }
            }
            DomainError::BalanceOverflow => AppError::BadRequest(err.to_string()),
            DomainError::ValidationError(msg) => AppError::BadRequest(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Transaction(e) => AppError::Internal(e),
            RepoError::Conflict(e) => AppError::BadRequest(e),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unsupported(method) => AppError::BadRequest(format!(
                "payment method {} has no external gateway",
                method
            )),
            GatewayError::Unavailable(msg) => AppError::Gateway(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_balance_survives_repo_wrapping() {
        let err: AppError = RepoError::Domain(DomainError::InsufficientBalance {
            available: 100,
            requested: 300,
        })
        .into();
        assert!(matches!(
            err,
            AppError::InsufficientBalance {
                available: 100,
                requested: 300
            }
        ));
        assert_eq!(err.kind(), "insufficient_balance");
    }

    #[test]
    fn test_database_errors_are_internal() {
        let err: AppError = RepoError::Database("connection reset".into()).into();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_invalid_status_keeps_source_status() {
        let err: AppError = DomainError::InvalidPaymentStatus {
            status: PaymentStatus::Pending,
            message: "can only refund completed payments".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Invalid payment status pending: can only refund completed payments"
        );
    }
}
