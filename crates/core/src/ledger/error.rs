//! Ledger error types.
//!
//! Every failure the account service, the stores and the report service can
//! surface maps onto one of these variants, and each variant carries a stable
//! error code and HTTP status.

use investa_shared::AppError;
use investa_shared::types::MoneyError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Message used for every access denial.
pub const PERMISSION_DENIED_MESSAGE: &str = "You do not have permission to perform this action.";

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Payload failed field validation.
    #[error("{0}")]
    Validation(String),

    /// A withdrawal would take the balance below zero.
    #[error("Insufficient funds. Balance: {balance}, requested change: {requested}")]
    InsufficientFunds {
        /// Balance before the change.
        balance: Decimal,
        /// The signed delta that was refused.
        requested: Decimal,
    },

    /// Opening balance is negative.
    #[error("Balance cannot be negative: {0}")]
    InvalidBalance(Decimal),

    /// Report date could not be parsed.
    #[error("{0}")]
    InvalidDateRange(String),

    // ========== Access Errors ==========
    /// Requester may not perform the operation.
    #[error("{0}")]
    PermissionDenied(String),

    /// Target account or user does not exist.
    #[error("{0}")]
    NotFound(String),

    // ========== Infrastructure Errors ==========
    /// Store failure.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl LedgerError {
    /// Denial with the standard message.
    #[must_use]
    pub fn permission_denied() -> Self {
        Self::PermissionDenied(PERMISSION_DENIED_MESSAGE.to_string())
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::InvalidBalance(_) => "INVALID_BALANCE",
            Self::InvalidDateRange(_) => "INVALID_DATE_RANGE",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation(_)
            | Self::InsufficientFunds { .. }
            | Self::InvalidBalance(_)
            | Self::InvalidDateRange(_) => 400,
            Self::PermissionDenied(_) => 403,
            Self::NotFound(_) => 404,
            Self::Persistence(_) => 500,
        }
    }
}

impl From<MoneyError> for LedgerError {
    fn from(err: MoneyError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<AppError> for LedgerError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(msg) => Self::Validation(msg),
            AppError::Unauthorized(msg) => Self::PermissionDenied(msg),
            AppError::Database(msg) | AppError::Internal(msg) => Self::Persistence(msg),
        }
    }
}
