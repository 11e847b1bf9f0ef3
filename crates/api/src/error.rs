//! Translation of domain errors into HTTP responses.
//!
//! Every failure leaves the API as `{"error": <code>, "message": <text>}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use investa_core::ledger::LedgerError;
use investa_shared::{AppError, JwtError};
use serde_json::json;
use tracing::error;

/// Error returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Ledger, policy or report failure.
    Ledger(LedgerError),
    /// Authentication, registration or user-store failure.
    App(AppError),
}

impl ApiError {
    /// 401 with the given message.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::App(AppError::Unauthorized(message.into()))
    }

    /// HTTP status of the error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        let code = match self {
            Self::Ledger(err) => err.http_status_code(),
            Self::App(err) => err.status_code(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Ledger(err) => err.error_code(),
            Self::App(err) => err.error_code(),
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Ledger(err) => err.to_string(),
            Self::App(
                AppError::Unauthorized(msg)
                | AppError::Validation(msg)
                | AppError::Database(msg)
                | AppError::Internal(msg),
            ) => msg.clone(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::EncodingError(msg) => Self::App(AppError::Internal(msg)),
            JwtError::Expired => Self::unauthorized("Token has expired"),
            JwtError::DecodingError(_) | JwtError::Invalid => {
                Self::unauthorized("Token is invalid or malformed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(code = self.code(), error = %self.message(), "request failed");
            "An internal error occurred".to_string()
        } else {
            self.message()
        };

        (status, Json(json!({ "error": self.code(), "message": message }))).into_response()
    }
}
