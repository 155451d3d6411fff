//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `ApiError` / `ApiResult<T>`: handler error path rendered in the same envelope
//! - `error_codes`: Standard error code constants
//! - Various response DTOs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::account::AccountError;
use crate::money;
use crate::transfer::TransferError;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

// ============================================================================
// Error path
// ============================================================================

/// Handler error rendered as `(status, ApiResponse<()>)`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// 200 with data
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

/// 201 with data
pub fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER, msg)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error_codes::AUTH_FAILED, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error_codes::ACCOUNT_NOT_FOUND, msg)
    }

    /// Generic 500; the detail belongs in the log, not the body
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            "Internal server error",
        )
    }

    pub fn into_err<T>(self) -> ApiResult<T> {
        Err(self)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiResponse::<()>::error(self.code, self.msg)),
        )
            .into_response()
    }
}

impl From<TransferError> for ApiError {
    fn from(e: TransferError) -> Self {
        if !e.is_client_fault() {
            tracing::error!(error = %e, "Transfer failed");
        }
        let status =
            StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = match e {
            TransferError::SelfTransfer => error_codes::SELF_TRANSFER,
            TransferError::InvalidAmount(_) => error_codes::INVALID_AMOUNT,
            TransferError::OriginNotFound | TransferError::DestinationNotFound => {
                error_codes::ACCOUNT_NOT_FOUND
            }
            TransferError::InsufficientFunds => error_codes::INSUFFICIENT_BALANCE,
            TransferError::PersistenceFailure(_) => error_codes::INTERNAL_ERROR,
        };
        Self::new(status, code, e.public_message())
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        let status =
            StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match e {
            AccountError::Validation(e) => Self::bad_request(e.to_string()),
            AccountError::NotFound => Self::not_found("Account not found"),
            AccountError::AlreadyExists => Self::new(
                status,
                error_codes::ACCOUNT_EXISTS,
                "Account with this cpf already exists",
            ),
            AccountError::Persistence(detail) => {
                tracing::error!(error = %detail, "Account operation failed");
                Self::internal()
            }
        }
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Balance response data, always rendered with 2 fractional digits
#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceData {
    #[schema(example = "100.00")]
    pub balance: String,
}

impl BalanceData {
    pub fn new(balance: Decimal) -> Self {
        Self {
            balance: money::format_amount(balance),
        }
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_BALANCE: i32 = 1002;
    pub const INVALID_AMOUNT: i32 = 1003;
    pub const SELF_TRANSFER: i32 = 1004;

    // Auth errors (2xxx)
    pub const MISSING_AUTH: i32 = 2001;
    pub const AUTH_FAILED: i32 = 2002;

    // Resource errors (4xxx)
    pub const ACCOUNT_NOT_FOUND: i32 = 4001;
    pub const ACCOUNT_EXISTS: i32 = 4009;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_omits_data() {
        let json = serde_json::to_value(ApiResponse::<()>::error(
            error_codes::AUTH_FAILED,
            "nope",
        ))
        .unwrap();
        assert_eq!(json["code"], 2002);
        assert_eq!(json["msg"], "nope");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_transfer_error_mapping() {
        let e: ApiError = TransferError::InsufficientFunds.into();
        assert_eq!(e.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(e.code, error_codes::INSUFFICIENT_BALANCE);

        let e: ApiError = TransferError::PersistenceFailure("disk on fire".into()).into();
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.msg, "Internal server error");
    }

    #[test]
    fn test_account_error_mapping() {
        let e: ApiError = AccountError::AlreadyExists.into();
        assert_eq!(e.status, StatusCode::CONFLICT);
        assert_eq!(e.code, error_codes::ACCOUNT_EXISTS);

        let e: ApiError = AccountError::NotFound.into();
        assert_eq!(e.status, StatusCode::NOT_FOUND);
    }
}
