//! Gateway types module
//!
//! This module provides type-safe types for API boundary enforcement:
//!
//! ## Input Types
//! - [`StrictDecimal`]: Format-validated decimal for API input
//! - [`CreateAccountRequest`], [`CreateTransferRequest`]: request bodies
//! - [`ValidatedJson`]: Axum extractor for framework-level validation
//!
//! ## Output Types
//! - [`ApiResponse<T>`]: Unified API response wrapper
//! - [`ApiError`] / [`ApiResult<T>`]: Error path in the same envelope
//!
//! ## Submodules
//! - [`money`]: Money types (StrictDecimal)
//! - [`request`]: Request types and validation
//! - [`response`]: Response types and error codes

pub mod money;
pub mod request;
pub mod response;

// Re-export commonly used types at module root
pub use money::StrictDecimal;
pub use request::{CreateAccountRequest, CreateTransferRequest, ValidatedJson, validation_message};
pub use response::{ApiError, ApiResponse, ApiResult, BalanceData, created, error_codes, ok};
