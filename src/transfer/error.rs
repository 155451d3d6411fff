//! Transfer Error Types

use thiserror::Error;

use crate::money::MoneyError;

/// Every rejection the transfer engine can produce
///
/// Validation kinds are client faults; `PersistenceFailure` is a server fault
/// whose detail is logged but never sent to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransferError {
    // === Validation Errors ===
    #[error("Origin and destination accounts are equal")]
    SelfTransfer,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    // === Account Errors ===
    #[error("Origin account not found")]
    OriginNotFound,

    #[error("Destination account not found")]
    DestinationNotFound,

    #[error("Insufficient funds")]
    InsufficientFunds,

    // === System Errors ===
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

impl TransferError {
    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            TransferError::SelfTransfer | TransferError::InvalidAmount(_) => 400,
            TransferError::OriginNotFound | TransferError::DestinationNotFound => 404,
            TransferError::InsufficientFunds => 422,
            TransferError::PersistenceFailure(_) => 500,
        }
    }

    /// Message safe to send to the caller
    pub fn public_message(&self) -> String {
        match self {
            TransferError::PersistenceFailure(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_client_fault(&self) -> bool {
        !matches!(self, TransferError::PersistenceFailure(_))
    }
}

impl From<MoneyError> for TransferError {
    fn from(e: MoneyError) -> Self {
        TransferError::InvalidAmount(e.to_string())
    }
}
