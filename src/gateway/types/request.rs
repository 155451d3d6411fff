//! Request bodies and the validating JSON extractor
//!
//! - `CreateAccountRequest`, `CreateTransferRequest`: HTTP request deserialization
//! - `ValidatedJson<T>`: Axum extractor that rejects malformed or invalid
//!   bodies before the handler runs

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use super::money::StrictDecimal;
use super::response::ApiError;
use crate::account::validation::validate_cpf;

// ============================================================================
// Request DTOs
// ============================================================================

/// Create account request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAccountRequest {
    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "Maria Souza")]
    pub name: String,
    #[validate(custom(function = "validate_cpf"))]
    #[schema(example = "52998224725")]
    pub cpf: String,
    #[validate(length(min = 6, max = 12, message = "secret must be 6 to 12 characters"))]
    #[schema(example = "abc123")]
    pub secret: String,
}

/// Create transfer request
///
/// The origin account is the authenticated caller.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTransferRequest {
    #[schema(example = 2)]
    pub account_destination_id: i64,
    /// Amount - format validated by StrictDecimal
    #[schema(value_type = String, example = "25.00")]
    pub amount: StrictDecimal,
}

// ============================================================================
// ValidatedJson: Axum Framework Integration
// ============================================================================

/// JSON body that has passed `validator` rules
///
/// Both a body that fails to deserialize and one that fails validation are
/// rejected with 400 in the standard envelope.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value): Json<T> = Json::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;

        value
            .validate()
            .map_err(|e| ApiError::bad_request(validation_message(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Flatten field errors into one stable, sorted message
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{}: {}", field, msg),
                None => format!("{}: invalid ({})", field, e.code),
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}
