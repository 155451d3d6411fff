use axum::extract::State;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use crate::account::AccountError;
use crate::account::validation::validate_cpf;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiError, ApiResponse, ApiResult, ValidatedJson, ok};

/// Login Request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(custom(function = "validate_cpf"))]
    #[schema(example = "52998224725")]
    pub cpf: String,
    #[validate(length(min = 1, message = "secret is required"))]
    #[schema(example = "abc123")]
    pub secret: String,
}

/// Login Response (JWT)
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

/// Login with cpf and secret
///
/// POST /api/v1/login
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    match state.account_service.authenticate(&req.cpf, &req.secret).await {
        Ok(token) => ok(LoginResponse { token }),
        Err(AccountError::NotFound) => ApiError::unauthorized("Invalid cpf or secret").into_err(),
        Err(e) => Err(e.into()),
    }
}
