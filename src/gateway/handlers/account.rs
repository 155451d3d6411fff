//! Account handlers (listing, balance, creation)

use std::sync::Arc;

use axum::extract::{Path, State};

use super::super::state::AppState;
use super::super::types::{
    ApiError, ApiResponse, ApiResult, BalanceData, CreateAccountRequest, ValidatedJson, created,
    ok,
};
use crate::account::Account;

/// List all accounts
///
/// GET /api/v1/accounts
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    responses(
        (status = 200, description = "All accounts", body = ApiResponse<Vec<Account>>),
        (status = 500, description = "Internal server error")
    ),
    tag = "Account"
)]
pub async fn list_accounts(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Account>> {
    let accounts = state.account_service.list_all().await?;
    ok(accounts)
}

/// Get the balance of one account
///
/// GET /api/v1/accounts/{account_id}/balance
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}/balance",
    params(
        ("account_id" = i64, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Account balance", body = ApiResponse<BalanceData>),
        (status = 400, description = "account_id is not numeric"),
        (status = 404, description = "Account not found")
    ),
    tag = "Account"
)]
pub async fn get_account_balance(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<String>,
) -> ApiResult<BalanceData> {
    let account_id: i64 = account_id
        .parse()
        .map_err(|_| ApiError::bad_request("account_id must be numeric"))?;

    let balance = state.account_service.get_balance(account_id).await?;
    ok(BalanceData::new(balance))
}

/// Create an account with the initial balance
///
/// POST /api/v1/accounts
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<Account>),
        (status = 400, description = "Invalid name, cpf or secret"),
        (status = 409, description = "cpf already registered"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Account"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateAccountRequest>,
) -> ApiResult<Account> {
    let account = state
        .account_service
        .create(&req.name, &req.cpf, &req.secret)
        .await?;
    created(account)
}
