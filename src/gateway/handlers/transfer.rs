//! Transfer handlers (authenticated caller is the origin account)

use std::sync::Arc;

use axum::{Extension, extract::State};

use super::super::state::AppState;
use super::super::types::{
    ApiResponse, ApiResult, CreateTransferRequest, ValidatedJson, created, ok,
};
use crate::transfer::{Transfer, TransferFilter};
use crate::user_auth::AuthenticatedAccount;

/// List transfers sent by the caller
///
/// GET /api/v1/transfers
#[utoipa::path(
    get,
    path = "/api/v1/transfers",
    responses(
        (status = 200, description = "Transfers with the caller as origin", body = ApiResponse<Vec<Transfer>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Transfer"
)]
pub async fn list_transfers(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedAccount>,
) -> ApiResult<Vec<Transfer>> {
    let transfers = state
        .transfer_engine
        .list_transfers(&TransferFilter::by_origin(caller.account_id))
        .await?;
    ok(transfers)
}

/// Transfer funds from the caller to another account
///
/// POST /api/v1/transfers
#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    request_body = CreateTransferRequest,
    responses(
        (status = 201, description = "Transfer committed", body = ApiResponse<Transfer>),
        (status = 400, description = "Self transfer or invalid amount"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Origin or destination not found"),
        (status = 422, description = "Insufficient funds"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Transfer"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedAccount>,
    ValidatedJson(req): ValidatedJson<CreateTransferRequest>,
) -> ApiResult<Transfer> {
    let transfer = state
        .transfer_engine
        .create_transfer(
            caller.account_id,
            req.account_destination_id,
            req.amount.inner(),
        )
        .await?;
    created(transfer)
}
