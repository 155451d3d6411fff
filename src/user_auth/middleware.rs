use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::service::AuthError;
use crate::gateway::{
    state::AppState,
    types::{ApiResponse, error_codes},
};

/// Account the bearer token was issued for
///
/// Handlers behind [`jwt_auth_middleware`] take this as the trusted caller
/// identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub account_id: i64,
}

pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<ApiResponse<()>>)> {
    // 1. Extract Authorization header
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error(
                error_codes::MISSING_AUTH,
                "Missing Authorization header",
            )),
        ))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or((
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error(
            error_codes::AUTH_FAILED,
            "Invalid token format",
        )),
    ))?;

    // 2. Verify token
    match state.gate.verify(token) {
        Ok(account_id) => {
            // 3. Inject account id
            request
                .extensions_mut()
                .insert(AuthenticatedAccount { account_id });
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Bearer token rejected");
            let msg = match e {
                AuthError::Expired => "Token expired",
                _ => "Invalid or expired token",
            };
            Err((
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::<()>::error(error_codes::AUTH_FAILED, msg)),
            ))
        }
    }
}
