//! HTTP gateway
//!
//! Axum router over the account service and transfer engine. Transfer
//! routes sit behind the JWT middleware; everything else is public.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

/// Build the complete router for `state`
pub fn build_router(state: Arc<AppState>) -> Router {
    // ==========================================================================
    // Public Routes (no auth required)
    // ==========================================================================
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/accounts",
            get(handlers::list_accounts).post(handlers::create_account),
        )
        .route(
            "/accounts/{account_id}/balance",
            get(handlers::get_account_balance),
        )
        .route("/login", post(crate::user_auth::handlers::login));

    // ==========================================================================
    // Private Routes (bearer token required)
    // ==========================================================================
    let private_routes = Router::new()
        .route(
            "/transfers",
            get(handlers::list_transfers).post(handlers::create_transfer),
        )
        .layer(from_fn_with_state(
            state.clone(),
            crate::user_auth::middleware::jwt_auth_middleware,
        ));

    Router::new()
        .nest("/api/v1", public_routes.merge(private_routes))
        .with_state(state)
        // OpenAPI / Swagger UI (stateless, added after with_state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Bind `host:port` and serve until the listener fails
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> std::io::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Gateway listening on http://{}", addr);
    info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app).await
}
