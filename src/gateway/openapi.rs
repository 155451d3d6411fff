//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::account::Account;
use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{BalanceData, CreateAccountRequest, CreateTransferRequest};
use crate::transfer::Transfer;
use crate::user_auth::handlers::{LoginRequest, LoginResponse};

/// JWT bearer authentication security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /api/v1/login"))
                        .build(),
                ),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bank Ledger API",
        version = "1.0.0",
        description = "Accounts, balances and atomic transfers between accounts."
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::account::list_accounts,
        crate::gateway::handlers::account::get_account_balance,
        crate::gateway::handlers::account::create_account,
        crate::user_auth::handlers::login,
        crate::gateway::handlers::transfer::list_transfers,
        crate::gateway::handlers::transfer::create_transfer,
    ),
    components(
        schemas(
            HealthResponse,
            Account,
            BalanceData,
            CreateAccountRequest,
            LoginRequest,
            LoginResponse,
            Transfer,
            CreateTransferRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Account", description = "Account listing, balance and creation"),
        (name = "Auth", description = "Login"),
        (name = "Transfer", description = "Transfers between accounts (auth required)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
