//! Identity gate: bearer tokens for accounts
//!
//! Login verifies the account's credentials and mints an HS256 JWT whose
//! subject is the account id. The middleware verifies it on protected routes.

pub mod handlers;
pub mod middleware;
pub mod service;

pub use middleware::{AuthenticatedAccount, jwt_auth_middleware};
pub use service::{AuthError, Claims, IdentityGate, JwtGate};
