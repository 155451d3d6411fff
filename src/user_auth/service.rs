use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (account_id as string)
    pub exp: usize,  // Expiration time (as UTC timestamp)
    pub iat: usize,  // Issued at
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("failed to issue token: {0}")]
    Issue(String),

    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// Turns an account id into a bearer credential and back
///
/// Identity lives entirely in the token; no session state is kept.
pub trait IdentityGate: Send + Sync {
    fn issue(&self, account_id: i64) -> Result<String, AuthError>;

    /// Account id the token was issued for
    fn verify(&self, token: &str) -> Result<i64, AuthError>;
}

/// HS256 JWT gate with a shared secret
pub struct JwtGate {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtGate {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }
}

impl IdentityGate for JwtGate {
    fn issue(&self, account_id: i64) -> Result<String, AuthError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Issue("expiration out of range".to_string()))?
            .timestamp();

        let claims = Claims {
            sub: account_id.to_string(),
            exp: expiration.max(0) as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Issue(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<i64, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::Expired,
                    _ => AuthError::InvalidToken(e.to_string()),
                }
            })?;

        token_data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidToken("subject is not an account id".to_string()))
    }
}
