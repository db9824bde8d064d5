//! Identity collaborator port.

use uuid::Uuid;

use crate::domain::Viewer;

/// Claims carried by bearer tokens.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub role: String,
    pub exp: i64,
}

impl From<TokenClaims> for Viewer {
    fn from(claims: TokenClaims) -> Self {
        Viewer::new(claims.user_id, claims.role)
    }
}

/// Token service trait for JWT operations.
pub trait TokenService: Send + Sync {
    /// Issue a token. Used by the identity service and by tests.
    fn generate_token(&self, user_id: Uuid, role: &str) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    fn expiration_seconds(&self) -> i64;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,
}
