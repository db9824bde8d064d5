//! HS256 bearer tokens carrying a user id and role.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use feedline_core::ports::{AuthError, TokenClaims, TokenService};

const DEFAULT_SECRET: &str = "change-me-in-production";
const DEFAULT_ROLE: &str = "user";

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime of issued tokens.
    pub expiration_hours: i64,
    /// Expected `iss` claim. Tokens from any other issuer are rejected.
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            expiration_hours: 24,
            issuer: "feedline-identity".to_string(),
        }
    }
}

impl JwtConfig {
    /// Read `JWT_SECRET`, `JWT_ISSUER` and `JWT_EXPIRATION_HOURS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            expiration_hours: std::env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|hours| hours.parse().ok())
                .unwrap_or(defaults.expiration_hours),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        };
        config.warn_on_default_secret();
        config
    }

    fn warn_on_default_secret(&self) {
        if self.secret != DEFAULT_SECRET {
            return;
        }
        let production = matches!(
            std::env::var("RUST_ENV").as_deref(),
            Ok("production") | Ok("prod")
        );
        if production {
            tracing::error!(
                "JWT_SECRET is unset in production; tokens are signed with the default secret"
            );
        } else {
            tracing::warn!("JWT_SECRET is unset; using the development default");
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default = "default_role")]
    role: String,
    exp: i64,
    iat: i64,
    iss: String,
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

fn classify(err: JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken(err.to_string()),
    }
}

pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }
}

impl TokenService for JwtTokenService {
    fn generate_token(&self, user_id: Uuid, role: &str) -> Result<String, AuthError> {
        let issued_at = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp: (issued_at + TimeDelta::hours(self.config.expiration_hours)).timestamp(),
            iat: issued_at.timestamp(),
            iss: self.config.issuer.clone(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(classify)
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let claims =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
                .map_err(classify)?
                .claims;

        let user_id = claims.sub.parse::<Uuid>().map_err(|_| {
            AuthError::InvalidToken(format!("subject is not a user id: {}", claims.sub))
        })?;

        Ok(TokenClaims {
            user_id,
            role: claims.role,
            exp: claims.exp,
        })
    }

    fn expiration_seconds(&self) -> i64 {
        TimeDelta::hours(self.config.expiration_hours).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use feedline_core::domain::Viewer;

    use super::*;

    fn config(issuer: &str) -> JwtConfig {
        JwtConfig {
            secret: "unit-secret".to_string(),
            expiration_hours: 1,
            issuer: issuer.to_string(),
        }
    }

    #[test]
    fn test_token_yields_viewer_with_role() {
        let tokens = JwtTokenService::new(config("identity"));
        let user_id = Uuid::new_v4();

        let token = tokens.generate_token(user_id, "moderator").unwrap();
        let viewer: Viewer = tokens.validate_token(&token).unwrap().into();

        assert_eq!(viewer, Viewer::new(user_id, "moderator"));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let tokens = JwtTokenService::new(config("identity"));

        assert!(matches!(
            tokens.validate_token("not.a.jwt"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_foreign_issuer_is_rejected() {
        let ours = JwtTokenService::new(config("identity"));
        let theirs = JwtTokenService::new(config("someone-else"));

        let token = theirs.generate_token(Uuid::new_v4(), "user").unwrap();

        assert!(matches!(
            ours.validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let ours = JwtTokenService::new(config("identity"));
        let forged = JwtTokenService::new(JwtConfig {
            secret: "guessed".to_string(),
            ..config("identity")
        });

        let token = forged.generate_token(Uuid::new_v4(), "admin").unwrap();

        assert!(ours.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_reported_as_expired() {
        let tokens = JwtTokenService::new(JwtConfig {
            expiration_hours: -2,
            ..config("identity")
        });

        let token = tokens.generate_token(Uuid::new_v4(), "user").unwrap();

        assert!(matches!(
            tokens.validate_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_expiration_seconds() {
        let tokens = JwtTokenService::new(JwtConfig {
            expiration_hours: 24,
            ..config("identity")
        });

        assert_eq!(tokens.expiration_seconds(), 86_400);
    }
}
