//! JWT Token handling

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{CallerIdentity, UserRole};

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "super-secret-key-change-in-production".to_string(),
            expiration_hours: 24,
            issuer: "hr-admin".to_string(),
        }
    }
}

/// JWT TokenClaims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl TokenClaims {
    pub fn new(identity: &CallerIdentity, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: identity.id.to_string(),
            role: identity.role,
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Caller identity carried by the token; `None` when `sub` is not a user id.
    pub fn identity(&self) -> Option<CallerIdentity> {
        let id = self.sub.parse().ok()?;
        Some(CallerIdentity {
            id,
            role: self.role,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        })
    }
}

/// Create a JWT token for an authenticated identity
pub fn create_token(
    identity: &CallerIdentity,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let token_claims = TokenClaims::new(identity, config);

    encode(
        &Header::default(),
        &token_claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify and decode a JWT token
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> CallerIdentity {
        CallerIdentity {
            id: 42,
            role: UserRole::Manager,
            first_name: "Pierre".into(),
            last_name: "Jonker".into(),
        }
    }

    #[test]
    fn test_create_and_verify_token() {
        let config = JwtConfig::default();
        let token = create_token(&identity(), &config).unwrap();

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, UserRole::Manager);
        assert!(!claims.is_expired());
        assert_eq!(claims.identity(), Some(identity()));
    }

    #[test]
    fn test_invalid_token() {
        let config = JwtConfig::default();
        assert!(verify_token("invalid-token", &config).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_token(&identity(), &JwtConfig::default()).unwrap();
        let other = JwtConfig {
            secret: "another-secret".into(),
            ..JwtConfig::default()
        };
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn test_wrong_issuer_is_rejected() {
        let token = create_token(&identity(), &JwtConfig::default()).unwrap();
        let other = JwtConfig {
            issuer: "someone-else".into(),
            ..JwtConfig::default()
        };
        assert!(verify_token(&token, &other).is_err());
    }
}
