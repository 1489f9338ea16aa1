//! Bearer token verification against the identity provider's key set.
//!
//! Tokens are RS256 JWTs issued by an Auth0-style provider. The signing key is
//! selected by the `kid` header from the provider's published JWKS, and the
//! `permissions` claim carries the strings checked by each protected route.

pub mod jwks;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::{AuthConfig, ConfigError};
use crate::types::Permission;

pub use jwks::KeySource;

/// Claims this service reads from an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

/// Reasons a request fails authorization.
/// The display text is the message returned to the client.
#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    MissingHeader,

    #[error("Authorization header must start with \"Bearer\".")]
    NotBearer,

    #[error("Token not found.")]
    TokenNotFound,

    #[error("Authorization header must be bearer token.")]
    MalformedHeader,

    #[error("Authorization malformed.")]
    MalformedToken,

    #[error("Unable to find the appropriate key.")]
    UnknownKey,

    #[error("Token expired.")]
    Expired,

    #[error("Incorrect claims. Please, check the audience and issuer.")]
    IncorrectClaims,

    #[error("Unable to parse authentication token.")]
    Unparseable,

    #[error("Permissions not included in JWT.")]
    PermissionsMissing,

    #[error("Permission not found.")]
    PermissionNotFound,

    #[error("Unable to fetch signing keys: {0}")]
    KeySetUnavailable(String),
}

impl AuthError {
    /// Provider-style error code, logged alongside rejections
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "authorization_header_missing",
            AuthError::NotBearer
            | AuthError::TokenNotFound
            | AuthError::MalformedHeader
            | AuthError::MalformedToken
            | AuthError::UnknownKey
            | AuthError::Unparseable => "invalid_header",
            AuthError::Expired => "token_expired",
            AuthError::IncorrectClaims | AuthError::PermissionsMissing => "invalid_claims",
            AuthError::PermissionNotFound => "unauthorized",
            AuthError::KeySetUnavailable(_) => "jwks_unavailable",
        }
    }
}

/// Verifies access tokens issued by the configured provider
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    keys: KeySource,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(keys: KeySource, issuer: &str, audience: &str, leeway_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.leeway = leeway_secs;

        Self { keys, validation }
    }

    /// Build a verifier that fetches keys from the provider
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        let keys = KeySource::remote(
            config.jwks_url()?,
            Duration::from_secs(config.jwks_timeout_secs),
        )
        .map_err(|e| ConfigError::Invalid {
            name: "AUTH_JWKS_URL",
            reason: e.to_string(),
        })?;

        Ok(Self::new(
            keys,
            &config.issuer()?,
            config.audience()?,
            config.leeway_secs,
        ))
    }

    /// Check signature, expiry, audience and issuer; return the claims
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        let kid = header.kid.ok_or(AuthError::MalformedToken)?;

        let key_set = self.keys.key_set().await?;
        let jwk = key_set.find(&kid).ok_or(AuthError::UnknownKey)?;
        let key = DecodingKey::from_jwk(jwk).map_err(|_| AuthError::UnknownKey)?;

        let data = decode::<Claims>(token, &key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => AuthError::IncorrectClaims,
            _ => AuthError::Unparseable,
        })?;

        Ok(data.claims)
    }
}

/// Require `permission` in the token's `permissions` claim
pub fn check_permissions(permission: Permission, claims: &Claims) -> Result<(), AuthError> {
    let granted = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::PermissionsMissing)?;

    if granted.iter().any(|p| p == permission.as_str()) {
        Ok(())
    } else {
        Err(AuthError::PermissionNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(permissions: Option<Vec<&str>>) -> Claims {
        Claims {
            sub: Some("auth0|barista".into()),
            exp: 0,
            iat: None,
            permissions: permissions.map(|p| p.into_iter().map(String::from).collect()),
        }
    }

    #[test]
    fn permission_present() {
        let claims = claims(Some(vec!["get:drinks-detail", "post:drinks"]));
        assert_eq!(check_permissions(Permission::PostDrinks, &claims), Ok(()));
    }

    #[test]
    fn permission_absent() {
        let claims = claims(Some(vec!["get:drinks-detail"]));
        assert_eq!(
            check_permissions(Permission::DeleteDrinks, &claims),
            Err(AuthError::PermissionNotFound)
        );
    }

    #[test]
    fn permissions_claim_missing() {
        assert_eq!(
            check_permissions(Permission::GetDrinksDetail, &claims(None)),
            Err(AuthError::PermissionsMissing)
        );
    }

    #[test]
    fn permission_match_is_exact() {
        let claims = claims(Some(vec!["patch:drinks-detail", "PATCH:DRINKS"]));
        assert!(check_permissions(Permission::PatchDrinks, &claims).is_err());
    }

    #[tokio::test]
    async fn garbage_token_is_malformed() {
        let keys = KeySource::Static(jsonwebtoken::jwk::JwkSet { keys: vec![] });
        let verifier = TokenVerifier::new(keys, "https://issuer/", "drinks", 0);
        assert_eq!(verifier.verify("not-a-jwt").await.unwrap_err(), AuthError::MalformedToken);
    }

    #[test]
    fn codes_follow_provider_conventions() {
        assert_eq!(AuthError::MissingHeader.code(), "authorization_header_missing");
        assert_eq!(AuthError::Expired.code(), "token_expired");
        assert_eq!(AuthError::PermissionsMissing.code(), "invalid_claims");
        assert_eq!(AuthError::PermissionNotFound.code(), "unauthorized");
    }
}
