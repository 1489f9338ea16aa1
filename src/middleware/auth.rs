use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{check_permissions, AuthError, Claims, TokenVerifier};
use crate::error::ApiError;
use crate::types::Permission;

/// Authenticated caller extracted from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub subject: Option<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
        }
    }
}

impl AuthUser {
    /// Subject for log lines
    pub fn who(&self) -> &str {
        self.subject.as_deref().unwrap_or("<unknown>")
    }
}

/// Middleware state: the verifier plus the permission a route requires
#[derive(Clone)]
pub struct PermissionGuard {
    verifier: Arc<TokenVerifier>,
    permission: Permission,
}

impl PermissionGuard {
    pub fn new(verifier: Arc<TokenVerifier>, permission: Permission) -> Self {
        Self { verifier, permission }
    }
}

/// Permission-checking middleware wrapped around each protected handler.
///
/// Validates the bearer token, requires the guard's permission in the token's
/// `permissions` claim and injects [`AuthUser`] into the request extensions.
pub async fn requires_auth(
    State(guard): State<PermissionGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?.to_string();

    let claims = guard.verifier.verify(&token).await?;
    check_permissions(guard.permission, &claims)?;

    let auth_user = AuthUser::from(claims);
    tracing::debug!("Authorized {} for {}", auth_user.who(), guard.permission);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let parts: Vec<&str> = auth_str.split_whitespace().collect();
    match parts.as_slice() {
        [] => Err(AuthError::MissingHeader),
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(AuthError::NotBearer),
        [_] => Err(AuthError::TokenNotFound),
        [_, token] => Ok(*token),
        _ => Err(AuthError::MalformedHeader),
    }
}
