//! JWT authentication extractor
//!
//! `AuthUser` validates the Bearer token and exposes the caller's
//! identity, role, and tenant binding to handlers.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::domain::{AccessScope, StringUuid, SUPER_ADMIN_ROLE};
use crate::jwt::AccessClaims;
use crate::state::AppState;

/// Authenticated user information extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// User ID from the token's `sub` claim
    pub user_id: StringUuid,
    pub email: String,
    /// Tenant the token is bound to; `None` for platform tokens
    pub tenant_id: Option<StringUuid>,
    pub role: String,
    /// SuperAdmin acting through an impersonation token, if any
    pub impersonator_id: Option<StringUuid>,
}

impl AuthUser {
    pub fn from_claims(claims: AccessClaims) -> Result<Self, AuthError> {
        let user_id = claims
            .sub
            .parse::<StringUuid>()
            .map_err(|_| AuthError::InvalidToken("Invalid user ID in token".to_string()))?;

        let tenant_id = claims
            .tenant_id
            .as_deref()
            .map(|t| t.parse::<StringUuid>())
            .transpose()
            .map_err(|_| AuthError::InvalidToken("Invalid tenant ID in token".to_string()))?;

        let impersonator_id = claims
            .act
            .as_deref()
            .map(|a| a.parse::<StringUuid>())
            .transpose()
            .map_err(|_| AuthError::InvalidToken("Invalid actor in token".to_string()))?;

        Ok(Self {
            user_id,
            email: claims.email,
            tenant_id,
            role: claims.role,
            impersonator_id,
        })
    }

    /// Platform principal: no tenant binding and the SuperAdmin role
    pub fn is_super_admin(&self) -> bool {
        self.tenant_id.is_none() && self.role == SUPER_ADMIN_ROLE
    }

    pub fn is_impersonation(&self) -> bool {
        self.impersonator_id.is_some()
    }

    /// The data scope this principal queries under. Impersonation tokens
    /// are tenant-bound, so they get a tenant scope like any other
    /// tenant principal.
    pub fn scope(&self) -> AccessScope {
        match self.tenant_id {
            Some(tid) => AccessScope::Tenant(tid),
            None => AccessScope::Platform,
        }
    }
}

/// Authentication errors
#[derive(Debug, Clone)]
pub enum AuthError {
    MissingToken,
    InvalidHeader(String),
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "Missing authorization token",
            AuthError::InvalidHeader(_) => "Invalid authorization header",
            AuthError::InvalidToken(_) => "Invalid token",
        };

        let body = serde_json::json!({
            "error": message,
            "code": "UNAUTHORIZED"
        });

        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

/// Extract and validate a Bearer token from the Authorization header
pub fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidHeader("Invalid header encoding".to_string()))?;

    if !auth_header.starts_with("Bearer ") {
        return Err(AuthError::InvalidHeader(
            "Authorization header must use Bearer scheme".to_string(),
        ));
    }

    Ok(&auth_header[7..])
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;

        let claims = state
            .jwt_manager
            .verify_access_token(token)
            .map_err(|_| AuthError::InvalidToken("Token validation failed".to_string()))?;

        AuthUser::from_claims(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(tenant_id: Option<&str>, role: &str, act: Option<&str>) -> AccessClaims {
        AccessClaims {
            sub: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            email: "test@example.com".to_string(),
            iss: "https://peopleops.test".to_string(),
            aud: "peopleops".to_string(),
            token_type: "access".to_string(),
            tenant_id: tenant_id.map(|s| s.to_string()),
            role: role.to_string(),
            act: act.map(|s| s.to_string()),
            iat: 1_000_000,
            exp: 1_003_600,
        }
    }

    #[test]
    fn test_platform_claims_give_platform_scope() {
        let user = AuthUser::from_claims(claims(None, SUPER_ADMIN_ROLE, None)).unwrap();
        assert!(user.is_super_admin());
        assert!(user.scope().is_platform());
    }

    #[test]
    fn test_tenant_claims_give_tenant_scope() {
        let user = AuthUser::from_claims(claims(
            Some("6ba7b810-9dad-11d1-80b4-00c04fd430c8"),
            "Manager",
            None,
        ))
        .unwrap();
        assert!(!user.is_super_admin());
        assert_eq!(
            user.scope().tenant_id().map(|t| t.to_string()),
            Some("6ba7b810-9dad-11d1-80b4-00c04fd430c8".to_string())
        );
    }

    #[test]
    fn test_impersonation_claims_are_tenant_scoped() {
        let user = AuthUser::from_claims(claims(
            Some("6ba7b810-9dad-11d1-80b4-00c04fd430c8"),
            "Admin",
            Some("550e8400-e29b-41d4-a716-446655440000"),
        ))
        .unwrap();
        assert!(user.is_impersonation());
        assert!(!user.is_super_admin());
        assert!(!user.scope().is_platform());
    }

    #[test]
    fn test_invalid_sub_rejected() {
        let mut c = claims(None, SUPER_ADMIN_ROLE, None);
        c.sub = "not-a-uuid".to_string();
        assert!(AuthUser::from_claims(c).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer test-token-123".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers).unwrap(), "test-token-123");
    }

    #[test]
    fn test_extract_bearer_token_missing() {
        let headers = axum::http::HeaderMap::new();
        assert!(matches!(
            extract_bearer_token(&headers),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn test_extract_bearer_token_wrong_scheme() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        assert!(matches!(
            extract_bearer_token(&headers),
            Err(AuthError::InvalidHeader(_))
        ));
    }
}
