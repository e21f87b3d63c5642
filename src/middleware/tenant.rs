//! Tenant resolution extractor
//!
//! Resolves the tenant for each request from the `X-Tenant-ID` header
//! first, falling back to the `Host` header against the tenant's
//! registered domain. Rejects requests for tenants that are not
//! servable, and restricts suspended tenants to billing pages.

use axum::{
    extract::FromRequestParts,
    http::{header::HOST, request::Parts},
};

use crate::domain::{StringUuid, Tenant, TenantStatus};
use crate::error::AppError;
use crate::middleware::auth::extract_bearer_token;
use crate::repository::TenantRepository;
use crate::state::AppState;

/// Header carrying an explicit tenant id, taking precedence over Host
pub const TENANT_ID_HEADER: &str = "x-tenant-id";

/// Path prefixes still reachable while a tenant is suspended: billing
/// pages, and login so the admin can obtain a token to reach them.
const SUSPENDED_ALLOWED_PREFIXES: &[&str] = &["/api/v1/billing", "/api/v1/auth"];

/// The tenant resolved for the current request
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant: Tenant,
}

impl TenantContext {
    pub fn tenant_id(&self) -> StringUuid {
        self.tenant.id
    }
}

impl FromRequestParts<AppState> for TenantContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let tenant = match parts.headers.get(TENANT_ID_HEADER) {
            Some(value) => {
                let id = value
                    .to_str()
                    .ok()
                    .and_then(|s| s.parse::<StringUuid>().ok())
                    .ok_or_else(|| {
                        AppError::BadRequest("Invalid X-Tenant-ID header".to_string())
                    })?;
                resolve_by_id(state, id).await?
            }
            None => {
                let host = parts
                    .headers
                    .get(HOST)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| AppError::BadRequest("Missing Host header".to_string()))?;
                resolve_by_domain(state, strip_port(host)).await?
            }
        };

        match tenant.status {
            TenantStatus::Active => {}
            TenantStatus::Suspended => {
                if !servable_while_suspended(parts.uri.path()) {
                    return Err(AppError::TenantSuspended(
                        "Account suspended; only billing is available".to_string(),
                    ));
                }
            }
            // Provisioning, Canceled and Deleted tenants are not served;
            // their existence is not revealed either.
            _ => return Err(AppError::NotFound("Unknown tenant".to_string())),
        }

        // A token bound to one tenant must not be replayed against another
        if let Ok(token) = extract_bearer_token(&parts.headers) {
            if let Ok(claims) = state.jwt_manager.verify_access_token(token) {
                if let Some(claim_tenant) = claims.tenant_id.as_deref() {
                    if claim_tenant != tenant.id.to_string() {
                        return Err(AppError::Forbidden(
                            "Token is not valid for this tenant".to_string(),
                        ));
                    }
                }
            }
        }

        Ok(TenantContext { tenant })
    }
}

async fn resolve_by_id(state: &AppState, id: StringUuid) -> Result<Tenant, AppError> {
    if let Some(tenant) = state.cache_manager.get_tenant_by_id(id).await.unwrap_or(None) {
        return Ok(tenant);
    }

    let tenant = state
        .tenant_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Unknown tenant".to_string()))?;

    if let Err(e) = state.cache_manager.set_tenant(&tenant).await {
        tracing::warn!(error = %e, "Failed to cache tenant");
    }
    Ok(tenant)
}

async fn resolve_by_domain(state: &AppState, domain: &str) -> Result<Tenant, AppError> {
    if let Some(tenant) = state
        .cache_manager
        .get_tenant_by_domain(domain)
        .await
        .unwrap_or(None)
    {
        return Ok(tenant);
    }

    let tenant = state
        .tenant_repo
        .find_by_domain(domain)
        .await?
        .ok_or_else(|| AppError::NotFound("Unknown tenant".to_string()))?;

    if let Err(e) = state.cache_manager.set_tenant(&tenant).await {
        tracing::warn!(error = %e, "Failed to cache tenant");
    }
    Ok(tenant)
}

/// Whether a suspended tenant may still be served this path
fn servable_while_suspended(path: &str) -> bool {
    SUSPENDED_ALLOWED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Drop the `:port` suffix from a Host header value
fn strip_port(host: &str) -> &str {
    host.rsplit_once(':')
        .map(|(h, port)| if port.chars().all(|c| c.is_ascii_digit()) { h } else { host })
        .unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("acme.example.com:8080"), "acme.example.com");
        assert_eq!(strip_port("acme.example.com"), "acme.example.com");
        assert_eq!(strip_port("localhost:3000"), "localhost");
    }

    #[test]
    fn test_suspended_tenant_can_still_log_in_and_reach_billing() {
        assert!(servable_while_suspended("/api/v1/auth/login"));
        assert!(servable_while_suspended("/api/v1/auth/me"));
        assert!(servable_while_suspended("/api/v1/billing/subscription"));
    }

    #[test]
    fn test_suspended_tenant_blocked_elsewhere() {
        assert!(!servable_while_suspended("/api/v1/employees"));
        assert!(!servable_while_suspended("/api/v1/leave-requests"));
        assert!(!servable_while_suspended("/api/v1/menu"));
    }
}
