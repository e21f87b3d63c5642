//! REST API shared utilities (response types, pagination, audit helpers)

pub mod attendance;
pub mod audit;
pub mod auth;
pub mod billing;
pub mod department;
pub mod employee;
pub mod health;
pub mod leave;
pub mod position;
pub mod rbac;
pub mod tenant;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::repository::{AuditRepository, CreateAuditLogInput};
use crate::state::AppState;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

/// Maximum allowed per_page value for pagination
pub(crate) const MAX_PER_PAGE: i64 = 100;

/// Require a platform (SuperAdmin) principal
pub(crate) fn require_super_admin(auth: &AuthUser) -> Result<()> {
    if auth.is_super_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("SuperAdmin required".to_string()))
    }
}

/// The scope tenant-level handlers operate in. SuperAdmins (including
/// impersonation sessions resolving through a tenant token) act within
/// the request's resolved tenant; tenant users act within their own.
pub(crate) fn tenant_scope(
    auth: &AuthUser,
    tenant: &crate::middleware::TenantContext,
) -> crate::domain::AccessScope {
    if auth.is_super_admin() {
        crate::domain::AccessScope::Tenant(tenant.tenant_id())
    } else {
        auth.scope()
    }
}

/// Pagination query parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationQuery {
    #[serde(default = "default_page", deserialize_with = "deserialize_page")]
    pub page: i64,
    #[serde(
        default = "default_per_page",
        deserialize_with = "deserialize_per_page",
        alias = "limit"
    )]
    pub per_page: i64,
}

impl PaginationQuery {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

pub(crate) fn default_page() -> i64 {
    1
}

pub(crate) fn default_per_page() -> i64 {
    20
}

/// Reject page values less than 1
pub(crate) fn deserialize_page<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    if value < 1 {
        return Err(serde::de::Error::custom(
            "page must be a positive integer (>= 1)",
        ));
    }
    Ok(value)
}

/// Reject per_page values less than 1, clamp to MAX_PER_PAGE
pub(crate) fn deserialize_per_page<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    if value < 1 {
        return Err(serde::de::Error::custom(
            "per_page must be a positive integer (>= 1)",
        ));
    }
    Ok(value.min(MAX_PER_PAGE))
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: i64, per_page: i64, total: i64) -> Self {
        let total_pages = (total as f64 / per_page as f64).ceil() as i64;
        Self {
            data,
            pagination: PaginationMeta {
                page,
                per_page,
                total,
                total_pages,
            },
        }
    }
}

/// Success response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Message response (for delete, etc.)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Write an audit log entry. Failures are logged, never surfaced: audit
/// writes must not fail the mutation they describe.
#[allow(clippy::too_many_arguments)]
pub async fn write_audit_log(
    state: &AppState,
    headers: &HeaderMap,
    auth: &AuthUser,
    action: &str,
    resource_type: &str,
    resource_id: Option<String>,
    old_value: Option<serde_json::Value>,
    new_value: Option<serde_json::Value>,
) {
    let input = CreateAuditLogInput {
        tenant_id: auth.tenant_id,
        actor_id: Some(auth.user_id),
        impersonator_id: auth.impersonator_id,
        action: action.to_string(),
        resource_type: resource_type.to_string(),
        resource_id,
        old_value,
        new_value,
        ip_address: extract_ip(headers),
    };

    if let Err(e) = state.audit_repo.create(&input).await {
        tracing::error!(error = %e, action = %input.action, "Failed to write audit log");
    }
}

pub(crate) fn extract_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get("x-forwarded-for") {
        if let Ok(forwarded) = value.to_str() {
            if let Some(first) = forwarded.split(',').next() {
                let trimmed = first.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }

    if let Some(value) = headers.get("x-real-ip") {
        if let Ok(real_ip) = value.to_str() {
            if !real_ip.trim().is_empty() {
                return Some(real_ip.trim().to_string());
            }
        }
    }

    None
}
