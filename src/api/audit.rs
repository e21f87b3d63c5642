//! Audit log query handlers

use crate::api::{require_super_admin, PaginatedResponse, PaginationQuery};
use crate::domain::PermissionAction;
use crate::error::Result;
use crate::middleware::{AuthUser, TenantContext};
use crate::policy;
use crate::repository::{AuditLogQuery, AuditRepository};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

/// Audit logs for the resolved tenant. Impersonated actions within the
/// tenant are included; the matrix's settings page gates access.
pub async fn tenant_logs(
    State(state): State<AppState>,
    tenant: TenantContext,
    auth: AuthUser,
    Query(mut query): Query<AuditLogQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse> {
    policy::authorize(
        &state.rbac_service,
        &auth,
        tenant.tenant_id(),
        "/settings/roles",
        PermissionAction::View,
    )
    .await?;

    // Tenant callers only ever see their own rows
    query.tenant_id = Some(tenant.tenant_id());
    query.offset = Some(pagination.offset());
    query.limit = Some(pagination.per_page);

    let logs = state.audit_repo.find(&query).await?;
    let total = state.audit_repo.count(&query).await?;

    Ok(Json(PaginatedResponse::new(
        logs,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Audit logs across all tenants and the platform (platform)
pub async fn platform_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(mut query): Query<AuditLogQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse> {
    require_super_admin(&auth)?;

    query.offset = Some(pagination.offset());
    query.limit = Some(pagination.per_page);

    let logs = state.audit_repo.find(&query).await?;
    let total = state.audit_repo.count(&query).await?;

    Ok(Json(PaginatedResponse::new(
        logs,
        pagination.page,
        pagination.per_page,
        total,
    )))
}
