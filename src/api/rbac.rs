//! Role-permission matrix API handlers

use crate::api::{tenant_scope, write_audit_log, MessageResponse, SuccessResponse};
use crate::domain::{PermissionAction, ReplaceRoleMatrixInput, UpsertRolePermissionInput};
use crate::error::Result;
use crate::middleware::{AuthUser, TenantContext};
use crate::policy;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};

const ROLES_PAGE: &str = "/settings/roles";

/// The full permission matrix for the tenant
pub async fn list_matrix(
    State(state): State<AppState>,
    tenant: TenantContext,
    auth: AuthUser,
) -> Result<impl IntoResponse> {
    policy::authorize(
        &state.rbac_service,
        &auth,
        tenant.tenant_id(),
        ROLES_PAGE,
        PermissionAction::View,
    )
    .await?;

    let matrix = state
        .rbac_service
        .list_matrix(tenant_scope(&auth, &tenant))
        .await?;
    Ok(Json(SuccessResponse::new(matrix)))
}

/// Upsert a single (role, page) row
pub async fn upsert(
    State(state): State<AppState>,
    headers: HeaderMap,
    tenant: TenantContext,
    auth: AuthUser,
    Json(input): Json<UpsertRolePermissionInput>,
) -> Result<impl IntoResponse> {
    policy::authorize(
        &state.rbac_service,
        &auth,
        tenant.tenant_id(),
        ROLES_PAGE,
        PermissionAction::Edit,
    )
    .await?;

    let row = state
        .rbac_service
        .upsert(tenant_scope(&auth, &tenant), input)
        .await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "role_permission.upsert",
        "role_permission",
        Some(row.id.to_string()),
        None,
        serde_json::to_value(&row).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(row)))
}

/// Replace a role's entire matrix
pub async fn replace_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    tenant: TenantContext,
    auth: AuthUser,
    Path(role_name): Path<String>,
    Json(mut input): Json<ReplaceRoleMatrixInput>,
) -> Result<impl IntoResponse> {
    policy::authorize(
        &state.rbac_service,
        &auth,
        tenant.tenant_id(),
        ROLES_PAGE,
        PermissionAction::Edit,
    )
    .await?;

    // The path segment is authoritative
    input.role_name = role_name.clone();
    let matrix = state
        .rbac_service
        .replace_role_matrix(tenant_scope(&auth, &tenant), input)
        .await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "role_permission.replace",
        "role",
        Some(role_name),
        None,
        serde_json::to_value(&matrix).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(matrix)))
}

/// Remove a role and all of its matrix rows
pub async fn delete_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    tenant: TenantContext,
    auth: AuthUser,
    Path(role_name): Path<String>,
) -> Result<impl IntoResponse> {
    policy::authorize(
        &state.rbac_service,
        &auth,
        tenant.tenant_id(),
        ROLES_PAGE,
        PermissionAction::Delete,
    )
    .await?;

    state
        .rbac_service
        .delete_role(tenant_scope(&auth, &tenant), &role_name)
        .await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "role_permission.delete_role",
        "role",
        Some(role_name),
        None,
        None,
    )
    .await;
    Ok(Json(MessageResponse::new("Role deleted")))
}

/// Pages the caller's role may access, for menu rendering
pub async fn menu(
    State(state): State<AppState>,
    tenant: TenantContext,
    auth: AuthUser,
) -> Result<impl IntoResponse> {
    let pages = state
        .rbac_service
        .accessible_pages(tenant_scope(&auth, &tenant), &auth.role)
        .await?;
    Ok(Json(SuccessResponse::new(pages)))
}
