//! Department API handlers

use crate::api::{tenant_scope, write_audit_log, MessageResponse, SuccessResponse};
use crate::domain::{CreateDepartmentInput, PermissionAction, StringUuid, UpdateDepartmentInput};
use crate::error::Result;
use crate::middleware::{AuthUser, TenantContext};
use crate::policy;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

const PAGE: &str = "/departments";

pub async fn list(
    State(state): State<AppState>,
    tenant: TenantContext,
    auth: AuthUser,
) -> Result<impl IntoResponse> {
    policy::authorize(
        &state.rbac_service,
        &auth,
        tenant.tenant_id(),
        PAGE,
        PermissionAction::View,
    )
    .await?;

    let departments = state
        .directory_service
        .list_departments(tenant_scope(&auth, &tenant))
        .await?;
    Ok(Json(SuccessResponse::new(departments)))
}

pub async fn get(
    State(state): State<AppState>,
    tenant: TenantContext,
    auth: AuthUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    policy::authorize(
        &state.rbac_service,
        &auth,
        tenant.tenant_id(),
        PAGE,
        PermissionAction::View,
    )
    .await?;

    let department = state
        .directory_service
        .get_department(tenant_scope(&auth, &tenant), id)
        .await?;
    Ok(Json(SuccessResponse::new(department)))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    tenant: TenantContext,
    auth: AuthUser,
    Json(input): Json<CreateDepartmentInput>,
) -> Result<impl IntoResponse> {
    policy::authorize(
        &state.rbac_service,
        &auth,
        tenant.tenant_id(),
        PAGE,
        PermissionAction::Create,
    )
    .await?;

    let department = state
        .directory_service
        .create_department(tenant_scope(&auth, &tenant), input)
        .await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "department.create",
        "department",
        Some(department.id.to_string()),
        None,
        serde_json::to_value(&department).ok(),
    )
    .await;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(department))))
}

pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    tenant: TenantContext,
    auth: AuthUser,
    Path(id): Path<StringUuid>,
    Json(input): Json<UpdateDepartmentInput>,
) -> Result<impl IntoResponse> {
    policy::authorize(
        &state.rbac_service,
        &auth,
        tenant.tenant_id(),
        PAGE,
        PermissionAction::Edit,
    )
    .await?;

    let scope = tenant_scope(&auth, &tenant);
    let before = state.directory_service.get_department(scope, id).await?;
    let department = state
        .directory_service
        .update_department(scope, id, input)
        .await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "department.update",
        "department",
        Some(id.to_string()),
        serde_json::to_value(&before).ok(),
        serde_json::to_value(&department).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(department)))
}

pub async fn delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    tenant: TenantContext,
    auth: AuthUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    policy::authorize(
        &state.rbac_service,
        &auth,
        tenant.tenant_id(),
        PAGE,
        PermissionAction::Delete,
    )
    .await?;

    let scope = tenant_scope(&auth, &tenant);
    let before = state.directory_service.get_department(scope, id).await?;
    state.directory_service.delete_department(scope, id).await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "department.delete",
        "department",
        Some(id.to_string()),
        serde_json::to_value(&before).ok(),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new("Department deleted")))
}
