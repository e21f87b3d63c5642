//! Employee API handlers

use crate::api::{
    tenant_scope, write_audit_log, MessageResponse, PaginatedResponse, PaginationQuery,
    SuccessResponse,
};
use crate::domain::{CreateEmployeeInput, PermissionAction, StringUuid, UpdateEmployeeInput};
use crate::error::Result;
use crate::middleware::{AuthUser, TenantContext};
use crate::policy;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

const PAGE: &str = "/employees";

/// List employees
pub async fn list(
    State(state): State<AppState>,
    tenant: TenantContext,
    auth: AuthUser,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse> {
    policy::authorize(
        &state.rbac_service,
        &auth,
        tenant.tenant_id(),
        PAGE,
        PermissionAction::View,
    )
    .await?;

    let (employees, total) = state
        .employee_service
        .list(
            tenant_scope(&auth, &tenant),
            pagination.offset(),
            pagination.per_page,
        )
        .await?;

    Ok(Json(PaginatedResponse::new(
        employees,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Get employee by ID
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

    let employee = state
        .employee_service
        .get(tenant_scope(&auth, &tenant), id)
        .await?;
    Ok(Json(SuccessResponse::new(employee)))
}

/// Create employee
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    tenant: TenantContext,
    auth: AuthUser,
    Json(input): Json<CreateEmployeeInput>,
) -> Result<impl IntoResponse> {
    policy::authorize(
        &state.rbac_service,
        &auth,
        tenant.tenant_id(),
        PAGE,
        PermissionAction::Create,
    )
    .await?;

    let employee = state
        .employee_service
        .create(tenant_scope(&auth, &tenant), input)
        .await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "employee.create",
        "employee",
        Some(employee.id.to_string()),
        None,
        serde_json::to_value(&employee).ok(),
    )
    .await;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(employee))))
}

/// Update employee
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    tenant: TenantContext,
    auth: AuthUser,
    Path(id): Path<StringUuid>,
    Json(input): Json<UpdateEmployeeInput>,
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
    let before = state.employee_service.get(scope, id).await?;
    let employee = state.employee_service.update(scope, id, input).await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "employee.update",
        "employee",
        Some(id.to_string()),
        serde_json::to_value(&before).ok(),
        serde_json::to_value(&employee).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(employee)))
}

/// Delete employee
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
    let before = state.employee_service.get(scope, id).await?;
    state.employee_service.delete(scope, id).await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "employee.delete",
        "employee",
        Some(id.to_string()),
        serde_json::to_value(&before).ok(),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new("Employee deleted")))
}
