//! Leave request API handlers

use crate::api::{
    tenant_scope, write_audit_log, PaginatedResponse, PaginationQuery, SuccessResponse,
};
use crate::domain::{CreateLeaveRequestInput, LeaveStatus, PermissionAction, StringUuid};
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
use serde::Deserialize;

const PAGE: &str = "/leave-requests";

/// Submit a leave request
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    tenant: TenantContext,
    auth: AuthUser,
    Json(input): Json<CreateLeaveRequestInput>,
) -> Result<impl IntoResponse> {
    policy::authorize(
        &state.rbac_service,
        &auth,
        tenant.tenant_id(),
        PAGE,
        PermissionAction::Create,
    )
    .await?;

    let request = state
        .leave_service
        .create(tenant_scope(&auth, &tenant), input)
        .await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "leave_request.create",
        "leave_request",
        Some(request.id.to_string()),
        None,
        serde_json::to_value(&request).ok(),
    )
    .await;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(request))))
}

/// Get a leave request by ID
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

    let request = state
        .leave_service
        .get(tenant_scope(&auth, &tenant), id)
        .await?;
    Ok(Json(SuccessResponse::new(request)))
}

#[derive(Debug, Deserialize)]
pub struct LeaveListQuery {
    pub status: Option<LeaveStatus>,
}

/// List leave requests, optionally filtered by status
pub async fn list(
    State(state): State<AppState>,
    tenant: TenantContext,
    auth: AuthUser,
    Query(filter): Query<LeaveListQuery>,
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

    let (requests, total) = state
        .leave_service
        .list(
            tenant_scope(&auth, &tenant),
            filter.status,
            pagination.offset(),
            pagination.per_page,
        )
        .await?;

    Ok(Json(PaginatedResponse::new(
        requests,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Approve a pending leave request
pub async fn approve(
    State(state): State<AppState>,
    headers: HeaderMap,
    tenant: TenantContext,
    auth: AuthUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    decide(state, headers, tenant, auth, id, LeaveStatus::Approved).await
}

/// Reject a pending leave request
pub async fn reject(
    State(state): State<AppState>,
    headers: HeaderMap,
    tenant: TenantContext,
    auth: AuthUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    decide(state, headers, tenant, auth, id, LeaveStatus::Rejected).await
}

async fn decide(
    state: AppState,
    headers: HeaderMap,
    tenant: TenantContext,
    auth: AuthUser,
    id: StringUuid,
    decision: LeaveStatus,
) -> Result<Json<SuccessResponse<crate::domain::LeaveRequest>>> {
    policy::authorize(
        &state.rbac_service,
        &auth,
        tenant.tenant_id(),
        PAGE,
        PermissionAction::Edit,
    )
    .await?;

    let scope = tenant_scope(&auth, &tenant);
    let request = match decision {
        LeaveStatus::Approved => state.leave_service.approve(scope, id, auth.user_id).await?,
        _ => state.leave_service.reject(scope, id, auth.user_id).await?,
    };

    let action = match decision {
        LeaveStatus::Approved => "leave_request.approve",
        _ => "leave_request.reject",
    };
    write_audit_log(
        &state,
        &headers,
        &auth,
        action,
        "leave_request",
        Some(id.to_string()),
        None,
        serde_json::to_value(&request).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(request)))
}
