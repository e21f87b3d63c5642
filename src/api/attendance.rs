//! Attendance API handlers

use crate::api::{
    tenant_scope, write_audit_log, PaginatedResponse, PaginationQuery, SuccessResponse,
};
use crate::domain::{AttendanceQuery, CheckInInput, CheckOutInput, PermissionAction};
use crate::error::Result;
use crate::middleware::{AuthUser, TenantContext};
use crate::policy;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

const PAGE: &str = "/attendance";

/// Record today's check-in for an employee
pub async fn check_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    tenant: TenantContext,
    auth: AuthUser,
    Json(input): Json<CheckInInput>,
) -> Result<impl IntoResponse> {
    policy::authorize(
        &state.rbac_service,
        &auth,
        tenant.tenant_id(),
        PAGE,
        PermissionAction::Create,
    )
    .await?;

    let record = state
        .attendance_service
        .check_in(tenant_scope(&auth, &tenant), input)
        .await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "attendance.check_in",
        "attendance_record",
        Some(record.id.to_string()),
        None,
        serde_json::to_value(&record).ok(),
    )
    .await;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(record))))
}

/// Record today's check-out for an employee
pub async fn check_out(
    State(state): State<AppState>,
    headers: HeaderMap,
    tenant: TenantContext,
    auth: AuthUser,
    Json(input): Json<CheckOutInput>,
) -> Result<impl IntoResponse> {
    policy::authorize(
        &state.rbac_service,
        &auth,
        tenant.tenant_id(),
        PAGE,
        PermissionAction::Create,
    )
    .await?;

    let record = state
        .attendance_service
        .check_out(tenant_scope(&auth, &tenant), input)
        .await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "attendance.check_out",
        "attendance_record",
        Some(record.id.to_string()),
        None,
        serde_json::to_value(&record).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(record)))
}

/// List attendance records with optional filters
pub async fn list(
    State(state): State<AppState>,
    tenant: TenantContext,
    auth: AuthUser,
    Query(filter): Query<AttendanceQuery>,
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

    let (records, total) = state
        .attendance_service
        .list(
            tenant_scope(&auth, &tenant),
            filter,
            pagination.offset(),
            pagination.per_page,
        )
        .await?;

    Ok(Json(PaginatedResponse::new(
        records,
        pagination.page,
        pagination.per_page,
        total,
    )))
}
