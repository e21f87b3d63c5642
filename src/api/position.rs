//! Position API handlers

use crate::api::{tenant_scope, write_audit_log, MessageResponse, SuccessResponse};
use crate::domain::{CreatePositionInput, PermissionAction, StringUuid, UpdatePositionInput};
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

const PAGE: &str = "/positions";

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

    let positions = state
        .directory_service
        .list_positions(tenant_scope(&auth, &tenant))
        .await?;
    Ok(Json(SuccessResponse::new(positions)))
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

    let position = state
        .directory_service
        .get_position(tenant_scope(&auth, &tenant), id)
        .await?;
    Ok(Json(SuccessResponse::new(position)))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    tenant: TenantContext,
    auth: AuthUser,
    Json(input): Json<CreatePositionInput>,
) -> Result<impl IntoResponse> {
    policy::authorize(
        &state.rbac_service,
        &auth,
        tenant.tenant_id(),
        PAGE,
        PermissionAction::Create,
    )
    .await?;

    let position = state
        .directory_service
        .create_position(tenant_scope(&auth, &tenant), input)
        .await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "position.create",
        "position",
        Some(position.id.to_string()),
        None,
        serde_json::to_value(&position).ok(),
    )
    .await;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(position))))
}

pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    tenant: TenantContext,
    auth: AuthUser,
    Path(id): Path<StringUuid>,
    Json(input): Json<UpdatePositionInput>,
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
    let before = state.directory_service.get_position(scope, id).await?;
    let position = state
        .directory_service
        .update_position(scope, id, input)
        .await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "position.update",
        "position",
        Some(id.to_string()),
        serde_json::to_value(&before).ok(),
        serde_json::to_value(&position).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(position)))
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
    let before = state.directory_service.get_position(scope, id).await?;
    state.directory_service.delete_position(scope, id).await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "position.delete",
        "position",
        Some(id.to_string()),
        serde_json::to_value(&before).ok(),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new("Position deleted")))
}
