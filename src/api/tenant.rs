//! Tenant signup and platform tenant administration

use crate::api::{
    require_super_admin, write_audit_log, MessageResponse, PaginatedResponse, PaginationQuery,
    SuccessResponse,
};
use crate::domain::{SignupInput, StringUuid, Subscription, Tenant, UpdateTenantInput};
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::service::TokenPair;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

/// Register a new tenant (public endpoint)
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupInput>,
) -> Result<impl IntoResponse> {
    let tenant = state.tenant_service.signup(input).await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(tenant))))
}

/// List all tenants (platform)
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse> {
    require_super_admin(&auth)?;

    let (tenants, total) = state
        .tenant_service
        .list_tenants(pagination.offset(), pagination.per_page)
        .await?;

    Ok(Json(PaginatedResponse::new(
        tenants,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

#[derive(Debug, Serialize)]
pub struct TenantDetail {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub subscription: Option<Subscription>,
}

/// Get tenant by ID with its subscription (platform)
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    require_super_admin(&auth)?;
    let tenant = state.tenant_service.get_tenant(id).await?;
    let subscription = state.billing_service.tenant_subscription(id).await?;
    Ok(Json(SuccessResponse::new(TenantDetail {
        tenant,
        subscription,
    })))
}

/// Update tenant profile (platform)
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    auth: AuthUser,
    Path(id): Path<StringUuid>,
    Json(input): Json<UpdateTenantInput>,
) -> Result<impl IntoResponse> {
    require_super_admin(&auth)?;

    let before = state.tenant_service.get_tenant(id).await?;
    let tenant = state.tenant_service.update_profile(id, input).await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "tenant.update",
        "tenant",
        Some(id.to_string()),
        serde_json::to_value(&before).ok(),
        serde_json::to_value(&tenant).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(tenant)))
}

/// Suspend a tenant (platform)
pub async fn suspend(
    State(state): State<AppState>,
    headers: HeaderMap,
    auth: AuthUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    require_super_admin(&auth)?;

    let before = state.tenant_service.get_tenant(id).await?;
    let tenant = state.tenant_service.suspend(id).await?;
    audit_transition(&state, &headers, &auth, "tenant.suspend", &before, &tenant).await;
    Ok(Json(SuccessResponse::new(tenant)))
}

/// Resume a suspended tenant (platform)
pub async fn resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    auth: AuthUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    require_super_admin(&auth)?;

    let before = state.tenant_service.get_tenant(id).await?;
    let tenant = state.tenant_service.resume(id).await?;
    audit_transition(&state, &headers, &auth, "tenant.resume", &before, &tenant).await;
    Ok(Json(SuccessResponse::new(tenant)))
}

/// Cancel a tenant (platform)
pub async fn cancel(
    State(state): State<AppState>,
    headers: HeaderMap,
    auth: AuthUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    require_super_admin(&auth)?;

    let before = state.tenant_service.get_tenant(id).await?;
    let tenant = state.tenant_service.cancel(id).await?;
    audit_transition(&state, &headers, &auth, "tenant.cancel", &before, &tenant).await;
    Ok(Json(SuccessResponse::new(tenant)))
}

/// Permanently delete a canceled tenant's data (platform)
pub async fn delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    auth: AuthUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    require_super_admin(&auth)?;

    let before = state.tenant_service.get_tenant(id).await?;
    state.tenant_service.delete(id).await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "tenant.delete",
        "tenant",
        Some(id.to_string()),
        serde_json::to_value(&before).ok(),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new("Tenant data deleted")))
}

#[derive(Debug, Serialize)]
pub struct ImpersonateResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub tenant: Tenant,
}

/// Issue a short-lived impersonation token for a tenant (platform)
pub async fn impersonate(
    State(state): State<AppState>,
    headers: HeaderMap,
    auth: AuthUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    require_super_admin(&auth)?;

    let (tokens, tenant) = state.auth_service.impersonate(&auth, id).await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "tenant.impersonate",
        "tenant",
        Some(id.to_string()),
        None,
        None,
    )
    .await;
    Ok(Json(SuccessResponse::new(ImpersonateResponse {
        tokens,
        tenant,
    })))
}

async fn audit_transition(
    state: &AppState,
    headers: &HeaderMap,
    auth: &AuthUser,
    action: &str,
    before: &Tenant,
    after: &Tenant,
) {
    write_audit_log(
        state,
        headers,
        auth,
        action,
        "tenant",
        Some(after.id.to_string()),
        serde_json::to_value(before).ok(),
        serde_json::to_value(after).ok(),
    )
    .await;
}
