//! Billing API handlers: webhook ingestion, plans, subscription views,
//! and platform billing operations

use crate::api::{
    require_super_admin, write_audit_log, MessageResponse, PaginatedResponse, PaginationQuery,
    SuccessResponse,
};
use crate::domain::{
    BillingEventPayload, PermissionAction, StringUuid, SubscriptionOverrideInput,
    WebhookEventStatus,
};
use crate::error::{AppError, Result};
use crate::middleware::{AuthUser, TenantContext};
use crate::policy;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

/// Header carrying the hex HMAC-SHA256 of the raw request body
pub const SIGNATURE_HEADER: &str = "x-billing-signature";

const BILLING_PAGE: &str = "/billing";

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub outcome: crate::service::IngestOutcome,
}

/// Ingest a billing provider webhook. Signature is verified over the
/// raw body before anything is parsed.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    state.billing_service.verify_signature(&body, signature)?;

    let raw: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook body: {}", e)))?;
    let payload: BillingEventPayload = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {}", e)))?;

    let outcome = state.billing_service.ingest(payload, raw).await?;
    Ok(Json(WebhookResponse { outcome }))
}

/// List available subscription plans (public)
pub async fn plans(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let plans = state.billing_service.list_plans().await?;
    Ok(Json(SuccessResponse::new(plans)))
}

/// The resolved tenant's live subscription
pub async fn subscription(
    State(state): State<AppState>,
    tenant: TenantContext,
    auth: AuthUser,
) -> Result<impl IntoResponse> {
    policy::authorize(
        &state.rbac_service,
        &auth,
        tenant.tenant_id(),
        BILLING_PAGE,
        PermissionAction::View,
    )
    .await?;

    let subscription = state
        .billing_service
        .tenant_subscription(tenant.tenant_id())
        .await?;
    Ok(Json(SuccessResponse::new(subscription)))
}

/// Reconcile a tenant's status against its subscription (platform)
pub async fn reconcile(
    State(state): State<AppState>,
    headers: HeaderMap,
    auth: AuthUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    require_super_admin(&auth)?;

    let report = state.billing_service.reconcile(id).await?;
    if report.changed {
        write_audit_log(
            &state,
            &headers,
            &auth,
            "billing.reconcile",
            "tenant",
            Some(id.to_string()),
            None,
            serde_json::to_value(&report).ok(),
        )
        .await;
    }
    Ok(Json(SuccessResponse::new(report)))
}

/// Manually override a tenant's subscription (platform)
pub async fn override_subscription(
    State(state): State<AppState>,
    headers: HeaderMap,
    auth: AuthUser,
    Path(id): Path<StringUuid>,
    Json(input): Json<SubscriptionOverrideInput>,
) -> Result<impl IntoResponse> {
    require_super_admin(&auth)?;

    let subscription = state
        .billing_service
        .override_subscription(id, input)
        .await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "billing.override_subscription",
        "subscription",
        Some(subscription.id.to_string()),
        None,
        serde_json::to_value(&subscription).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(subscription)))
}

#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    pub status: Option<WebhookEventStatus>,
    pub tenant_id: Option<StringUuid>,
}

/// List stored webhook events (platform)
pub async fn events(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<EventListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse> {
    require_super_admin(&auth)?;

    let (events, total) = state
        .billing_service
        .list_events(
            filter.status,
            filter.tenant_id,
            pagination.offset(),
            pagination.per_page,
        )
        .await?;

    Ok(Json(PaginatedResponse::new(
        events,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

#[derive(Debug, Deserialize)]
pub struct AlertListQuery {
    pub tenant_id: Option<StringUuid>,
    #[serde(default)]
    pub unresolved_only: bool,
}

/// List operational alerts (platform)
pub async fn alerts(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<AlertListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse> {
    require_super_admin(&auth)?;

    let (alerts, total) = state
        .billing_service
        .list_alerts(
            filter.tenant_id,
            filter.unresolved_only,
            pagination.offset(),
            pagination.per_page,
        )
        .await?;

    Ok(Json(PaginatedResponse::new(
        alerts,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Mark an alert as resolved (platform)
pub async fn resolve_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    require_super_admin(&auth)?;

    state.billing_service.resolve_alert(id, auth.user_id).await?;
    write_audit_log(
        &state,
        &headers,
        &auth,
        "alert.resolve",
        "alert",
        Some(id.to_string()),
        None,
        None,
    )
    .await;
    Ok(Json(MessageResponse::new("Alert resolved")))
}
