//! Login endpoints for tenant users and platform operators

use crate::api::{write_audit_log, SuccessResponse};
use crate::domain::{LoginInput, User};
use crate::error::Result;
use crate::middleware::{AuthUser, TenantContext};
use crate::service::TokenPair;
use crate::state::AppState;
use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: User,
}

/// Log in within the resolved tenant
pub async fn login(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(input): Json<LoginInput>,
) -> Result<impl IntoResponse> {
    let (tokens, user) = state
        .auth_service
        .login(Some(tenant.tenant_id()), input)
        .await?;

    Ok(Json(SuccessResponse::new(LoginResponse { tokens, user })))
}

/// Log in as a platform operator (no tenant context)
pub async fn platform_login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<impl IntoResponse> {
    let (tokens, user) = state.auth_service.login(None, input).await?;
    Ok(Json(SuccessResponse::new(LoginResponse { tokens, user })))
}

/// The authenticated principal's own claims
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
    auth: AuthUser,
) -> Result<impl IntoResponse> {
    // Impersonated sessions are audited on every identity lookup
    if auth.is_impersonation() {
        write_audit_log(
            &state,
            &headers,
            &auth,
            "auth.impersonated_access",
            "user",
            Some(auth.user_id.to_string()),
            None,
            None,
        )
        .await;
    }
    Ok(Json(SuccessResponse::new(auth)))
}
