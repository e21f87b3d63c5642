//! Server initialization and routing

use crate::api;
use crate::cache::CacheManager;
use crate::config::Config;
use crate::migration;
use crate::state::AppState;
use crate::workers;
use anyhow::Result;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::mysql::MySqlPoolOptions;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Run the server
pub async fn run(config: Config) -> Result<()> {
    migration::run_migrations(&config).await?;

    let db_pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;
    info!("Connected to database");

    let cache_manager = CacheManager::new(&config.redis).await?;
    info!("Connected to Redis");

    let http_addr = config.http_addr();
    let state = AppState::new(config, db_pool, cache_manager);

    workers::spawn(&state);

    let app = build_router(state);

    let listener = TcpListener::bind(&http_addr).await?;
    info!("HTTP server started on {}", http_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the HTTP router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health endpoints
        .route("/health", get(api::health::health))
        .route("/ready", get(api::health::ready))
        // Public endpoints
        .route("/api/v1/signup", post(api::tenant::signup))
        .route("/api/v1/billing/webhook", post(api::billing::webhook))
        .route("/api/v1/billing/plans", get(api::billing::plans))
        // Auth endpoints
        .route("/api/v1/auth/login", post(api::auth::login))
        .route("/api/v1/auth/me", get(api::auth::me))
        .route(
            "/api/v1/platform/auth/login",
            post(api::auth::platform_login),
        )
        // Tenant-scoped billing
        .route(
            "/api/v1/billing/subscription",
            get(api::billing::subscription),
        )
        // Role-permission matrix
        .route("/api/v1/menu", get(api::rbac::menu))
        .route(
            "/api/v1/roles/permissions",
            get(api::rbac::list_matrix).post(api::rbac::upsert),
        )
        .route(
            "/api/v1/roles/{role_name}/permissions",
            put(api::rbac::replace_role),
        )
        .route("/api/v1/roles/{role_name}", delete(api::rbac::delete_role))
        // Employees
        .route(
            "/api/v1/employees",
            get(api::employee::list).post(api::employee::create),
        )
        .route(
            "/api/v1/employees/{id}",
            get(api::employee::get)
                .put(api::employee::update)
                .delete(api::employee::delete),
        )
        // Departments
        .route(
            "/api/v1/departments",
            get(api::department::list).post(api::department::create),
        )
        .route(
            "/api/v1/departments/{id}",
            get(api::department::get)
                .put(api::department::update)
                .delete(api::department::delete),
        )
        // Positions
        .route(
            "/api/v1/positions",
            get(api::position::list).post(api::position::create),
        )
        .route(
            "/api/v1/positions/{id}",
            get(api::position::get)
                .put(api::position::update)
                .delete(api::position::delete),
        )
        // Attendance
        .route("/api/v1/attendance", get(api::attendance::list))
        .route("/api/v1/attendance/check-in", post(api::attendance::check_in))
        .route(
            "/api/v1/attendance/check-out",
            post(api::attendance::check_out),
        )
        // Leave requests
        .route(
            "/api/v1/leave-requests",
            get(api::leave::list).post(api::leave::create),
        )
        .route("/api/v1/leave-requests/{id}", get(api::leave::get))
        .route(
            "/api/v1/leave-requests/{id}/approve",
            post(api::leave::approve),
        )
        .route(
            "/api/v1/leave-requests/{id}/reject",
            post(api::leave::reject),
        )
        // Tenant-scoped audit logs
        .route("/api/v1/audit-logs", get(api::audit::tenant_logs))
        // Platform endpoints (SuperAdmin)
        .route("/api/v1/platform/tenants", get(api::tenant::list))
        .route(
            "/api/v1/platform/tenants/{id}",
            get(api::tenant::get)
                .put(api::tenant::update)
                .delete(api::tenant::delete),
        )
        .route(
            "/api/v1/platform/tenants/{id}/suspend",
            post(api::tenant::suspend),
        )
        .route(
            "/api/v1/platform/tenants/{id}/resume",
            post(api::tenant::resume),
        )
        .route(
            "/api/v1/platform/tenants/{id}/cancel",
            post(api::tenant::cancel),
        )
        .route(
            "/api/v1/platform/tenants/{id}/impersonate",
            post(api::tenant::impersonate),
        )
        .route(
            "/api/v1/platform/tenants/{id}/reconcile",
            post(api::billing::reconcile),
        )
        .route(
            "/api/v1/platform/tenants/{id}/subscription",
            put(api::billing::override_subscription),
        )
        .route("/api/v1/platform/billing/events", get(api::billing::events))
        .route("/api/v1/platform/alerts", get(api::billing::alerts))
        .route(
            "/api/v1/platform/alerts/{id}/resolve",
            post(api::billing::resolve_alert),
        )
        .route(
            "/api/v1/platform/audit-logs",
            get(api::audit::platform_logs),
        )
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
