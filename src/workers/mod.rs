//! Background workers
//!
//! Two pollers run alongside the HTTP server: the provisioner finishes
//! setup for newly signed-up tenants, and the lifecycle enforcer
//! advances tenants whose suspension grace period or cancellation
//! retention window has expired.

use crate::state::AppState;
use std::time::Duration;
use tracing::{debug, error, info};

/// Tenants picked up per provisioning pass
const PROVISION_BATCH: i64 = 20;

/// Spawn all background workers
pub fn spawn(state: &AppState) {
    tokio::spawn(run_provisioner(state.clone()));
    tokio::spawn(run_lifecycle_enforcer(state.clone()));
}

/// Poll for tenants in Provisioning and finish their setup
async fn run_provisioner(state: AppState) {
    let period = Duration::from_secs(state.config.lifecycle.provision_poll_secs);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    info!(period_secs = period.as_secs(), "Provisioner started");

    loop {
        ticker.tick().await;
        match state.tenant_service.provision_pending(PROVISION_BATCH).await {
            Ok(0) => debug!("No tenants waiting for provisioning"),
            Ok(n) => info!(count = n, "Provisioned tenants"),
            Err(e) => error!(error = %e, "Provisioning pass failed"),
        }
    }
}

/// Enforce suspension grace periods and cancellation retention
async fn run_lifecycle_enforcer(state: AppState) {
    let period = Duration::from_secs(state.config.lifecycle.enforce_poll_secs);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    info!(period_secs = period.as_secs(), "Lifecycle enforcer started");

    loop {
        ticker.tick().await;

        match state.tenant_service.cancel_expired_suspensions().await {
            Ok(0) => {}
            Ok(n) => info!(count = n, "Canceled tenants past suspension grace period"),
            Err(e) => error!(error = %e, "Suspension enforcement failed"),
        }

        match state.tenant_service.purge_expired_cancellations().await {
            Ok(0) => {}
            Ok(n) => info!(count = n, "Purged tenants past retention window"),
            Err(e) => error!(error = %e, "Retention purge failed"),
        }
    }
}
