//! Billing webhook ingestion against a real database: dedup on the
//! provider event id, payment-driven tenant transitions, and alerts.

use chrono::{Duration, Utc};
use peopleops_core::domain::{
    BillingEventPayload, SignupInput, SubscriptionStatus, Tenant, TenantStatus,
};
use peopleops_core::repository::{
    AlertRepository, AlertRepositoryImpl, NewSubscription, SubscriptionRepository,
    SubscriptionRepositoryImpl, TenantRepository, TenantRepositoryImpl, WebhookEventRepositoryImpl,
};
use peopleops_core::service::{BillingService, IngestOutcome};
use sqlx::MySqlPool;
use std::sync::Arc;

mod common;

type TestBillingService = BillingService<
    WebhookEventRepositoryImpl,
    SubscriptionRepositoryImpl,
    TenantRepositoryImpl,
    AlertRepositoryImpl,
>;

fn billing_service(pool: &MySqlPool) -> TestBillingService {
    BillingService::new(
        Arc::new(WebhookEventRepositoryImpl::new(pool.clone())),
        Arc::new(SubscriptionRepositoryImpl::new(pool.clone())),
        Arc::new(TenantRepositoryImpl::new(pool.clone())),
        Arc::new(AlertRepositoryImpl::new(pool.clone())),
        None,
        None,
    )
}

/// Create a tenant with an open trial subscription, mirroring signup.
async fn create_subscribed_tenant(pool: &MySqlPool, prefix: &str) -> Tenant {
    let domain = format!("{}-{}.example.com", prefix, uuid::Uuid::new_v4().simple());
    let tenants = TenantRepositoryImpl::new(pool.clone());
    let tenant = tenants
        .create(&SignupInput {
            company_name: format!("{} Inc", prefix),
            domain: domain.clone(),
            admin_email: format!("admin@{}", domain),
            admin_name: "Admin".to_string(),
            admin_password: "irrelevant".to_string(),
            plan_code: None,
        })
        .await
        .unwrap();
    let tenant = tenants
        .set_status(tenant.id, TenantStatus::Active)
        .await
        .unwrap();

    let subs = SubscriptionRepositoryImpl::new(pool.clone());
    let plan = subs.find_default_plan().await.unwrap().unwrap();
    let now = Utc::now();
    subs.open(&NewSubscription {
        tenant_id: tenant.id,
        plan_id: plan.id,
        status: SubscriptionStatus::Trialing,
        current_period_start: now,
        current_period_end: now + Duration::days(14),
        trial_ends_at: Some(now + Duration::days(14)),
        provider_subscription_id: None,
    })
    .await
    .unwrap();
    tenant
}

fn payload(event_id: &str, event_type: &str, tenant: &Tenant) -> (BillingEventPayload, serde_json::Value) {
    let raw = serde_json::json!({
        "id": event_id,
        "type": event_type,
        "tenant_id": tenant.id,
        "data": {},
    });
    let parsed: BillingEventPayload = serde_json::from_value(raw.clone()).unwrap();
    (parsed, raw)
}

fn unique_event_id(prefix: &str) -> String {
    format!("evt_{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

#[tokio::test]
async fn test_duplicate_event_id_is_not_reprocessed() {
    let pool = match common::get_test_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping test: could not connect to database: {}", e);
            return;
        }
    };
    common::setup_database(&pool).await.unwrap();

    let tenant = create_subscribed_tenant(&pool, "dup").await;
    let service = billing_service(&pool);
    let event_id = unique_event_id("dup");

    let (p, raw) = payload(&event_id, "payment_succeeded", &tenant);

    let first = service.ingest(p.clone(), raw.clone()).await.unwrap();
    assert_eq!(first, IngestOutcome::Processed);

    // Same delivery again is acknowledged without side effects
    let second = service.ingest(p, raw).await.unwrap();
    assert_eq!(second, IngestOutcome::Duplicate);
}

#[tokio::test]
async fn test_payment_succeeded_resumes_suspended_tenant() {
    let pool = match common::get_test_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping test: could not connect to database: {}", e);
            return;
        }
    };
    common::setup_database(&pool).await.unwrap();

    let tenant = create_subscribed_tenant(&pool, "resume").await;
    let tenants = TenantRepositoryImpl::new(pool.clone());
    tenants
        .set_status(tenant.id, TenantStatus::Suspended)
        .await
        .unwrap();

    let service = billing_service(&pool);
    let (p, raw) = payload(&unique_event_id("resume"), "payment_succeeded", &tenant);
    let outcome = service.ingest(p, raw).await.unwrap();
    assert_eq!(outcome, IngestOutcome::Processed);

    let refreshed = tenants.find_by_id(tenant.id).await.unwrap().unwrap();
    assert_eq!(refreshed.status, TenantStatus::Active);

    let subs = SubscriptionRepositoryImpl::new(pool.clone());
    let sub = subs.find_live_by_tenant(tenant.id).await.unwrap().unwrap();
    assert_eq!(sub.status, SubscriptionStatus::Active);
}

#[tokio::test]
async fn test_payment_failed_suspends_and_alerts() {
    let pool = match common::get_test_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping test: could not connect to database: {}", e);
            return;
        }
    };
    common::setup_database(&pool).await.unwrap();

    let tenant = create_subscribed_tenant(&pool, "fail").await;
    let service = billing_service(&pool);

    let (p, raw) = payload(&unique_event_id("fail"), "payment_failed", &tenant);
    let outcome = service.ingest(p, raw).await.unwrap();
    assert_eq!(outcome, IngestOutcome::Processed);

    let tenants = TenantRepositoryImpl::new(pool.clone());
    let refreshed = tenants.find_by_id(tenant.id).await.unwrap().unwrap();
    assert_eq!(refreshed.status, TenantStatus::Suspended);

    let subs = SubscriptionRepositoryImpl::new(pool.clone());
    let sub = subs.find_live_by_tenant(tenant.id).await.unwrap().unwrap();
    assert_eq!(sub.status, SubscriptionStatus::PastDue);

    let alerts = AlertRepositoryImpl::new(pool.clone());
    let raised = alerts.list(Some(tenant.id), true, 0, 10).await.unwrap();
    assert!(raised.iter().any(|a| a.kind == "payment_failed"));
}

#[tokio::test]
async fn test_unknown_event_type_is_stored_but_ignored() {
    let pool = match common::get_test_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping test: could not connect to database: {}", e);
            return;
        }
    };
    common::setup_database(&pool).await.unwrap();

    let tenant = create_subscribed_tenant(&pool, "ign").await;
    let service = billing_service(&pool);

    let (p, raw) = payload(&unique_event_id("ign"), "invoice.finalized", &tenant);
    let outcome = service.ingest(p, raw).await.unwrap();
    assert_eq!(outcome, IngestOutcome::Ignored);

    // Tenant state untouched
    let tenants = TenantRepositoryImpl::new(pool.clone());
    let refreshed = tenants.find_by_id(tenant.id).await.unwrap().unwrap();
    assert_eq!(refreshed.status, TenantStatus::Active);
}

#[tokio::test]
async fn test_reconcile_aligns_tenant_with_past_due_subscription() {
    let pool = match common::get_test_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping test: could not connect to database: {}", e);
            return;
        }
    };
    common::setup_database(&pool).await.unwrap();

    let tenant = create_subscribed_tenant(&pool, "recon").await;
    let subs = SubscriptionRepositoryImpl::new(pool.clone());
    let sub = subs.find_live_by_tenant(tenant.id).await.unwrap().unwrap();
    subs.set_status(sub.id, SubscriptionStatus::PastDue)
        .await
        .unwrap();

    let service = billing_service(&pool);
    let report = service.reconcile(tenant.id).await.unwrap();
    assert!(report.changed);
    assert_eq!(report.tenant_status_after, TenantStatus::Suspended);

    // A second pass finds nothing to fix
    let report = service.reconcile(tenant.id).await.unwrap();
    assert!(!report.changed);
}
