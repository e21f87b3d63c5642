//! Billing webhook processing and subscription reconciliation
//!
//! Every provider event is persisted before processing and deduplicated
//! on the provider's event id, so redeliveries are harmless. Processing
//! drives both the subscription record and the tenant lifecycle.

use crate::cache::CacheManager;
use crate::domain::{
    BillingEventPayload, CreateAlertInput, StringUuid, Subscription, SubscriptionOverrideInput,
    SubscriptionPlan, SubscriptionStatus, Tenant, TenantStatus, WebhookEvent, WebhookEventStatus,
};
use crate::error::{AppError, Result};
use crate::repository::{
    AlertRepository, InsertOutcome, SubscriptionRepository, TenantRepository,
    WebhookEventRepository,
};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use validator::Validate;

type HmacSha256 = Hmac<Sha256>;

/// Events the processor acts on; anything else is stored and ignored
const EVENT_PAYMENT_SUCCEEDED: &str = "payment_succeeded";
const EVENT_PAYMENT_FAILED: &str = "payment_failed";
const EVENT_SUBSCRIPTION_CANCELED: &str = "subscription_canceled";

/// Outcome reported back to the webhook endpoint
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestOutcome {
    Processed,
    Duplicate,
    Ignored,
}

/// Reconciliation report for one tenant
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReconciliationReport {
    pub tenant_id: StringUuid,
    pub tenant_status_before: TenantStatus,
    pub tenant_status_after: TenantStatus,
    pub subscription_status: Option<SubscriptionStatus>,
    pub changed: bool,
}

pub struct BillingService<W, S, T, A>
where
    W: WebhookEventRepository,
    S: SubscriptionRepository,
    T: TenantRepository,
    A: AlertRepository,
{
    events: Arc<W>,
    subscriptions: Arc<S>,
    tenants: Arc<T>,
    alerts: Arc<A>,
    cache_manager: Option<CacheManager>,
    webhook_secret: Option<String>,
}

impl<W, S, T, A> BillingService<W, S, T, A>
where
    W: WebhookEventRepository,
    S: SubscriptionRepository,
    T: TenantRepository,
    A: AlertRepository,
{
    pub fn new(
        events: Arc<W>,
        subscriptions: Arc<S>,
        tenants: Arc<T>,
        alerts: Arc<A>,
        cache_manager: Option<CacheManager>,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            events,
            subscriptions,
            tenants,
            alerts,
            cache_manager,
            webhook_secret,
        }
    }

    // ==================== Webhook ingestion ====================

    /// Verify the provider signature over the raw body. When a secret is
    /// configured the signature is mandatory.
    pub fn verify_signature(&self, body: &[u8], signature: Option<&str>) -> Result<()> {
        let Some(secret) = self.webhook_secret.as_deref() else {
            return Ok(());
        };
        let signature = signature
            .ok_or_else(|| AppError::Unauthorized("Missing webhook signature".to_string()))?;

        if !check_hmac(secret, body, signature) {
            return Err(AppError::Unauthorized(
                "Invalid webhook signature".to_string(),
            ));
        }
        Ok(())
    }

    /// Persist and process one provider event.
    pub async fn ingest(&self, payload: BillingEventPayload, raw: serde_json::Value) -> Result<IngestOutcome> {
        let stored = match self
            .events
            .insert(&payload.id, &payload.event_type, &raw, payload.tenant_id)
            .await?
        {
            InsertOutcome::Duplicate(_) => {
                tracing::debug!(event_id = %payload.id, "Duplicate webhook delivery");
                return Ok(IngestOutcome::Duplicate);
            }
            InsertOutcome::Inserted(event) => event,
        };

        match self.apply(&payload).await {
            Ok(outcome) => {
                let status = match outcome {
                    IngestOutcome::Ignored => WebhookEventStatus::Ignored,
                    _ => WebhookEventStatus::Processed,
                };
                self.events.mark(stored.id, status, None).await?;
                Ok(outcome)
            }
            Err(e) => {
                self.events
                    .mark(stored.id, WebhookEventStatus::Failed, Some(e.to_string()))
                    .await?;
                self.raise_alert(
                    payload.tenant_id,
                    "error",
                    "webhook_processing_failed",
                    &format!("Event {} ({}) failed: {}", payload.id, payload.event_type, e),
                )
                .await;
                Err(e)
            }
        }
    }

    async fn apply(&self, payload: &BillingEventPayload) -> Result<IngestOutcome> {
        match payload.event_type.as_str() {
            EVENT_PAYMENT_SUCCEEDED => self.on_payment_succeeded(payload).await,
            EVENT_PAYMENT_FAILED => self.on_payment_failed(payload).await,
            EVENT_SUBSCRIPTION_CANCELED => self.on_subscription_canceled(payload).await,
            _ => Ok(IngestOutcome::Ignored),
        }
    }

    async fn on_payment_succeeded(&self, payload: &BillingEventPayload) -> Result<IngestOutcome> {
        let (tenant, sub) = self.resolve_subject(payload).await?;

        self.subscriptions
            .set_status(sub.id, SubscriptionStatus::Active)
            .await?;

        // Advance the period; provider-sent bounds win over the default
        let (start, end) = period_from_data(&payload.data)
            .unwrap_or_else(|| (Utc::now(), Utc::now() + Duration::days(30)));
        self.subscriptions.set_period(sub.id, start, end).await?;

        if let Some(provider_id) = payload.subscription_id.as_deref() {
            if sub.provider_subscription_id.as_deref() != Some(provider_id) {
                self.subscriptions.set_provider_id(sub.id, provider_id).await?;
            }
        }

        // A paying tenant that was suspended for non-payment comes back
        if tenant.status == TenantStatus::Suspended {
            let updated = self.tenants.set_status(tenant.id, TenantStatus::Active).await?;
            self.invalidate(&updated).await;
            tracing::info!(tenant_id = %tenant.id, "Tenant resumed after successful payment");
        }

        Ok(IngestOutcome::Processed)
    }

    async fn on_payment_failed(&self, payload: &BillingEventPayload) -> Result<IngestOutcome> {
        let (tenant, sub) = self.resolve_subject(payload).await?;

        self.subscriptions
            .set_status(sub.id, SubscriptionStatus::PastDue)
            .await?;

        if tenant.status == TenantStatus::Active {
            let updated = self.tenants.set_status(tenant.id, TenantStatus::Suspended).await?;
            self.invalidate(&updated).await;
            tracing::warn!(tenant_id = %tenant.id, "Tenant suspended after failed payment");
        }

        self.raise_alert(
            Some(tenant.id),
            "warning",
            "payment_failed",
            &format!("Payment failed for tenant {}", tenant.name),
        )
        .await;

        Ok(IngestOutcome::Processed)
    }

    async fn on_subscription_canceled(&self, payload: &BillingEventPayload) -> Result<IngestOutcome> {
        let (tenant, sub) = self.resolve_subject(payload).await?;

        self.subscriptions
            .set_status(sub.id, SubscriptionStatus::Canceled)
            .await?;

        if tenant.status.can_transition_to(TenantStatus::Canceled) {
            let updated = self.tenants.set_status(tenant.id, TenantStatus::Canceled).await?;
            self.invalidate(&updated).await;
            tracing::info!(tenant_id = %tenant.id, "Tenant canceled by provider event");
        }

        Ok(IngestOutcome::Processed)
    }

    /// Find the tenant and subscription an event refers to, preferring
    /// the provider subscription id over the tenant id.
    async fn resolve_subject(&self, payload: &BillingEventPayload) -> Result<(Tenant, Subscription)> {
        let sub = match payload.subscription_id.as_deref() {
            Some(provider_id) => self.subscriptions.find_by_provider_id(provider_id).await?,
            None => None,
        };

        let sub = match (sub, payload.tenant_id) {
            (Some(sub), _) => sub,
            (None, Some(tenant_id)) => self
                .subscriptions
                .find_live_by_tenant(tenant_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("No live subscription for tenant {}", tenant_id))
                })?,
            (None, None) => {
                return Err(AppError::BadRequest(
                    "Event names neither a subscription nor a tenant".to_string(),
                ))
            }
        };

        let tenant = self
            .tenants
            .find_by_id(sub.tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tenant {} not found", sub.tenant_id)))?;

        Ok((tenant, sub))
    }

    // ==================== Reconciliation ====================

    /// Align a tenant's lifecycle state with its subscription. Used by
    /// SuperAdmins when webhooks were missed or applied out of order.
    pub async fn reconcile(&self, tenant_id: StringUuid) -> Result<ReconciliationReport> {
        let tenant = self
            .tenants
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tenant {} not found", tenant_id)))?;

        let sub = self.subscriptions.find_live_by_tenant(tenant_id).await?;
        let sub_status = sub.as_ref().map(|s| s.status);

        // Provisioning tenants belong to the provisioner (it seeds data
        // before activating) and Deleted ones are tombstones; neither is
        // reconciliation's to move.
        if matches!(tenant.status, TenantStatus::Provisioning | TenantStatus::Deleted) {
            return Ok(ReconciliationReport {
                tenant_id,
                tenant_status_before: tenant.status,
                tenant_status_after: tenant.status,
                subscription_status: sub_status,
                changed: false,
            });
        }

        let desired = match sub_status {
            Some(SubscriptionStatus::Trialing) | Some(SubscriptionStatus::Active) => {
                TenantStatus::Active
            }
            Some(SubscriptionStatus::PastDue) => TenantStatus::Suspended,
            Some(SubscriptionStatus::Canceled) | None => TenantStatus::Canceled,
        };

        let mut after = tenant.status;
        let mut changed = false;
        if tenant.status != desired && tenant.status.can_transition_to(desired) {
            let updated = self.tenants.set_status(tenant_id, desired).await?;
            self.invalidate(&updated).await;
            after = updated.status;
            changed = true;
            tracing::info!(tenant_id = %tenant_id, from = %tenant.status, to = %desired, "Reconciled tenant status");
        }

        Ok(ReconciliationReport {
            tenant_id,
            tenant_status_before: tenant.status,
            tenant_status_after: after,
            subscription_status: sub_status,
            changed,
        })
    }

    /// SuperAdmin manual override of a tenant's subscription record.
    pub async fn override_subscription(
        &self,
        tenant_id: StringUuid,
        input: SubscriptionOverrideInput,
    ) -> Result<Subscription> {
        input.validate()?;

        let sub = self
            .subscriptions
            .find_live_by_tenant(tenant_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No live subscription for tenant {}", tenant_id))
            })?;

        let mut updated = sub.clone();

        if let Some(code) = input.plan_code.as_deref() {
            let plan = self
                .subscriptions
                .find_plan_by_code(code)
                .await?
                .ok_or_else(|| AppError::BadRequest(format!("Unknown plan: {}", code)))?;
            updated = self.subscriptions.set_plan(sub.id, plan.id).await?;
        }
        if let Some(status) = input.status {
            updated = self.subscriptions.set_status(sub.id, status).await?;
        }
        if let Some(period_end) = input.current_period_end {
            updated = self
                .subscriptions
                .set_period(sub.id, updated.current_period_start, period_end)
                .await?;
        }

        Ok(updated)
    }

    // ==================== Queries ====================

    pub async fn list_plans(&self) -> Result<Vec<SubscriptionPlan>> {
        self.subscriptions.list_plans().await
    }

    pub async fn tenant_subscription(&self, tenant_id: StringUuid) -> Result<Option<Subscription>> {
        self.subscriptions.find_live_by_tenant(tenant_id).await
    }

    pub async fn list_events(
        &self,
        status: Option<WebhookEventStatus>,
        tenant_id: Option<StringUuid>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<WebhookEvent>, i64)> {
        let events = self.events.list(status, tenant_id, offset, limit).await?;
        let total = self.events.count(status, tenant_id).await?;
        Ok((events, total))
    }

    pub async fn list_alerts(
        &self,
        tenant_id: Option<StringUuid>,
        unresolved_only: bool,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<crate::domain::Alert>, i64)> {
        let alerts = self
            .alerts
            .list(tenant_id, unresolved_only, offset, limit)
            .await?;
        let total = self.alerts.count(tenant_id, unresolved_only).await?;
        Ok((alerts, total))
    }

    pub async fn resolve_alert(&self, id: i64, resolved_by: StringUuid) -> Result<()> {
        self.alerts.resolve(id, resolved_by).await
    }

    async fn raise_alert(&self, tenant_id: Option<StringUuid>, severity: &str, kind: &str, message: &str) {
        let result = self
            .alerts
            .create(&CreateAlertInput {
                tenant_id,
                severity: severity.to_string(),
                kind: kind.to_string(),
                message: message.to_string(),
            })
            .await;
        if let Err(e) = result {
            tracing::error!(error = %e, "Failed to raise alert");
        }
    }

    async fn invalidate(&self, tenant: &Tenant) {
        if let Some(cache) = &self.cache_manager {
            let _ = cache.invalidate_tenant(tenant).await;
        }
    }
}

/// Verify an HMAC-SHA256 hex signature (optionally "sha256=" prefixed)
fn check_hmac(secret: &str, body: &[u8], signature: &str) -> bool {
    let expected_hex = signature.strip_prefix("sha256=").unwrap_or(signature);

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(body);
    let computed_hex = hex::encode(mac.finalize().into_bytes());

    constant_time_eq(computed_hex.as_bytes(), expected_hex.as_bytes())
}

/// Constant-time byte comparison
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Provider-supplied period bounds, when the event carries them
fn period_from_data(data: &serde_json::Value) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = data.get("period_start")?.as_str()?.parse().ok()?;
    let end = data.get("period_end")?.as_str()?.parse().ok()?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::alert::MockAlertRepository;
    use crate::repository::subscription::MockSubscriptionRepository;
    use crate::repository::tenant::MockTenantRepository;
    use crate::repository::webhook_event::MockWebhookEventRepository;

    type MockBilling = BillingService<
        MockWebhookEventRepository,
        MockSubscriptionRepository,
        MockTenantRepository,
        MockAlertRepository,
    >;

    fn service(
        events: MockWebhookEventRepository,
        subscriptions: MockSubscriptionRepository,
        tenants: MockTenantRepository,
        alerts: MockAlertRepository,
        secret: Option<&str>,
    ) -> MockBilling {
        BillingService::new(
            Arc::new(events),
            Arc::new(subscriptions),
            Arc::new(tenants),
            Arc::new(alerts),
            None,
            secret.map(|s| s.to_string()),
        )
    }

    fn subscription(tenant_id: StringUuid, status: SubscriptionStatus) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: StringUuid::new_v4(),
            tenant_id,
            plan_id: StringUuid::new_v4(),
            status,
            current_period_start: now,
            current_period_end: now + Duration::days(30),
            trial_ends_at: None,
            provider_subscription_id: Some("sub_42".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    fn payload(event_type: &str, tenant_id: Option<StringUuid>) -> BillingEventPayload {
        BillingEventPayload {
            id: "evt_1".to_string(),
            event_type: event_type.to_string(),
            tenant_id,
            subscription_id: Some("sub_42".to_string()),
            data: serde_json::json!({}),
        }
    }

    fn stored_event(id: i64) -> WebhookEvent {
        WebhookEvent {
            id,
            provider_event_id: "evt_1".to_string(),
            event_type: "payment_failed".to_string(),
            payload: serde_json::json!({}),
            tenant_id: None,
            status: WebhookEventStatus::Pending,
            error: None,
            received_at: Utc::now(),
            processed_at: None,
        }
    }

    #[test]
    fn test_signature_verification() {
        let svc = service(
            MockWebhookEventRepository::new(),
            MockSubscriptionRepository::new(),
            MockTenantRepository::new(),
            MockAlertRepository::new(),
            Some("whsec_test"),
        );

        let body = br#"{"id":"evt_1"}"#;
        // hmac-sha256("whsec_test", body)
        let mut mac = HmacSha256::new_from_slice(b"whsec_test").unwrap();
        mac.update(body);
        let good = hex::encode(mac.finalize().into_bytes());

        assert!(svc.verify_signature(body, Some(&good)).is_ok());
        assert!(svc
            .verify_signature(body, Some(&format!("sha256={}", good)))
            .is_ok());
        assert!(svc.verify_signature(body, Some("deadbeef")).is_err());
        assert!(svc.verify_signature(body, None).is_err());
    }

    #[test]
    fn test_signature_optional_without_secret() {
        let svc = service(
            MockWebhookEventRepository::new(),
            MockSubscriptionRepository::new(),
            MockTenantRepository::new(),
            MockAlertRepository::new(),
            None,
        );
        assert!(svc.verify_signature(b"anything", None).is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_event_short_circuits() {
        let mut events = MockWebhookEventRepository::new();
        events
            .expect_insert()
            .returning(|_, _, _, _| Ok(InsertOutcome::Duplicate(stored_event(1))));
        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions.expect_find_by_provider_id().never();

        let svc = service(
            events,
            subscriptions,
            MockTenantRepository::new(),
            MockAlertRepository::new(),
            None,
        );
        let outcome = svc
            .ingest(payload("payment_succeeded", None), serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::Duplicate);
    }

    #[tokio::test]
    async fn test_unknown_event_type_ignored() {
        let mut events = MockWebhookEventRepository::new();
        events
            .expect_insert()
            .returning(|_, _, _, _| Ok(InsertOutcome::Inserted(stored_event(1))));
        events
            .expect_mark()
            .withf(|_, status, _| *status == WebhookEventStatus::Ignored)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let svc = service(
            events,
            MockSubscriptionRepository::new(),
            MockTenantRepository::new(),
            MockAlertRepository::new(),
            None,
        );
        let outcome = svc
            .ingest(payload("invoice.created", None), serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_payment_failed_suspends_tenant() {
        let tenant = Tenant {
            status: TenantStatus::Active,
            ..Tenant::default()
        };
        let tenant_id = tenant.id;
        let sub = subscription(tenant_id, SubscriptionStatus::Active);
        let sub_id = sub.id;

        let mut events = MockWebhookEventRepository::new();
        events
            .expect_insert()
            .returning(|_, _, _, _| Ok(InsertOutcome::Inserted(stored_event(1))));
        events
            .expect_mark()
            .withf(|_, status, _| *status == WebhookEventStatus::Processed)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut subscriptions = MockSubscriptionRepository::new();
        let sub_clone = sub.clone();
        subscriptions
            .expect_find_by_provider_id()
            .returning(move |_| Ok(Some(sub_clone.clone())));
        let past_due = Subscription {
            status: SubscriptionStatus::PastDue,
            ..sub.clone()
        };
        subscriptions
            .expect_set_status()
            .withf(move |id, status| *id == sub_id && *status == SubscriptionStatus::PastDue)
            .returning(move |_, _| Ok(past_due.clone()));

        let mut tenants = MockTenantRepository::new();
        let tenant_clone = tenant.clone();
        tenants
            .expect_find_by_id()
            .returning(move |_| Ok(Some(tenant_clone.clone())));
        let suspended = Tenant {
            status: TenantStatus::Suspended,
            ..tenant.clone()
        };
        tenants
            .expect_set_status()
            .withf(move |id, status| *id == tenant_id && *status == TenantStatus::Suspended)
            .times(1)
            .returning(move |_, _| Ok(suspended.clone()));

        let mut alerts = MockAlertRepository::new();
        alerts.expect_create().times(1).returning(|_| Ok(()));

        let svc = service(events, subscriptions, tenants, alerts, None);
        let outcome = svc
            .ingest(payload("payment_failed", Some(tenant_id)), serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::Processed);
    }

    #[tokio::test]
    async fn test_reconcile_past_due_suspends() {
        let tenant = Tenant {
            status: TenantStatus::Active,
            ..Tenant::default()
        };
        let tenant_id = tenant.id;
        let sub = subscription(tenant_id, SubscriptionStatus::PastDue);

        let mut tenants = MockTenantRepository::new();
        let tenant_clone = tenant.clone();
        tenants
            .expect_find_by_id()
            .returning(move |_| Ok(Some(tenant_clone.clone())));
        let suspended = Tenant {
            status: TenantStatus::Suspended,
            ..tenant.clone()
        };
        tenants
            .expect_set_status()
            .returning(move |_, _| Ok(suspended.clone()));

        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions
            .expect_find_live_by_tenant()
            .returning(move |_| Ok(Some(sub.clone())));

        let svc = service(
            MockWebhookEventRepository::new(),
            subscriptions,
            tenants,
            MockAlertRepository::new(),
            None,
        );
        let report = svc.reconcile(tenant_id).await.unwrap();
        assert!(report.changed);
        assert_eq!(report.tenant_status_after, TenantStatus::Suspended);
    }

    #[tokio::test]
    async fn test_reconcile_leaves_provisioning_tenant_alone() {
        let tenant = Tenant {
            status: TenantStatus::Provisioning,
            ..Tenant::default()
        };
        let tenant_id = tenant.id;
        let sub = subscription(tenant_id, SubscriptionStatus::Trialing);

        let mut tenants = MockTenantRepository::new();
        let tenant_clone = tenant.clone();
        tenants
            .expect_find_by_id()
            .returning(move |_| Ok(Some(tenant_clone.clone())));
        tenants.expect_set_status().never();

        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions
            .expect_find_live_by_tenant()
            .returning(move |_| Ok(Some(sub.clone())));

        let svc = service(
            MockWebhookEventRepository::new(),
            subscriptions,
            tenants,
            MockAlertRepository::new(),
            None,
        );
        let report = svc.reconcile(tenant_id).await.unwrap();
        assert!(!report.changed);
        assert_eq!(report.tenant_status_after, TenantStatus::Provisioning);
    }

    #[tokio::test]
    async fn test_reconcile_noop_when_aligned() {
        let tenant = Tenant {
            status: TenantStatus::Active,
            ..Tenant::default()
        };
        let tenant_id = tenant.id;
        let sub = subscription(tenant_id, SubscriptionStatus::Active);

        let mut tenants = MockTenantRepository::new();
        let tenant_clone = tenant.clone();
        tenants
            .expect_find_by_id()
            .returning(move |_| Ok(Some(tenant_clone.clone())));
        tenants.expect_set_status().never();

        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions
            .expect_find_live_by_tenant()
            .returning(move |_| Ok(Some(sub.clone())));

        let svc = service(
            MockWebhookEventRepository::new(),
            subscriptions,
            tenants,
            MockAlertRepository::new(),
            None,
        );
        let report = svc.reconcile(tenant_id).await.unwrap();
        assert!(!report.changed);
    }

    #[test]
    fn test_period_from_data() {
        let data = serde_json::json!({
            "period_start": "2026-08-01T00:00:00Z",
            "period_end": "2026-09-01T00:00:00Z"
        });
        let (start, end) = period_from_data(&data).unwrap();
        assert!(end > start);

        assert!(period_from_data(&serde_json::json!({})).is_none());
    }
}
