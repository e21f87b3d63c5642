//! Subscription and plan repository
//!
//! Subscriptions are keyed by tenant; the one-live-subscription invariant
//! is enforced here by canceling competing live rows inside a transaction.

use crate::domain::{StringUuid, Subscription, SubscriptionPlan, SubscriptionStatus};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

const PLAN_COLUMNS: &str = "id, code, name, price_cents, currency, billing_period, is_default, created_at";

const SUBSCRIPTION_COLUMNS: &str = "id, tenant_id, plan_id, status, current_period_start, \
     current_period_end, trial_ends_at, provider_subscription_id, created_at, updated_at";

/// Fields persisted when opening a subscription
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub tenant_id: StringUuid,
    pub plan_id: StringUuid,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub provider_subscription_id: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn list_plans(&self) -> Result<Vec<SubscriptionPlan>>;
    async fn find_plan_by_code(&self, code: &str) -> Result<Option<SubscriptionPlan>>;
    async fn find_default_plan(&self) -> Result<Option<SubscriptionPlan>>;

    /// Open a subscription, canceling any live subscription the tenant
    /// already has in the same transaction.
    async fn open(&self, sub: &NewSubscription) -> Result<Subscription>;
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Subscription>>;
    async fn find_live_by_tenant(&self, tenant_id: StringUuid) -> Result<Option<Subscription>>;
    async fn find_by_provider_id(&self, provider_id: &str) -> Result<Option<Subscription>>;
    async fn list_by_tenant(&self, tenant_id: StringUuid) -> Result<Vec<Subscription>>;
    async fn set_status(&self, id: StringUuid, status: SubscriptionStatus) -> Result<Subscription>;
    async fn set_period(
        &self,
        id: StringUuid,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<Subscription>;
    async fn set_plan(&self, id: StringUuid, plan_id: StringUuid) -> Result<Subscription>;
    async fn set_provider_id(&self, id: StringUuid, provider_id: &str) -> Result<()>;
    async fn delete_all_for_tenant(&self, tenant_id: StringUuid) -> Result<u64>;
}

pub struct SubscriptionRepositoryImpl {
    pool: MySqlPool,
}

impl SubscriptionRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionRepositoryImpl {
    async fn list_plans(&self) -> Result<Vec<SubscriptionPlan>> {
        let plans = sqlx::query_as::<_, SubscriptionPlan>(&format!(
            "SELECT {} FROM subscription_plans ORDER BY price_cents ASC",
            PLAN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }

    async fn find_plan_by_code(&self, code: &str) -> Result<Option<SubscriptionPlan>> {
        let plan = sqlx::query_as::<_, SubscriptionPlan>(&format!(
            "SELECT {} FROM subscription_plans WHERE code = ?",
            PLAN_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }

    async fn find_default_plan(&self) -> Result<Option<SubscriptionPlan>> {
        let plan = sqlx::query_as::<_, SubscriptionPlan>(&format!(
            "SELECT {} FROM subscription_plans WHERE is_default = TRUE LIMIT 1",
            PLAN_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }

    async fn open(&self, sub: &NewSubscription) -> Result<Subscription> {
        let id = StringUuid::new_v4();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE subscriptions SET status = 'canceled', updated_at = NOW() WHERE tenant_id = ? AND status != 'canceled'",
        )
        .bind(sub.tenant_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO subscriptions
                (id, tenant_id, plan_id, status, current_period_start, current_period_end, trial_ends_at, provider_subscription_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(sub.tenant_id)
        .bind(sub.plan_id)
        .bind(sub.status)
        .bind(sub.current_period_start)
        .bind(sub.current_period_end)
        .bind(sub.trial_ends_at)
        .bind(&sub.provider_subscription_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create subscription")))
    }

    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Subscription>> {
        let sub = sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {} FROM subscriptions WHERE id = ?",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn find_live_by_tenant(&self, tenant_id: StringUuid) -> Result<Option<Subscription>> {
        let sub = sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {} FROM subscriptions WHERE tenant_id = ? AND status != 'canceled' ORDER BY created_at DESC LIMIT 1",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn find_by_provider_id(&self, provider_id: &str) -> Result<Option<Subscription>> {
        let sub = sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {} FROM subscriptions WHERE provider_subscription_id = ?",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn list_by_tenant(&self, tenant_id: StringUuid) -> Result<Vec<Subscription>> {
        let subs = sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {} FROM subscriptions WHERE tenant_id = ? ORDER BY created_at DESC",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(subs)
    }

    async fn set_status(&self, id: StringUuid, status: SubscriptionStatus) -> Result<Subscription> {
        let result = sqlx::query("UPDATE subscriptions SET status = ?, updated_at = NOW() WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Subscription {} not found", id)));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update subscription")))
    }

    async fn set_period(
        &self,
        id: StringUuid,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<Subscription> {
        let result = sqlx::query(
            "UPDATE subscriptions SET current_period_start = ?, current_period_end = ?, updated_at = NOW() WHERE id = ?",
        )
        .bind(period_start)
        .bind(period_end)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Subscription {} not found", id)));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update subscription")))
    }

    async fn set_plan(&self, id: StringUuid, plan_id: StringUuid) -> Result<Subscription> {
        let result = sqlx::query("UPDATE subscriptions SET plan_id = ?, updated_at = NOW() WHERE id = ?")
            .bind(plan_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Subscription {} not found", id)));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update subscription")))
    }

    async fn set_provider_id(&self, id: StringUuid, provider_id: &str) -> Result<()> {
        sqlx::query(
            "UPDATE subscriptions SET provider_subscription_id = ?, updated_at = NOW() WHERE id = ?",
        )
        .bind(provider_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_all_for_tenant(&self, tenant_id: StringUuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE tenant_id = ?")
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
