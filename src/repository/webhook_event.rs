//! Billing webhook event store
//!
//! Events are persisted before processing and deduplicated on the
//! provider's event id (unique index).

use crate::domain::{StringUuid, WebhookEvent, WebhookEventStatus};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

const EVENT_COLUMNS: &str = "id, provider_event_id, event_type, payload, tenant_id, status, \
     error, received_at, processed_at";

/// Outcome of attempting to persist an incoming event
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Inserted(WebhookEvent),
    /// An event with the same provider_event_id already exists
    Duplicate(WebhookEvent),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    async fn insert(
        &self,
        provider_event_id: &str,
        event_type: &str,
        payload: &serde_json::Value,
        tenant_id: Option<StringUuid>,
    ) -> Result<InsertOutcome>;
    async fn find_by_id(&self, id: i64) -> Result<Option<WebhookEvent>>;
    async fn find_by_provider_event_id(&self, provider_event_id: &str) -> Result<Option<WebhookEvent>>;
    async fn list(
        &self,
        status: Option<WebhookEventStatus>,
        tenant_id: Option<StringUuid>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<WebhookEvent>>;
    async fn count(
        &self,
        status: Option<WebhookEventStatus>,
        tenant_id: Option<StringUuid>,
    ) -> Result<i64>;
    async fn mark(
        &self,
        id: i64,
        status: WebhookEventStatus,
        error: Option<String>,
    ) -> Result<()>;
}

pub struct WebhookEventRepositoryImpl {
    pool: MySqlPool,
}

impl WebhookEventRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WebhookEventRepository for WebhookEventRepositoryImpl {
    async fn insert(
        &self,
        provider_event_id: &str,
        event_type: &str,
        payload: &serde_json::Value,
        tenant_id: Option<StringUuid>,
    ) -> Result<InsertOutcome> {
        if let Some(existing) = self.find_by_provider_event_id(provider_event_id).await? {
            return Ok(InsertOutcome::Duplicate(existing));
        }

        let payload_str = serde_json::to_string(payload)
            .map_err(|e| AppError::Internal(e.into()))?;

        let insert = sqlx::query(
            r#"
            INSERT IGNORE INTO webhook_events (provider_event_id, event_type, payload, tenant_id, status, received_at)
            VALUES (?, ?, ?, ?, 'pending', NOW())
            "#,
        )
        .bind(provider_event_id)
        .bind(event_type)
        .bind(payload_str)
        .bind(tenant_id)
        .execute(&self.pool)
        .await?;

        let stored = self
            .find_by_provider_event_id(provider_event_id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to store webhook event")))?;

        // INSERT IGNORE lost the race to a concurrent delivery
        if insert.rows_affected() == 0 {
            return Ok(InsertOutcome::Duplicate(stored));
        }
        Ok(InsertOutcome::Inserted(stored))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<WebhookEvent>> {
        let event = sqlx::query_as::<_, WebhookEvent>(&format!(
            "SELECT {} FROM webhook_events WHERE id = ?",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn find_by_provider_event_id(&self, provider_event_id: &str) -> Result<Option<WebhookEvent>> {
        let event = sqlx::query_as::<_, WebhookEvent>(&format!(
            "SELECT {} FROM webhook_events WHERE provider_event_id = ?",
            EVENT_COLUMNS
        ))
        .bind(provider_event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn list(
        &self,
        status: Option<WebhookEventStatus>,
        tenant_id: Option<StringUuid>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<WebhookEvent>> {
        let mut sql = format!("SELECT {} FROM webhook_events WHERE 1=1", EVENT_COLUMNS);
        if status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if tenant_id.is_some() {
            sql.push_str(" AND tenant_id = ?");
        }
        sql.push_str(" ORDER BY received_at DESC LIMIT ? OFFSET ?");

        let mut q = sqlx::query_as::<_, WebhookEvent>(&sql);
        if let Some(status) = status {
            q = q.bind(status.to_string());
        }
        if let Some(tid) = tenant_id {
            q = q.bind(tid);
        }
        let events = q.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok(events)
    }

    async fn count(
        &self,
        status: Option<WebhookEventStatus>,
        tenant_id: Option<StringUuid>,
    ) -> Result<i64> {
        let mut sql = String::from("SELECT COUNT(*) FROM webhook_events WHERE 1=1");
        if status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if tenant_id.is_some() {
            sql.push_str(" AND tenant_id = ?");
        }

        let mut q = sqlx::query_as::<_, (i64,)>(&sql);
        if let Some(status) = status {
            q = q.bind(status.to_string());
        }
        if let Some(tid) = tenant_id {
            q = q.bind(tid);
        }
        let row = q.fetch_one(&self.pool).await?;

        Ok(row.0)
    }

    async fn mark(
        &self,
        id: i64,
        status: WebhookEventStatus,
        error: Option<String>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE webhook_events SET status = ?, error = ?, processed_at = NOW() WHERE id = ?",
        )
        .bind(status.to_string())
        .bind(error)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
