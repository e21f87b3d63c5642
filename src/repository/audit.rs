//! Audit log repository
//!
//! Append-only; there is no update or delete path.

use crate::domain::StringUuid;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLog {
    pub id: i64,
    /// Tenant the action happened in; NULL for platform actions
    pub tenant_id: Option<StringUuid>,
    pub actor_id: Option<StringUuid>,
    /// Set when the actor was a SuperAdmin impersonating a tenant admin
    pub impersonator_id: Option<StringUuid>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an audit log entry
#[derive(Debug, Clone, Default)]
pub struct CreateAuditLogInput {
    pub tenant_id: Option<StringUuid>,
    pub actor_id: Option<StringUuid>,
    pub impersonator_id: Option<StringUuid>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub ip_address: Option<String>,
}

/// Audit log query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogQuery {
    pub tenant_id: Option<StringUuid>,
    pub actor_id: Option<StringUuid>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub action: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn create(&self, input: &CreateAuditLogInput) -> Result<()>;
    async fn find(&self, query: &AuditLogQuery) -> Result<Vec<AuditLog>>;
    async fn count(&self, query: &AuditLogQuery) -> Result<i64>;
}

pub struct AuditRepositoryImpl {
    pool: MySqlPool,
}

impl AuditRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn push_filters(sql: &mut String, query: &AuditLogQuery) {
        if query.tenant_id.is_some() {
            sql.push_str(" AND tenant_id = ?");
        }
        if query.actor_id.is_some() {
            sql.push_str(" AND actor_id = ?");
        }
        if query.resource_type.is_some() {
            sql.push_str(" AND resource_type = ?");
        }
        if query.resource_id.is_some() {
            sql.push_str(" AND resource_id = ?");
        }
        if query.action.is_some() {
            sql.push_str(" AND action = ?");
        }
        if query.from_date.is_some() {
            sql.push_str(" AND created_at >= ?");
        }
        if query.to_date.is_some() {
            sql.push_str(" AND created_at <= ?");
        }
    }
}

macro_rules! bind_audit_filters {
    ($q:expr, $query:expr) => {{
        let mut q = $q;
        if let Some(tid) = $query.tenant_id {
            q = q.bind(tid);
        }
        if let Some(actor) = $query.actor_id {
            q = q.bind(actor);
        }
        if let Some(ref rt) = $query.resource_type {
            q = q.bind(rt);
        }
        if let Some(ref rid) = $query.resource_id {
            q = q.bind(rid);
        }
        if let Some(ref action) = $query.action {
            q = q.bind(action);
        }
        if let Some(from) = $query.from_date {
            q = q.bind(from);
        }
        if let Some(to) = $query.to_date {
            q = q.bind(to);
        }
        q
    }};
}

#[async_trait]
impl AuditRepository for AuditRepositoryImpl {
    async fn create(&self, input: &CreateAuditLogInput) -> Result<()> {
        let old_value = input
            .old_value
            .as_ref()
            .map(|v| serde_json::to_string(v).unwrap_or_default());
        let new_value = input
            .new_value
            .as_ref()
            .map(|v| serde_json::to_string(v).unwrap_or_default());

        sqlx::query(
            r#"
            INSERT INTO audit_logs
                (tenant_id, actor_id, impersonator_id, action, resource_type, resource_id, old_value, new_value, ip_address, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, NOW())
            "#,
        )
        .bind(input.tenant_id)
        .bind(input.actor_id)
        .bind(input.impersonator_id)
        .bind(&input.action)
        .bind(&input.resource_type)
        .bind(&input.resource_id)
        .bind(old_value)
        .bind(new_value)
        .bind(&input.ip_address)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, query: &AuditLogQuery) -> Result<Vec<AuditLog>> {
        let mut sql = String::from(
            "SELECT id, tenant_id, actor_id, impersonator_id, action, resource_type, resource_id, old_value, new_value, ip_address, created_at FROM audit_logs WHERE 1=1",
        );
        Self::push_filters(&mut sql, query);
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let q = bind_audit_filters!(sqlx::query_as::<_, AuditLog>(&sql), query);
        let logs = q
            .bind(query.limit.unwrap_or(50))
            .bind(query.offset.unwrap_or(0))
            .fetch_all(&self.pool)
            .await?;

        Ok(logs)
    }

    async fn count(&self, query: &AuditLogQuery) -> Result<i64> {
        let mut sql = String::from("SELECT COUNT(*) FROM audit_logs WHERE 1=1");
        Self::push_filters(&mut sql, query);

        let q = bind_audit_filters!(sqlx::query_as::<_, (i64,)>(&sql), query);
        let row = q.fetch_one(&self.pool).await?;

        Ok(row.0)
    }
}
