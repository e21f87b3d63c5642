//! Operational alert repository

use crate::domain::{Alert, CreateAlertInput, StringUuid};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

const ALERT_COLUMNS: &str =
    "id, tenant_id, severity, kind, message, is_resolved, resolved_by, resolved_at, created_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertRepository: Send + Sync {
    async fn create(&self, input: &CreateAlertInput) -> Result<()>;
    async fn list(
        &self,
        tenant_id: Option<StringUuid>,
        unresolved_only: bool,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Alert>>;
    async fn count(&self, tenant_id: Option<StringUuid>, unresolved_only: bool) -> Result<i64>;
    async fn resolve(&self, id: i64, resolved_by: StringUuid) -> Result<()>;
}

pub struct AlertRepositoryImpl {
    pool: MySqlPool,
}

impl AlertRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertRepository for AlertRepositoryImpl {
    async fn create(&self, input: &CreateAlertInput) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO alerts (tenant_id, severity, kind, message, is_resolved, created_at)
            VALUES (?, ?, ?, ?, FALSE, NOW())
            "#,
        )
        .bind(input.tenant_id)
        .bind(&input.severity)
        .bind(&input.kind)
        .bind(&input.message)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(
        &self,
        tenant_id: Option<StringUuid>,
        unresolved_only: bool,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Alert>> {
        let mut sql = format!("SELECT {} FROM alerts WHERE 1=1", ALERT_COLUMNS);
        if tenant_id.is_some() {
            sql.push_str(" AND tenant_id = ?");
        }
        if unresolved_only {
            sql.push_str(" AND is_resolved = FALSE");
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let mut q = sqlx::query_as::<_, Alert>(&sql);
        if let Some(tid) = tenant_id {
            q = q.bind(tid);
        }
        let alerts = q.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok(alerts)
    }

    async fn count(&self, tenant_id: Option<StringUuid>, unresolved_only: bool) -> Result<i64> {
        let mut sql = String::from("SELECT COUNT(*) FROM alerts WHERE 1=1");
        if tenant_id.is_some() {
            sql.push_str(" AND tenant_id = ?");
        }
        if unresolved_only {
            sql.push_str(" AND is_resolved = FALSE");
        }

        let mut q = sqlx::query_as::<_, (i64,)>(&sql);
        if let Some(tid) = tenant_id {
            q = q.bind(tid);
        }
        let row = q.fetch_one(&self.pool).await?;

        Ok(row.0)
    }

    async fn resolve(&self, id: i64, resolved_by: StringUuid) -> Result<()> {
        let result = sqlx::query(
            "UPDATE alerts SET is_resolved = TRUE, resolved_by = ?, resolved_at = NOW() WHERE id = ? AND is_resolved = FALSE",
        )
        .bind(resolved_by)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Alert {} not found or already resolved", id)));
        }
        Ok(())
    }
}
