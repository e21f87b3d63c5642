//! Leave request repository

use crate::domain::{AccessScope, CreateLeaveRequestInput, LeaveRequest, LeaveStatus, StringUuid};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

const LEAVE_COLUMNS: &str = "id, tenant_id, employee_id, leave_type, start_date, end_date, \
     reason, status, decided_by, decided_at, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaveRepository: Send + Sync {
    async fn create(&self, scope: AccessScope, input: &CreateLeaveRequestInput) -> Result<LeaveRequest>;
    async fn find_by_id(&self, scope: AccessScope, id: StringUuid) -> Result<Option<LeaveRequest>>;
    async fn list(
        &self,
        scope: AccessScope,
        status: Option<LeaveStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<LeaveRequest>>;
    async fn count(&self, scope: AccessScope, status: Option<LeaveStatus>) -> Result<i64>;
    /// Record an approve/reject decision on a pending request
    async fn decide(
        &self,
        scope: AccessScope,
        id: StringUuid,
        status: LeaveStatus,
        decided_by: StringUuid,
    ) -> Result<LeaveRequest>;
    async fn delete_all_for_tenant(&self, tenant_id: StringUuid) -> Result<u64>;
}

pub struct LeaveRepositoryImpl {
    pool: MySqlPool,
}

impl LeaveRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaveRepository for LeaveRepositoryImpl {
    async fn create(&self, scope: AccessScope, input: &CreateLeaveRequestInput) -> Result<LeaveRequest> {
        let tenant_id = scope.require_tenant()?;
        let id = StringUuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO leave_requests
                (id, tenant_id, employee_id, leave_type, start_date, end_date, reason, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(input.employee_id)
        .bind(&input.leave_type)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(&input.reason)
        .execute(&self.pool)
        .await?;

        self.find_by_id(scope, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create leave request")))
    }

    async fn find_by_id(&self, scope: AccessScope, id: StringUuid) -> Result<Option<LeaveRequest>> {
        let tenant_id = scope.require_tenant()?;

        let request = sqlx::query_as::<_, LeaveRequest>(&format!(
            "SELECT {} FROM leave_requests WHERE tenant_id = ? AND id = ?",
            LEAVE_COLUMNS
        ))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn list(
        &self,
        scope: AccessScope,
        status: Option<LeaveStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<LeaveRequest>> {
        let tenant_id = scope.require_tenant()?;

        let mut sql = format!(
            "SELECT {} FROM leave_requests WHERE tenant_id = ?",
            LEAVE_COLUMNS
        );
        if status.is_some() {
            sql.push_str(" AND status = ?");
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let mut q = sqlx::query_as::<_, LeaveRequest>(&sql).bind(tenant_id);
        if let Some(status) = status {
            q = q.bind(status);
        }
        let requests = q.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok(requests)
    }

    async fn count(&self, scope: AccessScope, status: Option<LeaveStatus>) -> Result<i64> {
        let tenant_id = scope.require_tenant()?;

        let mut sql = String::from("SELECT COUNT(*) FROM leave_requests WHERE tenant_id = ?");
        if status.is_some() {
            sql.push_str(" AND status = ?");
        }

        let mut q = sqlx::query_as::<_, (i64,)>(&sql).bind(tenant_id);
        if let Some(status) = status {
            q = q.bind(status);
        }
        let row = q.fetch_one(&self.pool).await?;

        Ok(row.0)
    }

    async fn decide(
        &self,
        scope: AccessScope,
        id: StringUuid,
        status: LeaveStatus,
        decided_by: StringUuid,
    ) -> Result<LeaveRequest> {
        let tenant_id = scope.require_tenant()?;

        // Only pending requests can be decided
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, decided_by = ?, decided_at = NOW(), updated_at = NOW()
            WHERE tenant_id = ? AND id = ? AND status = 'pending'
            "#,
        )
        .bind(status)
        .bind(decided_by)
        .bind(tenant_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Leave request {} not found or already decided",
                id
            )));
        }

        self.find_by_id(scope, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update leave request")))
    }

    async fn delete_all_for_tenant(&self, tenant_id: StringUuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM leave_requests WHERE tenant_id = ?")
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
