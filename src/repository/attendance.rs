//! Attendance repository

use crate::domain::{AccessScope, AttendanceQuery, AttendanceRecord, StringUuid};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::MySqlPool;

const ATTENDANCE_COLUMNS: &str = "id, tenant_id, employee_id, work_date, check_in, check_out, \
     note, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Record a check-in for the given work day. One row per employee per day.
    async fn create_check_in(
        &self,
        scope: AccessScope,
        employee_id: StringUuid,
        work_date: NaiveDate,
        at: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<AttendanceRecord>;
    async fn set_check_out(
        &self,
        scope: AccessScope,
        record_id: StringUuid,
        at: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<AttendanceRecord>;
    async fn find_by_id(&self, scope: AccessScope, id: StringUuid) -> Result<Option<AttendanceRecord>>;
    async fn find_for_day(
        &self,
        scope: AccessScope,
        employee_id: StringUuid,
        work_date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>>;
    async fn list(
        &self,
        scope: AccessScope,
        query: &AttendanceQuery,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AttendanceRecord>>;
    async fn count(&self, scope: AccessScope, query: &AttendanceQuery) -> Result<i64>;
    async fn delete_all_for_tenant(&self, tenant_id: StringUuid) -> Result<u64>;
}

pub struct AttendanceRepositoryImpl {
    pool: MySqlPool,
}

impl AttendanceRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn filter_sql(base: &str, query: &AttendanceQuery) -> String {
        let mut sql = base.to_string();
        if query.employee_id.is_some() {
            sql.push_str(" AND employee_id = ?");
        }
        if query.from_date.is_some() {
            sql.push_str(" AND work_date >= ?");
        }
        if query.to_date.is_some() {
            sql.push_str(" AND work_date <= ?");
        }
        sql
    }
}

#[async_trait]
impl AttendanceRepository for AttendanceRepositoryImpl {
    async fn create_check_in(
        &self,
        scope: AccessScope,
        employee_id: StringUuid,
        work_date: NaiveDate,
        at: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<AttendanceRecord> {
        let tenant_id = scope.require_tenant()?;
        let id = StringUuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO attendance_records (id, tenant_id, employee_id, work_date, check_in, note, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(employee_id)
        .bind(work_date)
        .bind(at)
        .bind(&note)
        .execute(&self.pool)
        .await?;

        self.find_by_id(scope, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create attendance record")))
    }

    async fn set_check_out(
        &self,
        scope: AccessScope,
        record_id: StringUuid,
        at: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<AttendanceRecord> {
        let tenant_id = scope.require_tenant()?;

        let result = sqlx::query(
            "UPDATE attendance_records SET check_out = ?, note = COALESCE(?, note), updated_at = NOW() WHERE tenant_id = ? AND id = ?",
        )
        .bind(at)
        .bind(&note)
        .bind(tenant_id)
        .bind(record_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Attendance record {} not found",
                record_id
            )));
        }

        self.find_by_id(scope, record_id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update attendance record")))
    }

    async fn find_by_id(&self, scope: AccessScope, id: StringUuid) -> Result<Option<AttendanceRecord>> {
        let tenant_id = scope.require_tenant()?;

        let record = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "SELECT {} FROM attendance_records WHERE tenant_id = ? AND id = ?",
            ATTENDANCE_COLUMNS
        ))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_for_day(
        &self,
        scope: AccessScope,
        employee_id: StringUuid,
        work_date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>> {
        let tenant_id = scope.require_tenant()?;

        let record = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "SELECT {} FROM attendance_records WHERE tenant_id = ? AND employee_id = ? AND work_date = ?",
            ATTENDANCE_COLUMNS
        ))
        .bind(tenant_id)
        .bind(employee_id)
        .bind(work_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list(
        &self,
        scope: AccessScope,
        query: &AttendanceQuery,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AttendanceRecord>> {
        let tenant_id = scope.require_tenant()?;

        let mut sql = Self::filter_sql(
            &format!(
                "SELECT {} FROM attendance_records WHERE tenant_id = ?",
                ATTENDANCE_COLUMNS
            ),
            query,
        );
        sql.push_str(" ORDER BY work_date DESC, created_at DESC LIMIT ? OFFSET ?");

        let mut q = sqlx::query_as::<_, AttendanceRecord>(&sql).bind(tenant_id);
        if let Some(employee_id) = query.employee_id {
            q = q.bind(employee_id);
        }
        if let Some(from) = query.from_date {
            q = q.bind(from);
        }
        if let Some(to) = query.to_date {
            q = q.bind(to);
        }
        let records = q.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok(records)
    }

    async fn count(&self, scope: AccessScope, query: &AttendanceQuery) -> Result<i64> {
        let tenant_id = scope.require_tenant()?;

        let sql = Self::filter_sql(
            "SELECT COUNT(*) FROM attendance_records WHERE tenant_id = ?",
            query,
        );

        let mut q = sqlx::query_as::<_, (i64,)>(&sql).bind(tenant_id);
        if let Some(employee_id) = query.employee_id {
            q = q.bind(employee_id);
        }
        if let Some(from) = query.from_date {
            q = q.bind(from);
        }
        if let Some(to) = query.to_date {
            q = q.bind(to);
        }
        let row = q.fetch_one(&self.pool).await?;

        Ok(row.0)
    }

    async fn delete_all_for_tenant(&self, tenant_id: StringUuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM attendance_records WHERE tenant_id = ?")
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
