//! Tenant repository
//!
//! Tenants are platform-level rows; they are not themselves scoped.

use crate::domain::{SignupInput, StringUuid, Tenant, TenantStatus, UpdateTenantInput};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

const TENANT_COLUMNS: &str = "id, name, domain, status, admin_email, admin_name, \
     suspended_at, canceled_at, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn create(&self, input: &SignupInput) -> Result<Tenant>;
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Tenant>>;
    async fn find_by_domain(&self, domain: &str) -> Result<Option<Tenant>>;
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Tenant>>;
    async fn count(&self) -> Result<i64>;
    async fn update_profile(&self, id: StringUuid, input: &UpdateTenantInput) -> Result<Tenant>;
    /// Persist a lifecycle transition. The caller is responsible for
    /// checking `can_transition_to`; this writes status and timestamps.
    async fn set_status(&self, id: StringUuid, status: TenantStatus) -> Result<Tenant>;
    async fn list_by_status(&self, status: TenantStatus, limit: i64) -> Result<Vec<Tenant>>;
    /// Suspended tenants whose suspension began before `cutoff`
    async fn list_suspended_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Tenant>>;
    /// Canceled tenants whose cancellation happened before `cutoff`
    async fn list_canceled_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Tenant>>;
}

pub struct TenantRepositoryImpl {
    pool: MySqlPool,
}

impl TenantRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for TenantRepositoryImpl {
    async fn create(&self, input: &SignupInput) -> Result<Tenant> {
        let id = StringUuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO tenants (id, name, domain, status, admin_email, admin_name, created_at, updated_at)
            VALUES (?, ?, ?, 'provisioning', ?, ?, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(&input.company_name)
        .bind(&input.domain)
        .bind(&input.admin_email)
        .bind(&input.admin_name)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create tenant")))
    }

    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {} FROM tenants WHERE id = ?",
            TENANT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {} FROM tenants WHERE domain = ?",
            TENANT_COLUMNS
        ))
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Tenant>> {
        let tenants = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {} FROM tenants ORDER BY created_at DESC LIMIT ? OFFSET ?",
            TENANT_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(tenants)
    }

    async fn count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tenants")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    async fn update_profile(&self, id: StringUuid, input: &UpdateTenantInput) -> Result<Tenant> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tenant {} not found", id)))?;

        let name = input.name.as_ref().unwrap_or(&existing.name);
        let domain = input.domain.as_ref().unwrap_or(&existing.domain);

        sqlx::query("UPDATE tenants SET name = ?, domain = ?, updated_at = NOW() WHERE id = ?")
            .bind(name)
            .bind(domain)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update tenant")))
    }

    async fn set_status(&self, id: StringUuid, status: TenantStatus) -> Result<Tenant> {
        // suspended_at / canceled_at record when the grace clock started
        let sql = match status {
            TenantStatus::Suspended => {
                "UPDATE tenants SET status = ?, suspended_at = NOW(), updated_at = NOW() WHERE id = ?"
            }
            TenantStatus::Canceled => {
                "UPDATE tenants SET status = ?, canceled_at = NOW(), updated_at = NOW() WHERE id = ?"
            }
            TenantStatus::Active => {
                "UPDATE tenants SET status = ?, suspended_at = NULL, updated_at = NOW() WHERE id = ?"
            }
            _ => "UPDATE tenants SET status = ?, updated_at = NOW() WHERE id = ?",
        };

        let result = sqlx::query(sql).bind(status).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Tenant {} not found", id)));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update tenant status")))
    }

    async fn list_by_status(&self, status: TenantStatus, limit: i64) -> Result<Vec<Tenant>> {
        let tenants = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {} FROM tenants WHERE status = ? ORDER BY created_at ASC LIMIT ?",
            TENANT_COLUMNS
        ))
        .bind(status)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(tenants)
    }

    async fn list_suspended_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Tenant>> {
        let tenants = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {} FROM tenants WHERE status = 'suspended' AND suspended_at < ?",
            TENANT_COLUMNS
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(tenants)
    }

    async fn list_canceled_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Tenant>> {
        let tenants = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {} FROM tenants WHERE status = 'canceled' AND canceled_at < ?",
            TENANT_COLUMNS
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(tenants)
    }
}
