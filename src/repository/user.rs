//! User repository
//!
//! Users are tenant-owned except SuperAdmins, whose `tenant_id` is NULL.
//! Lookups therefore key on an explicit `Option<StringUuid>` tenant
//! rather than an `AccessScope`.

use crate::domain::{StringUuid, User};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

const USER_COLUMNS: &str =
    "id, tenant_id, email, name, password_hash, role, is_active, created_at, updated_at";

/// Fields persisted when inserting a user row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub tenant_id: Option<StringUuid>,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &NewUser) -> Result<User>;
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<User>>;
    /// Email is unique within a tenant; `None` looks among platform users.
    async fn find_by_email(
        &self,
        tenant_id: Option<StringUuid>,
        email: &str,
    ) -> Result<Option<User>>;
    async fn list_by_tenant(&self, tenant_id: StringUuid) -> Result<Vec<User>>;
    async fn set_active(&self, id: StringUuid, is_active: bool) -> Result<()>;
    /// Deactivate every user belonging to the tenant
    async fn deactivate_tenant_users(&self, tenant_id: StringUuid) -> Result<u64>;
    async fn delete_tenant_users(&self, tenant_id: StringUuid) -> Result<u64>;
}

pub struct UserRepositoryImpl {
    pool: MySqlPool,
}

impl UserRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, user: &NewUser) -> Result<User> {
        let id = StringUuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO users (id, tenant_id, email, name, password_hash, role, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(user.tenant_id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.is_active)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create user")))
    }

    async fn find_by_id(&self, id: StringUuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(
        &self,
        tenant_id: Option<StringUuid>,
        email: &str,
    ) -> Result<Option<User>> {
        let user = match tenant_id {
            Some(tid) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {} FROM users WHERE tenant_id = ? AND email = ?",
                    USER_COLUMNS
                ))
                .bind(tid)
                .bind(email)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {} FROM users WHERE tenant_id IS NULL AND email = ?",
                    USER_COLUMNS
                ))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        Ok(user)
    }

    async fn list_by_tenant(&self, tenant_id: StringUuid) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE tenant_id = ? ORDER BY created_at ASC",
            USER_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn set_active(&self, id: StringUuid, is_active: bool) -> Result<()> {
        let result =
            sqlx::query("UPDATE users SET is_active = ?, updated_at = NOW() WHERE id = ?")
                .bind(is_active)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    async fn deactivate_tenant_users(&self, tenant_id: StringUuid) -> Result<u64> {
        let result =
            sqlx::query("UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE tenant_id = ?")
                .bind(tenant_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    async fn delete_tenant_users(&self, tenant_id: StringUuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM users WHERE tenant_id = ?")
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
