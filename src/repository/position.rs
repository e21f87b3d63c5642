//! Position repository

use crate::domain::{AccessScope, CreatePositionInput, Position, StringUuid, UpdatePositionInput};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

const POSITION_COLUMNS: &str = "id, tenant_id, title, description, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PositionRepository: Send + Sync {
    async fn create(&self, scope: AccessScope, input: &CreatePositionInput) -> Result<Position>;
    async fn find_by_id(&self, scope: AccessScope, id: StringUuid) -> Result<Option<Position>>;
    async fn list(&self, scope: AccessScope) -> Result<Vec<Position>>;
    async fn update(
        &self,
        scope: AccessScope,
        id: StringUuid,
        input: &UpdatePositionInput,
    ) -> Result<Position>;
    async fn delete(&self, scope: AccessScope, id: StringUuid) -> Result<()>;
    async fn delete_all_for_tenant(&self, tenant_id: StringUuid) -> Result<u64>;
}

pub struct PositionRepositoryImpl {
    pool: MySqlPool,
}

impl PositionRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PositionRepository for PositionRepositoryImpl {
    async fn create(&self, scope: AccessScope, input: &CreatePositionInput) -> Result<Position> {
        let tenant_id = scope.require_tenant()?;
        let id = StringUuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO positions (id, tenant_id, title, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(&input.title)
        .bind(&input.description)
        .execute(&self.pool)
        .await?;

        self.find_by_id(scope, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create position")))
    }

    async fn find_by_id(&self, scope: AccessScope, id: StringUuid) -> Result<Option<Position>> {
        let tenant_id = scope.require_tenant()?;

        let position = sqlx::query_as::<_, Position>(&format!(
            "SELECT {} FROM positions WHERE tenant_id = ? AND id = ?",
            POSITION_COLUMNS
        ))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(position)
    }

    async fn list(&self, scope: AccessScope) -> Result<Vec<Position>> {
        let tenant_id = scope.require_tenant()?;

        let positions = sqlx::query_as::<_, Position>(&format!(
            "SELECT {} FROM positions WHERE tenant_id = ? ORDER BY title ASC",
            POSITION_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(positions)
    }

    async fn update(
        &self,
        scope: AccessScope,
        id: StringUuid,
        input: &UpdatePositionInput,
    ) -> Result<Position> {
        let tenant_id = scope.require_tenant()?;

        let existing = self
            .find_by_id(scope, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Position {} not found", id)))?;

        let title = input.title.as_ref().unwrap_or(&existing.title);
        let description = input.description.as_ref().or(existing.description.as_ref());

        sqlx::query(
            "UPDATE positions SET title = ?, description = ?, updated_at = NOW() WHERE tenant_id = ? AND id = ?",
        )
        .bind(title)
        .bind(description)
        .bind(tenant_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(scope, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update position")))
    }

    async fn delete(&self, scope: AccessScope, id: StringUuid) -> Result<()> {
        let tenant_id = scope.require_tenant()?;

        let result = sqlx::query("DELETE FROM positions WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Position {} not found", id)));
        }
        Ok(())
    }

    async fn delete_all_for_tenant(&self, tenant_id: StringUuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM positions WHERE tenant_id = ?")
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
