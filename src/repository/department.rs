//! Department repository

use crate::domain::{AccessScope, CreateDepartmentInput, Department, StringUuid, UpdateDepartmentInput};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

const DEPARTMENT_COLUMNS: &str = "id, tenant_id, name, description, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    async fn create(&self, scope: AccessScope, input: &CreateDepartmentInput) -> Result<Department>;
    async fn find_by_id(&self, scope: AccessScope, id: StringUuid) -> Result<Option<Department>>;
    async fn list(&self, scope: AccessScope) -> Result<Vec<Department>>;
    async fn update(
        &self,
        scope: AccessScope,
        id: StringUuid,
        input: &UpdateDepartmentInput,
    ) -> Result<Department>;
    async fn delete(&self, scope: AccessScope, id: StringUuid) -> Result<()>;
    async fn delete_all_for_tenant(&self, tenant_id: StringUuid) -> Result<u64>;
}

pub struct DepartmentRepositoryImpl {
    pool: MySqlPool,
}

impl DepartmentRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DepartmentRepository for DepartmentRepositoryImpl {
    async fn create(&self, scope: AccessScope, input: &CreateDepartmentInput) -> Result<Department> {
        let tenant_id = scope.require_tenant()?;
        let id = StringUuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO departments (id, tenant_id, name, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(&input.name)
        .bind(&input.description)
        .execute(&self.pool)
        .await?;

        self.find_by_id(scope, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create department")))
    }

    async fn find_by_id(&self, scope: AccessScope, id: StringUuid) -> Result<Option<Department>> {
        let tenant_id = scope.require_tenant()?;

        let department = sqlx::query_as::<_, Department>(&format!(
            "SELECT {} FROM departments WHERE tenant_id = ? AND id = ?",
            DEPARTMENT_COLUMNS
        ))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(department)
    }

    async fn list(&self, scope: AccessScope) -> Result<Vec<Department>> {
        let tenant_id = scope.require_tenant()?;

        let departments = sqlx::query_as::<_, Department>(&format!(
            "SELECT {} FROM departments WHERE tenant_id = ? ORDER BY name ASC",
            DEPARTMENT_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(departments)
    }

    async fn update(
        &self,
        scope: AccessScope,
        id: StringUuid,
        input: &UpdateDepartmentInput,
    ) -> Result<Department> {
        let tenant_id = scope.require_tenant()?;

        let existing = self
            .find_by_id(scope, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Department {} not found", id)))?;

        let name = input.name.as_ref().unwrap_or(&existing.name);
        let description = input.description.as_ref().or(existing.description.as_ref());

        sqlx::query(
            "UPDATE departments SET name = ?, description = ?, updated_at = NOW() WHERE tenant_id = ? AND id = ?",
        )
        .bind(name)
        .bind(description)
        .bind(tenant_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(scope, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update department")))
    }

    async fn delete(&self, scope: AccessScope, id: StringUuid) -> Result<()> {
        let tenant_id = scope.require_tenant()?;

        let result = sqlx::query("DELETE FROM departments WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Department {} not found", id)));
        }
        Ok(())
    }

    async fn delete_all_for_tenant(&self, tenant_id: StringUuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM departments WHERE tenant_id = ?")
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
