//! Employee repository

use crate::domain::{AccessScope, CreateEmployeeInput, Employee, StringUuid, UpdateEmployeeInput};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

const EMPLOYEE_COLUMNS: &str = "id, tenant_id, employee_number, first_name, last_name, email, \
     department_id, position_id, hire_date, is_active, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn create(&self, scope: AccessScope, input: &CreateEmployeeInput) -> Result<Employee>;
    async fn find_by_id(&self, scope: AccessScope, id: StringUuid) -> Result<Option<Employee>>;
    async fn find_by_number(&self, scope: AccessScope, number: &str) -> Result<Option<Employee>>;
    async fn list(&self, scope: AccessScope, offset: i64, limit: i64) -> Result<Vec<Employee>>;
    async fn count(&self, scope: AccessScope) -> Result<i64>;
    async fn update(
        &self,
        scope: AccessScope,
        id: StringUuid,
        input: &UpdateEmployeeInput,
    ) -> Result<Employee>;
    async fn delete(&self, scope: AccessScope, id: StringUuid) -> Result<()>;
    async fn delete_all_for_tenant(&self, tenant_id: StringUuid) -> Result<u64>;
}

pub struct EmployeeRepositoryImpl {
    pool: MySqlPool,
}

impl EmployeeRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeRepository for EmployeeRepositoryImpl {
    async fn create(&self, scope: AccessScope, input: &CreateEmployeeInput) -> Result<Employee> {
        let tenant_id = scope.require_tenant()?;
        let id = StringUuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO employees
                (id, tenant_id, employee_number, first_name, last_name, email, department_id, position_id, hire_date, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, TRUE, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(&input.employee_number)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(input.department_id)
        .bind(input.position_id)
        .bind(input.hire_date)
        .execute(&self.pool)
        .await?;

        self.find_by_id(scope, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create employee")))
    }

    async fn find_by_id(&self, scope: AccessScope, id: StringUuid) -> Result<Option<Employee>> {
        let tenant_id = scope.require_tenant()?;

        let employee = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {} FROM employees WHERE tenant_id = ? AND id = ?",
            EMPLOYEE_COLUMNS
        ))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn find_by_number(&self, scope: AccessScope, number: &str) -> Result<Option<Employee>> {
        let tenant_id = scope.require_tenant()?;

        let employee = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {} FROM employees WHERE tenant_id = ? AND employee_number = ?",
            EMPLOYEE_COLUMNS
        ))
        .bind(tenant_id)
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn list(&self, scope: AccessScope, offset: i64, limit: i64) -> Result<Vec<Employee>> {
        let tenant_id = scope.require_tenant()?;

        let employees = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {} FROM employees WHERE tenant_id = ? ORDER BY employee_number ASC LIMIT ? OFFSET ?",
            EMPLOYEE_COLUMNS
        ))
        .bind(tenant_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    async fn count(&self, scope: AccessScope) -> Result<i64> {
        let tenant_id = scope.require_tenant()?;

        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM employees WHERE tenant_id = ?")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    async fn update(
        &self,
        scope: AccessScope,
        id: StringUuid,
        input: &UpdateEmployeeInput,
    ) -> Result<Employee> {
        let tenant_id = scope.require_tenant()?;

        let existing = self
            .find_by_id(scope, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", id)))?;

        let first_name = input.first_name.as_ref().unwrap_or(&existing.first_name);
        let last_name = input.last_name.as_ref().unwrap_or(&existing.last_name);
        let email = input.email.as_ref().unwrap_or(&existing.email);
        let department_id = input.department_id.or(existing.department_id);
        let position_id = input.position_id.or(existing.position_id);
        let is_active = input.is_active.unwrap_or(existing.is_active);

        sqlx::query(
            r#"
            UPDATE employees
            SET first_name = ?, last_name = ?, email = ?, department_id = ?, position_id = ?, is_active = ?, updated_at = NOW()
            WHERE tenant_id = ? AND id = ?
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(department_id)
        .bind(position_id)
        .bind(is_active)
        .bind(tenant_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(scope, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update employee")))
    }

    async fn delete(&self, scope: AccessScope, id: StringUuid) -> Result<()> {
        let tenant_id = scope.require_tenant()?;

        let result = sqlx::query("DELETE FROM employees WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Employee {} not found", id)));
        }
        Ok(())
    }

    async fn delete_all_for_tenant(&self, tenant_id: StringUuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM employees WHERE tenant_id = ?")
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_platform_scope_rejected() {
        let mut mock = MockEmployeeRepository::new();
        mock.expect_count()
            .returning(|scope| scope.require_tenant().map(|_| 0));

        let err = mock.count(AccessScope::Platform).await;
        assert!(err.is_err());
    }
}
