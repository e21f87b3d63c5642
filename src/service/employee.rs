//! Employee business logic

use crate::domain::{
    AccessScope, CreateEmployeeInput, Employee, StringUuid, UpdateEmployeeInput,
};
use crate::error::{AppError, Result};
use crate::repository::{DepartmentRepository, EmployeeRepository, PositionRepository};
use std::sync::Arc;
use validator::Validate;

pub struct EmployeeService<E, D, P>
where
    E: EmployeeRepository,
    D: DepartmentRepository,
    P: PositionRepository,
{
    employees: Arc<E>,
    departments: Arc<D>,
    positions: Arc<P>,
}

impl<E, D, P> EmployeeService<E, D, P>
where
    E: EmployeeRepository,
    D: DepartmentRepository,
    P: PositionRepository,
{
    pub fn new(employees: Arc<E>, departments: Arc<D>, positions: Arc<P>) -> Self {
        Self {
            employees,
            departments,
            positions,
        }
    }

    pub async fn create(&self, scope: AccessScope, input: CreateEmployeeInput) -> Result<Employee> {
        input.validate()?;

        if self
            .employees
            .find_by_number(scope, &input.employee_number)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Employee number {} is already in use",
                input.employee_number
            )));
        }

        self.check_references(scope, input.department_id, input.position_id)
            .await?;

        self.employees.create(scope, &input).await
    }

    pub async fn get(&self, scope: AccessScope, id: StringUuid) -> Result<Employee> {
        self.employees
            .find_by_id(scope, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", id)))
    }

    pub async fn list(
        &self,
        scope: AccessScope,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Employee>, i64)> {
        let employees = self.employees.list(scope, offset, limit).await?;
        let total = self.employees.count(scope).await?;
        Ok((employees, total))
    }

    pub async fn update(
        &self,
        scope: AccessScope,
        id: StringUuid,
        input: UpdateEmployeeInput,
    ) -> Result<Employee> {
        input.validate()?;
        self.check_references(scope, input.department_id, input.position_id)
            .await?;
        self.employees.update(scope, id, &input).await
    }

    pub async fn delete(&self, scope: AccessScope, id: StringUuid) -> Result<()> {
        self.employees.delete(scope, id).await
    }

    /// Referenced department/position must exist within the same tenant
    async fn check_references(
        &self,
        scope: AccessScope,
        department_id: Option<StringUuid>,
        position_id: Option<StringUuid>,
    ) -> Result<()> {
        if let Some(dept_id) = department_id {
            if self.departments.find_by_id(scope, dept_id).await?.is_none() {
                return Err(AppError::BadRequest(format!(
                    "Department {} not found",
                    dept_id
                )));
            }
        }
        if let Some(pos_id) = position_id {
            if self.positions.find_by_id(scope, pos_id).await?.is_none() {
                return Err(AppError::BadRequest(format!("Position {} not found", pos_id)));
            }
        }
        Ok(())
    }
}
