//! Department and position management

use crate::domain::{
    AccessScope, CreateDepartmentInput, CreatePositionInput, Department, Position, StringUuid,
    UpdateDepartmentInput, UpdatePositionInput,
};
use crate::error::{AppError, Result};
use crate::repository::{DepartmentRepository, PositionRepository};
use std::sync::Arc;
use validator::Validate;

pub struct DirectoryService<D, P>
where
    D: DepartmentRepository,
    P: PositionRepository,
{
    departments: Arc<D>,
    positions: Arc<P>,
}

impl<D, P> DirectoryService<D, P>
where
    D: DepartmentRepository,
    P: PositionRepository,
{
    pub fn new(departments: Arc<D>, positions: Arc<P>) -> Self {
        Self {
            departments,
            positions,
        }
    }

    // ==================== Departments ====================

    pub async fn create_department(
        &self,
        scope: AccessScope,
        input: CreateDepartmentInput,
    ) -> Result<Department> {
        input.validate()?;
        self.departments.create(scope, &input).await
    }

    pub async fn get_department(&self, scope: AccessScope, id: StringUuid) -> Result<Department> {
        self.departments
            .find_by_id(scope, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Department {} not found", id)))
    }

    pub async fn list_departments(&self, scope: AccessScope) -> Result<Vec<Department>> {
        self.departments.list(scope).await
    }

    pub async fn update_department(
        &self,
        scope: AccessScope,
        id: StringUuid,
        input: UpdateDepartmentInput,
    ) -> Result<Department> {
        input.validate()?;
        self.departments.update(scope, id, &input).await
    }

    pub async fn delete_department(&self, scope: AccessScope, id: StringUuid) -> Result<()> {
        self.departments.delete(scope, id).await
    }

    // ==================== Positions ====================

    pub async fn create_position(
        &self,
        scope: AccessScope,
        input: CreatePositionInput,
    ) -> Result<Position> {
        input.validate()?;
        self.positions.create(scope, &input).await
    }

    pub async fn get_position(&self, scope: AccessScope, id: StringUuid) -> Result<Position> {
        self.positions
            .find_by_id(scope, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Position {} not found", id)))
    }

    pub async fn list_positions(&self, scope: AccessScope) -> Result<Vec<Position>> {
        self.positions.list(scope).await
    }

    pub async fn update_position(
        &self,
        scope: AccessScope,
        id: StringUuid,
        input: UpdatePositionInput,
    ) -> Result<Position> {
        input.validate()?;
        self.positions.update(scope, id, &input).await
    }

    pub async fn delete_position(&self, scope: AccessScope, id: StringUuid) -> Result<()> {
        self.positions.delete(scope, id).await
    }
}
