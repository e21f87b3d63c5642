//! Leave request business logic

use crate::domain::{
    AccessScope, CreateLeaveRequestInput, LeaveRequest, LeaveStatus, StringUuid,
};
use crate::error::{AppError, Result};
use crate::repository::{EmployeeRepository, LeaveRepository};
use std::sync::Arc;
use validator::Validate;

pub struct LeaveService<L, E>
where
    L: LeaveRepository,
    E: EmployeeRepository,
{
    leave: Arc<L>,
    employees: Arc<E>,
}

impl<L, E> LeaveService<L, E>
where
    L: LeaveRepository,
    E: EmployeeRepository,
{
    pub fn new(leave: Arc<L>, employees: Arc<E>) -> Self {
        Self { leave, employees }
    }

    pub async fn create(
        &self,
        scope: AccessScope,
        input: CreateLeaveRequestInput,
    ) -> Result<LeaveRequest> {
        input.validate()?;

        if input.end_date < input.start_date {
            return Err(AppError::BadRequest(
                "end_date must not precede start_date".to_string(),
            ));
        }

        if self
            .employees
            .find_by_id(scope, input.employee_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "Employee {} not found",
                input.employee_id
            )));
        }

        self.leave.create(scope, &input).await
    }

    pub async fn get(&self, scope: AccessScope, id: StringUuid) -> Result<LeaveRequest> {
        self.leave
            .find_by_id(scope, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Leave request {} not found", id)))
    }

    pub async fn list(
        &self,
        scope: AccessScope,
        status: Option<LeaveStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<LeaveRequest>, i64)> {
        let requests = self.leave.list(scope, status, offset, limit).await?;
        let total = self.leave.count(scope, status).await?;
        Ok((requests, total))
    }

    pub async fn approve(
        &self,
        scope: AccessScope,
        id: StringUuid,
        decided_by: StringUuid,
    ) -> Result<LeaveRequest> {
        self.leave
            .decide(scope, id, LeaveStatus::Approved, decided_by)
            .await
    }

    pub async fn reject(
        &self,
        scope: AccessScope,
        id: StringUuid,
        decided_by: StringUuid,
    ) -> Result<LeaveRequest> {
        self.leave
            .decide(scope, id, LeaveStatus::Rejected, decided_by)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::employee::MockEmployeeRepository;
    use crate::repository::leave::MockLeaveRepository;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_reversed_dates_rejected() {
        let mut leave = MockLeaveRepository::new();
        leave.expect_create().never();

        let service = LeaveService::new(Arc::new(leave), Arc::new(MockEmployeeRepository::new()));
        let result = service
            .create(
                AccessScope::Tenant(StringUuid::new_v4()),
                CreateLeaveRequestInput {
                    employee_id: StringUuid::new_v4(),
                    leave_type: "vacation".to_string(),
                    start_date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
                    end_date: NaiveDate::from_ymd_opt(2026, 8, 5).unwrap(),
                    reason: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_unknown_employee_rejected() {
        let mut leave = MockLeaveRepository::new();
        leave.expect_create().never();
        let mut employees = MockEmployeeRepository::new();
        employees.expect_find_by_id().returning(|_, _| Ok(None));

        let service = LeaveService::new(Arc::new(leave), Arc::new(employees));
        let result = service
            .create(
                AccessScope::Tenant(StringUuid::new_v4()),
                CreateLeaveRequestInput {
                    employee_id: StringUuid::new_v4(),
                    leave_type: "vacation".to_string(),
                    start_date: NaiveDate::from_ymd_opt(2026, 8, 5).unwrap(),
                    end_date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
                    reason: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
