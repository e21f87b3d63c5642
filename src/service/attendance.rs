//! Attendance business logic
//!
//! One record per employee per UTC work day; check-in opens it,
//! check-out closes it.

use crate::domain::{
    AccessScope, AttendanceQuery, AttendanceRecord, CheckInInput, CheckOutInput, StringUuid,
};
use crate::error::{AppError, Result};
use crate::repository::{AttendanceRepository, EmployeeRepository};
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

pub struct AttendanceService<A, E>
where
    A: AttendanceRepository,
    E: EmployeeRepository,
{
    attendance: Arc<A>,
    employees: Arc<E>,
}

impl<A, E> AttendanceService<A, E>
where
    A: AttendanceRepository,
    E: EmployeeRepository,
{
    pub fn new(attendance: Arc<A>, employees: Arc<E>) -> Self {
        Self {
            attendance,
            employees,
        }
    }

    pub async fn check_in(&self, scope: AccessScope, input: CheckInInput) -> Result<AttendanceRecord> {
        input.validate()?;
        self.require_active_employee(scope, input.employee_id).await?;

        let now = Utc::now();
        let today = now.date_naive();

        if self
            .attendance
            .find_for_day(scope, input.employee_id, today)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Already checked in today".to_string()));
        }

        self.attendance
            .create_check_in(scope, input.employee_id, today, now, input.note)
            .await
    }

    pub async fn check_out(&self, scope: AccessScope, input: CheckOutInput) -> Result<AttendanceRecord> {
        input.validate()?;
        self.require_active_employee(scope, input.employee_id).await?;

        let now = Utc::now();
        let today = now.date_naive();

        let record = self
            .attendance
            .find_for_day(scope, input.employee_id, today)
            .await?
            .ok_or_else(|| AppError::Conflict("No check-in recorded today".to_string()))?;

        if record.check_out.is_some() {
            return Err(AppError::Conflict("Already checked out today".to_string()));
        }

        self.attendance
            .set_check_out(scope, record.id, now, input.note)
            .await
    }

    pub async fn list(
        &self,
        scope: AccessScope,
        query: AttendanceQuery,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<AttendanceRecord>, i64)> {
        let records = self.attendance.list(scope, &query, offset, limit).await?;
        let total = self.attendance.count(scope, &query).await?;
        Ok((records, total))
    }

    async fn require_active_employee(&self, scope: AccessScope, id: StringUuid) -> Result<()> {
        let employee = self
            .employees
            .find_by_id(scope, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", id)))?;
        if !employee.is_active {
            return Err(AppError::BadRequest("Employee is not active".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Employee;
    use crate::repository::attendance::MockAttendanceRepository;
    use crate::repository::employee::MockEmployeeRepository;
    use chrono::NaiveDate;

    fn active_employee(scope: AccessScope) -> Employee {
        let now = Utc::now();
        Employee {
            id: StringUuid::new_v4(),
            tenant_id: scope.tenant_id().unwrap(),
            employee_number: "E-001".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@acme.test".to_string(),
            department_id: None,
            position_id: None,
            hire_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn record(scope: AccessScope, employee_id: StringUuid, checked_out: bool) -> AttendanceRecord {
        let now = Utc::now();
        AttendanceRecord {
            id: StringUuid::new_v4(),
            tenant_id: scope.tenant_id().unwrap(),
            employee_id,
            work_date: now.date_naive(),
            check_in: Some(now),
            check_out: checked_out.then_some(now),
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_double_check_in_rejected() {
        let scope = AccessScope::Tenant(StringUuid::new_v4());
        let employee = active_employee(scope);
        let employee_id = employee.id;
        let existing = record(scope, employee_id, false);

        let mut employees = MockEmployeeRepository::new();
        employees
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(employee.clone())));

        let mut attendance = MockAttendanceRepository::new();
        attendance
            .expect_find_for_day()
            .returning(move |_, _, _| Ok(Some(existing.clone())));
        attendance.expect_create_check_in().never();

        let service = AttendanceService::new(Arc::new(attendance), Arc::new(employees));
        let result = service
            .check_in(scope, CheckInInput { employee_id, note: None })
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_check_out_without_check_in_rejected() {
        let scope = AccessScope::Tenant(StringUuid::new_v4());
        let employee = active_employee(scope);
        let employee_id = employee.id;

        let mut employees = MockEmployeeRepository::new();
        employees
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(employee.clone())));

        let mut attendance = MockAttendanceRepository::new();
        attendance.expect_find_for_day().returning(|_, _, _| Ok(None));
        attendance.expect_set_check_out().never();

        let service = AttendanceService::new(Arc::new(attendance), Arc::new(employees));
        let result = service
            .check_out(scope, CheckOutInput { employee_id, note: None })
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_double_check_out_rejected() {
        let scope = AccessScope::Tenant(StringUuid::new_v4());
        let employee = active_employee(scope);
        let employee_id = employee.id;
        let done = record(scope, employee_id, true);

        let mut employees = MockEmployeeRepository::new();
        employees
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(employee.clone())));

        let mut attendance = MockAttendanceRepository::new();
        attendance
            .expect_find_for_day()
            .returning(move |_, _, _| Ok(Some(done.clone())));
        attendance.expect_set_check_out().never();

        let service = AttendanceService::new(Arc::new(attendance), Arc::new(employees));
        let result = service
            .check_out(scope, CheckOutInput { employee_id, note: None })
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
