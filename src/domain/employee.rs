//! Employee domain model

use super::common::StringUuid;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub id: StringUuid,
    pub tenant_id: StringUuid,
    pub employee_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department_id: Option<StringUuid>,
    pub position_id: Option<StringUuid>,
    pub hire_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEmployeeInput {
    #[validate(length(min = 1, max = 32))]
    pub employee_number: String,
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub department_id: Option<StringUuid>,
    pub position_id: Option<StringUuid>,
    pub hire_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateEmployeeInput {
    #[validate(length(min = 1, max = 255))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub department_id: Option<StringUuid>,
    pub position_id: Option<StringUuid>,
    pub is_active: Option<bool>,
}
