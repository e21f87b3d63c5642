//! Attendance domain model

use super::common::StringUuid;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// One attendance record per employee per work day
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceRecord {
    pub id: StringUuid,
    pub tenant_id: StringUuid,
    pub employee_id: StringUuid,
    pub work_date: NaiveDate,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckInInput {
    pub employee_id: StringUuid,
    #[validate(length(max = 512))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckOutInput {
    pub employee_id: StringUuid,
    #[validate(length(max = 512))]
    pub note: Option<String>,
}

/// Filters for listing attendance records
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceQuery {
    pub employee_id: Option<StringUuid>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}
