//! Domain models

mod attendance;
mod billing;
mod common;
mod department;
mod employee;
mod leave;
mod permission;
mod position;
mod scope;
mod subscription;
mod tenant;
mod user;

pub use attendance::{AttendanceQuery, AttendanceRecord, CheckInInput, CheckOutInput};
pub use billing::{
    Alert, BillingEventPayload, CreateAlertInput, WebhookEvent, WebhookEventStatus,
};
pub use common::StringUuid;
pub use department::{CreateDepartmentInput, Department, UpdateDepartmentInput};
pub use employee::{CreateEmployeeInput, Employee, UpdateEmployeeInput};
pub use leave::{CreateLeaveRequestInput, LeaveRequest, LeaveStatus};
pub use permission::{
    PageFlags, PermissionAction, ReplaceRoleMatrixInput, RolePermission,
    UpsertRolePermissionInput, KNOWN_PAGES,
};
pub use position::{CreatePositionInput, Position, UpdatePositionInput};
pub use scope::AccessScope;
pub use subscription::{
    Subscription, SubscriptionOverrideInput, SubscriptionPlan, SubscriptionStatus,
};
pub use tenant::{SignupInput, Tenant, TenantStatus, UpdateTenantInput, DOMAIN_REGEX};
pub use user::{
    CreateUserInput, LoginInput, User, SUPER_ADMIN_ROLE, TENANT_ADMIN_ROLE,
};
