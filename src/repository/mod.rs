//! Data access layer
//!
//! Each repository is a trait (mocked in tests via mockall) plus a MySQL
//! implementation. Repositories over tenant-owned tables take an
//! [`crate::domain::AccessScope`] and refuse to run without a concrete
//! tenant; cross-tenant access goes through explicitly platform-level
//! methods instead.

pub mod alert;
pub mod attendance;
pub mod audit;
pub mod department;
pub mod employee;
pub mod leave;
pub mod position;
pub mod role_permission;
pub mod subscription;
pub mod tenant;
pub mod user;
pub mod webhook_event;

pub use alert::{AlertRepository, AlertRepositoryImpl};
pub use attendance::{AttendanceRepository, AttendanceRepositoryImpl};
pub use audit::{
    AuditLog, AuditLogQuery, AuditRepository, AuditRepositoryImpl, CreateAuditLogInput,
};
pub use department::{DepartmentRepository, DepartmentRepositoryImpl};
pub use employee::{EmployeeRepository, EmployeeRepositoryImpl};
pub use leave::{LeaveRepository, LeaveRepositoryImpl};
pub use position::{PositionRepository, PositionRepositoryImpl};
pub use role_permission::{RolePermissionRepository, RolePermissionRepositoryImpl};
pub use subscription::{NewSubscription, SubscriptionRepository, SubscriptionRepositoryImpl};
pub use tenant::{TenantRepository, TenantRepositoryImpl};
pub use user::{NewUser, UserRepository, UserRepositoryImpl};
pub use webhook_event::{InsertOutcome, WebhookEventRepository, WebhookEventRepositoryImpl};
