//! Business logic layer
//!
//! Services are generic over repository traits so tests can run them
//! against mockall mocks without a database.

pub mod attendance;
pub mod auth;
pub mod billing;
pub mod directory;
pub mod employee;
pub mod leave;
pub mod rbac;
pub mod tenant;

pub use attendance::AttendanceService;
pub use auth::{AuthService, TokenPair};
pub use billing::{BillingService, IngestOutcome, ReconciliationReport};
pub use directory::DirectoryService;
pub use employee::EmployeeService;
pub use leave::LeaveService;
pub use rbac::RbacService;
pub use tenant::TenantService;
