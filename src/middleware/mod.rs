//! Request middleware and extractors

pub mod auth;
pub mod tenant;

pub use auth::{AuthError, AuthUser};
pub use tenant::{TenantContext, TENANT_ID_HEADER};
