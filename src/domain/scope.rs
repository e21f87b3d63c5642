//! Access scope for tenant data isolation
//!
//! Every repository method that touches a tenant-owned table takes an
//! `AccessScope`. `Tenant` scope appends a `tenant_id = ?` predicate to
//! each query; `Platform` scope is the explicit bypass reserved for
//! SuperAdmin endpoints and background workers.

use super::common::StringUuid;
use crate::error::{AppError, Result};

/// Row-level scope applied to every tenant-owned query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessScope {
    /// Restrict all queries to a single tenant's rows
    Tenant(StringUuid),
    /// No tenant restriction. Only constructible for platform-level
    /// principals; never derived from a tenant request.
    Platform,
}

impl AccessScope {
    /// The tenant this scope is restricted to, if any
    pub fn tenant_id(&self) -> Option<StringUuid> {
        match self {
            AccessScope::Tenant(id) => Some(*id),
            AccessScope::Platform => None,
        }
    }

    /// Require a tenant-restricted scope. Platform callers that want to
    /// touch tenant-owned rows must pick a concrete tenant first.
    pub fn require_tenant(&self) -> Result<StringUuid> {
        self.tenant_id()
            .ok_or_else(|| AppError::BadRequest("A tenant scope is required".to_string()))
    }

    pub fn is_platform(&self) -> bool {
        matches!(self, AccessScope::Platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_scope_exposes_tenant_id() {
        let id = StringUuid::new_v4();
        let scope = AccessScope::Tenant(id);
        assert_eq!(scope.tenant_id(), Some(id));
        assert_eq!(scope.require_tenant().unwrap(), id);
        assert!(!scope.is_platform());
    }

    #[test]
    fn test_platform_scope_has_no_tenant() {
        let scope = AccessScope::Platform;
        assert_eq!(scope.tenant_id(), None);
        assert!(scope.require_tenant().is_err());
        assert!(scope.is_platform());
    }
}
