//! Role-permission matrix domain model
//!
//! One row per (tenant, role, page); boolean CRUD flags drive both menu
//! visibility and endpoint authorization.

use super::common::StringUuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Action being attempted against a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionAction {
    Access,
    View,
    Create,
    Edit,
    Delete,
}

/// Per-tenant, per-role, per-page permission flags.
/// Unique per (tenant_id, role_name, page_path).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RolePermission {
    pub id: StringUuid,
    pub tenant_id: StringUuid,
    pub role_name: String,
    pub page_path: String,
    pub can_access: bool,
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RolePermission {
    pub fn allows(&self, action: PermissionAction) -> bool {
        match action {
            PermissionAction::Access => self.can_access,
            PermissionAction::View => self.can_access && self.can_view,
            PermissionAction::Create => self.can_access && self.can_create,
            PermissionAction::Edit => self.can_access && self.can_edit,
            PermissionAction::Delete => self.can_access && self.can_delete,
        }
    }
}

/// Input for upserting a single matrix row
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertRolePermissionInput {
    #[validate(length(min = 1, max = 64))]
    pub role_name: String,
    #[validate(length(min = 1, max = 128))]
    pub page_path: String,
    pub can_access: bool,
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

/// Input for replacing a role's entire matrix in one call
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReplaceRoleMatrixInput {
    #[validate(length(min = 1, max = 64))]
    pub role_name: String,
    #[validate(nested)]
    pub pages: Vec<PageFlags>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PageFlags {
    #[validate(length(min = 1, max = 128))]
    pub page_path: String,
    pub can_access: bool,
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

/// Pages the application knows about; used to seed a new tenant's matrix
pub const KNOWN_PAGES: &[&str] = &[
    "/employees",
    "/departments",
    "/positions",
    "/attendance",
    "/leave-requests",
    "/settings/roles",
    "/billing",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn row(access: bool, view: bool, create: bool, edit: bool, delete: bool) -> RolePermission {
        let now = Utc::now();
        RolePermission {
            id: StringUuid::new_v4(),
            tenant_id: StringUuid::new_v4(),
            role_name: "Manager".to_string(),
            page_path: "/employees".to_string(),
            can_access: access,
            can_view: view,
            can_create: create,
            can_edit: edit,
            can_delete: delete,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_allows_requires_access() {
        // view flag without access is inert
        let r = row(false, true, true, true, true);
        assert!(!r.allows(PermissionAction::Access));
        assert!(!r.allows(PermissionAction::View));
        assert!(!r.allows(PermissionAction::Delete));
    }

    #[test]
    fn test_allows_per_action() {
        let r = row(true, true, false, true, false);
        assert!(r.allows(PermissionAction::Access));
        assert!(r.allows(PermissionAction::View));
        assert!(!r.allows(PermissionAction::Create));
        assert!(r.allows(PermissionAction::Edit));
        assert!(!r.allows(PermissionAction::Delete));
    }
}
