//! Page-level authorization policy
//!
//! Decides whether a principal may perform an action on a page within a
//! tenant. SuperAdmins bypass the matrix entirely; everyone else is
//! checked against their role's row for the page.

use crate::domain::{PermissionAction, RolePermission, StringUuid, TENANT_ADMIN_ROLE};
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::repository::RolePermissionRepository;
use crate::service::RbacService;

/// Authorize `auth` to perform `action` on `page_path` in `tenant_id`.
pub async fn authorize<R: RolePermissionRepository>(
    rbac: &RbacService<R>,
    auth: &AuthUser,
    tenant_id: StringUuid,
    page_path: &str,
    action: PermissionAction,
) -> Result<()> {
    // Platform principals are not subject to tenant matrices
    if auth.is_super_admin() {
        return Ok(());
    }

    let token_tenant = auth
        .tenant_id
        .ok_or_else(|| AppError::Forbidden("A tenant-bound token is required".to_string()))?;
    if token_tenant != tenant_id {
        return Err(AppError::Forbidden(
            "Token is not valid for this tenant".to_string(),
        ));
    }

    // Tenant admins always have full access within their own tenant;
    // a deleted or missing matrix row must not lock them out.
    if auth.role == TENANT_ADMIN_ROLE {
        return Ok(());
    }

    let flags = rbac
        .find_flags(auth.scope(), &auth.role, page_path)
        .await?;

    check(flags.as_ref(), action, page_path)
}

/// Pure decision: absent rows deny, present rows consult their flags.
pub fn check(
    flags: Option<&RolePermission>,
    action: PermissionAction,
    page_path: &str,
) -> Result<()> {
    match flags {
        Some(row) if row.allows(action) => Ok(()),
        _ => Err(AppError::Forbidden(format!(
            "Not permitted on {}",
            page_path
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccessScope, SUPER_ADMIN_ROLE};
    use crate::repository::role_permission::MockRolePermissionRepository;
    use std::sync::Arc;

    fn auth(tenant_id: Option<StringUuid>, role: &str) -> AuthUser {
        AuthUser {
            user_id: StringUuid::new_v4(),
            email: "u@t.test".to_string(),
            tenant_id,
            role: role.to_string(),
            impersonator_id: None,
        }
    }

    fn row(tenant_id: StringUuid, role: &str, page: &str, edit: bool) -> RolePermission {
        let now = chrono::Utc::now();
        RolePermission {
            id: StringUuid::new_v4(),
            tenant_id,
            role_name: role.to_string(),
            page_path: page.to_string(),
            can_access: true,
            can_view: true,
            can_create: false,
            can_edit: edit,
            can_delete: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_super_admin_bypasses_matrix() {
        let mut mock = MockRolePermissionRepository::new();
        mock.expect_find_for_role().never();
        let rbac = RbacService::new(Arc::new(mock), None);

        let result = authorize(
            &rbac,
            &auth(None, SUPER_ADMIN_ROLE),
            StringUuid::new_v4(),
            "/employees",
            PermissionAction::Delete,
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_cross_tenant_token_rejected() {
        let mock = MockRolePermissionRepository::new();
        let rbac = RbacService::new(Arc::new(mock), None);

        let result = authorize(
            &rbac,
            &auth(Some(StringUuid::new_v4()), "Manager"),
            StringUuid::new_v4(),
            "/employees",
            PermissionAction::View,
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_tenant_admin_allowed_without_matrix_row() {
        let tenant_id = StringUuid::new_v4();
        let mut mock = MockRolePermissionRepository::new();
        mock.expect_find_for_role().never();
        let rbac = RbacService::new(Arc::new(mock), None);

        let result = authorize(
            &rbac,
            &auth(Some(tenant_id), TENANT_ADMIN_ROLE),
            tenant_id,
            "/settings",
            PermissionAction::Delete,
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_tenant_admin_still_bound_to_own_tenant() {
        let mock = MockRolePermissionRepository::new();
        let rbac = RbacService::new(Arc::new(mock), None);

        let result = authorize(
            &rbac,
            &auth(Some(StringUuid::new_v4()), TENANT_ADMIN_ROLE),
            StringUuid::new_v4(),
            "/employees",
            PermissionAction::View,
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_matrix_row_drives_decision() {
        let tenant_id = StringUuid::new_v4();
        let mut mock = MockRolePermissionRepository::new();
        mock.expect_find_for_role()
            .returning(move |_, role| Ok(vec![row(tenant_id, role, "/employees", false)]));
        let rbac = RbacService::new(Arc::new(mock), None);

        let principal = auth(Some(tenant_id), "Manager");
        assert!(authorize(&rbac, &principal, tenant_id, "/employees", PermissionAction::View)
            .await
            .is_ok());
        assert!(authorize(&rbac, &principal, tenant_id, "/employees", PermissionAction::Edit)
            .await
            .is_err());
        // No row for the page at all
        assert!(authorize(&rbac, &principal, tenant_id, "/billing", PermissionAction::View)
            .await
            .is_err());
    }

    #[test]
    fn test_check_denies_on_missing_row() {
        assert!(check(None, PermissionAction::Access, "/employees").is_err());
    }
}
