//! Role-permission matrix business logic

use crate::cache::CacheManager;
use crate::domain::{
    AccessScope, ReplaceRoleMatrixInput, RolePermission, UpsertRolePermissionInput, KNOWN_PAGES,
};
use crate::error::{AppError, Result};
use crate::repository::RolePermissionRepository;
use std::sync::Arc;
use validator::Validate;

pub struct RbacService<R: RolePermissionRepository> {
    repo: Arc<R>,
    cache_manager: Option<CacheManager>,
}

impl<R: RolePermissionRepository> RbacService<R> {
    pub fn new(repo: Arc<R>, cache_manager: Option<CacheManager>) -> Self {
        Self {
            repo,
            cache_manager,
        }
    }

    /// All matrix rows for one role, cached per (tenant, role)
    pub async fn get_role_matrix(
        &self,
        scope: AccessScope,
        role_name: &str,
    ) -> Result<Vec<RolePermission>> {
        let tenant_id = scope.require_tenant()?;

        if let Some(cache) = &self.cache_manager {
            if let Ok(Some(matrix)) = cache.get_role_matrix(tenant_id, role_name).await {
                return Ok(matrix);
            }
        }

        let matrix = self.repo.find_for_role(scope, role_name).await?;

        if let Some(cache) = &self.cache_manager {
            let _ = cache.set_role_matrix(tenant_id, role_name, &matrix).await;
        }
        Ok(matrix)
    }

    /// The flags for one (role, page) pair, served from the cached matrix
    pub async fn find_flags(
        &self,
        scope: AccessScope,
        role_name: &str,
        page_path: &str,
    ) -> Result<Option<RolePermission>> {
        let matrix = self.get_role_matrix(scope, role_name).await?;
        Ok(matrix.into_iter().find(|row| row.page_path == page_path))
    }

    /// Pages the role may access, in known-page order; drives menu rendering
    pub async fn accessible_pages(&self, scope: AccessScope, role_name: &str) -> Result<Vec<String>> {
        let matrix = self.get_role_matrix(scope, role_name).await?;
        let mut pages: Vec<String> = matrix
            .into_iter()
            .filter(|row| row.can_access)
            .map(|row| row.page_path)
            .collect();
        pages.sort_by_key(|p| KNOWN_PAGES.iter().position(|k| k == p).unwrap_or(usize::MAX));
        Ok(pages)
    }

    pub async fn list_matrix(&self, scope: AccessScope) -> Result<Vec<RolePermission>> {
        self.repo.list_all(scope).await
    }

    pub async fn upsert(
        &self,
        scope: AccessScope,
        input: UpsertRolePermissionInput,
    ) -> Result<RolePermission> {
        input.validate()?;
        Self::check_known_page(&input.page_path)?;

        let row = self.repo.upsert(scope, &input).await?;
        self.invalidate(scope, Some(&input.role_name)).await;
        Ok(row)
    }

    pub async fn replace_role_matrix(
        &self,
        scope: AccessScope,
        input: ReplaceRoleMatrixInput,
    ) -> Result<Vec<RolePermission>> {
        input.validate()?;
        for page in &input.pages {
            Self::check_known_page(&page.page_path)?;
        }

        let matrix = self
            .repo
            .replace_role_matrix(scope, &input.role_name, &input.pages)
            .await?;
        self.invalidate(scope, Some(&input.role_name)).await;
        Ok(matrix)
    }

    pub async fn delete_role(&self, scope: AccessScope, role_name: &str) -> Result<()> {
        let deleted = self.repo.delete_role(scope, role_name).await?;
        if deleted == 0 {
            return Err(AppError::NotFound(format!("Role {} not found", role_name)));
        }
        self.invalidate(scope, Some(role_name)).await;
        Ok(())
    }

    fn check_known_page(page_path: &str) -> Result<()> {
        if KNOWN_PAGES.contains(&page_path) {
            Ok(())
        } else {
            Err(AppError::BadRequest(format!("Unknown page: {}", page_path)))
        }
    }

    async fn invalidate(&self, scope: AccessScope, role_name: Option<&str>) {
        if let (Some(cache), Some(tenant_id)) = (&self.cache_manager, scope.tenant_id()) {
            let _ = cache.invalidate_role_matrix(tenant_id, role_name).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PageFlags, StringUuid};
    use crate::repository::role_permission::MockRolePermissionRepository;
    use mockall::predicate::*;

    fn row(tenant_id: StringUuid, role: &str, page: &str, access: bool) -> RolePermission {
        let now = chrono::Utc::now();
        RolePermission {
            id: StringUuid::new_v4(),
            tenant_id,
            role_name: role.to_string(),
            page_path: page.to_string(),
            can_access: access,
            can_view: access,
            can_create: false,
            can_edit: false,
            can_delete: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_accessible_pages_filters_and_orders() {
        let tenant_id = StringUuid::new_v4();
        let mut mock = MockRolePermissionRepository::new();
        mock.expect_find_for_role().returning(move |_, role| {
            Ok(vec![
                row(tenant_id, role, "/settings/roles", false),
                row(tenant_id, role, "/attendance", true),
                row(tenant_id, role, "/employees", true),
            ])
        });

        let service = RbacService::new(Arc::new(mock), None);
        let pages = service
            .accessible_pages(AccessScope::Tenant(tenant_id), "Manager")
            .await
            .unwrap();

        assert_eq!(pages, vec!["/employees", "/attendance"]);
    }

    #[tokio::test]
    async fn test_replace_rejects_unknown_page() {
        let mut mock = MockRolePermissionRepository::new();
        mock.expect_replace_role_matrix().never();

        let service = RbacService::new(Arc::new(mock), None);
        let result = service
            .replace_role_matrix(
                AccessScope::Tenant(StringUuid::new_v4()),
                ReplaceRoleMatrixInput {
                    role_name: "Manager".to_string(),
                    pages: vec![PageFlags {
                        page_path: "/not-a-page".to_string(),
                        can_access: true,
                        can_view: true,
                        can_create: false,
                        can_edit: false,
                        can_delete: false,
                    }],
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_find_flags_returns_matching_row() {
        let tenant_id = StringUuid::new_v4();
        let mut mock = MockRolePermissionRepository::new();
        mock.expect_find_for_role()
            .with(eq(AccessScope::Tenant(tenant_id)), eq("Manager"))
            .returning(move |_, role| Ok(vec![row(tenant_id, role, "/employees", true)]));

        let service = RbacService::new(Arc::new(mock), None);
        let flags = service
            .find_flags(AccessScope::Tenant(tenant_id), "Manager", "/employees")
            .await
            .unwrap();
        assert!(flags.is_some());

        let missing = service
            .find_flags(AccessScope::Tenant(tenant_id), "Manager", "/billing")
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
