//! Role-permission matrix repository
//!
//! All methods are tenant-scoped; the matrix has no platform-level rows.

use crate::domain::{AccessScope, PageFlags, RolePermission, StringUuid, UpsertRolePermissionInput};
use crate::error::Result;
use async_trait::async_trait;
use sqlx::MySqlPool;

const PERMISSION_COLUMNS: &str = "id, tenant_id, role_name, page_path, can_access, can_view, \
     can_create, can_edit, can_delete, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RolePermissionRepository: Send + Sync {
    /// Insert or update a single (role, page) row
    async fn upsert(&self, scope: AccessScope, input: &UpsertRolePermissionInput) -> Result<RolePermission>;
    /// Replace a role's entire matrix atomically
    async fn replace_role_matrix(
        &self,
        scope: AccessScope,
        role_name: &str,
        pages: &[PageFlags],
    ) -> Result<Vec<RolePermission>>;
    async fn find_for_role(&self, scope: AccessScope, role_name: &str) -> Result<Vec<RolePermission>>;
    async fn find_one(
        &self,
        scope: AccessScope,
        role_name: &str,
        page_path: &str,
    ) -> Result<Option<RolePermission>>;
    async fn list_all(&self, scope: AccessScope) -> Result<Vec<RolePermission>>;
    async fn delete_role(&self, scope: AccessScope, role_name: &str) -> Result<u64>;
    async fn delete_all_for_tenant(&self, tenant_id: StringUuid) -> Result<u64>;
}

pub struct RolePermissionRepositoryImpl {
    pool: MySqlPool,
}

impl RolePermissionRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn upsert_row(
        tx: &mut sqlx::Transaction<'_, sqlx::MySql>,
        tenant_id: StringUuid,
        role_name: &str,
        page: &PageFlags,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO role_permissions
                (id, tenant_id, role_name, page_path, can_access, can_view, can_create, can_edit, can_delete, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, NOW(), NOW())
            ON DUPLICATE KEY UPDATE
                can_access = VALUES(can_access),
                can_view = VALUES(can_view),
                can_create = VALUES(can_create),
                can_edit = VALUES(can_edit),
                can_delete = VALUES(can_delete),
                updated_at = NOW()
            "#,
        )
        .bind(StringUuid::new_v4())
        .bind(tenant_id)
        .bind(role_name)
        .bind(&page.page_path)
        .bind(page.can_access)
        .bind(page.can_view)
        .bind(page.can_create)
        .bind(page.can_edit)
        .bind(page.can_delete)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl RolePermissionRepository for RolePermissionRepositoryImpl {
    async fn upsert(&self, scope: AccessScope, input: &UpsertRolePermissionInput) -> Result<RolePermission> {
        let tenant_id = scope.require_tenant()?;

        let mut tx = self.pool.begin().await?;
        let page = PageFlags {
            page_path: input.page_path.clone(),
            can_access: input.can_access,
            can_view: input.can_view,
            can_create: input.can_create,
            can_edit: input.can_edit,
            can_delete: input.can_delete,
        };
        Self::upsert_row(&mut tx, tenant_id, &input.role_name, &page).await?;
        tx.commit().await?;

        let row = sqlx::query_as::<_, RolePermission>(&format!(
            "SELECT {} FROM role_permissions WHERE tenant_id = ? AND role_name = ? AND page_path = ?",
            PERMISSION_COLUMNS
        ))
        .bind(tenant_id)
        .bind(&input.role_name)
        .bind(&input.page_path)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn replace_role_matrix(
        &self,
        scope: AccessScope,
        role_name: &str,
        pages: &[PageFlags],
    ) -> Result<Vec<RolePermission>> {
        let tenant_id = scope.require_tenant()?;

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM role_permissions WHERE tenant_id = ? AND role_name = ?")
            .bind(tenant_id)
            .bind(role_name)
            .execute(&mut *tx)
            .await?;

        for page in pages {
            Self::upsert_row(&mut tx, tenant_id, role_name, page).await?;
        }

        tx.commit().await?;

        self.find_for_role(scope, role_name).await
    }

    async fn find_for_role(&self, scope: AccessScope, role_name: &str) -> Result<Vec<RolePermission>> {
        let tenant_id = scope.require_tenant()?;

        let rows = sqlx::query_as::<_, RolePermission>(&format!(
            "SELECT {} FROM role_permissions WHERE tenant_id = ? AND role_name = ? ORDER BY page_path ASC",
            PERMISSION_COLUMNS
        ))
        .bind(tenant_id)
        .bind(role_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_one(
        &self,
        scope: AccessScope,
        role_name: &str,
        page_path: &str,
    ) -> Result<Option<RolePermission>> {
        let tenant_id = scope.require_tenant()?;

        let row = sqlx::query_as::<_, RolePermission>(&format!(
            "SELECT {} FROM role_permissions WHERE tenant_id = ? AND role_name = ? AND page_path = ?",
            PERMISSION_COLUMNS
        ))
        .bind(tenant_id)
        .bind(role_name)
        .bind(page_path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_all(&self, scope: AccessScope) -> Result<Vec<RolePermission>> {
        let tenant_id = scope.require_tenant()?;

        let rows = sqlx::query_as::<_, RolePermission>(&format!(
            "SELECT {} FROM role_permissions WHERE tenant_id = ? ORDER BY role_name ASC, page_path ASC",
            PERMISSION_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn delete_role(&self, scope: AccessScope, role_name: &str) -> Result<u64> {
        let tenant_id = scope.require_tenant()?;

        let result = sqlx::query("DELETE FROM role_permissions WHERE tenant_id = ? AND role_name = ?")
            .bind(tenant_id)
            .bind(role_name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_all_for_tenant(&self, tenant_id: StringUuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM role_permissions WHERE tenant_id = ?")
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
