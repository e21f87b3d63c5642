//! Tenant business logic: signup, lifecycle transitions, provisioning,
//! and end-of-life cleanup.

use crate::cache::CacheManager;
use crate::config::LifecycleConfig;
use crate::domain::{
    AccessScope, PageFlags, SignupInput, StringUuid, SubscriptionStatus, Tenant, TenantStatus,
    UpdateTenantInput, KNOWN_PAGES, TENANT_ADMIN_ROLE,
};
use crate::error::{AppError, Result};
use crate::repository::{
    AttendanceRepository, DepartmentRepository, EmployeeRepository, LeaveRepository,
    NewSubscription, NewUser, PositionRepository, RolePermissionRepository,
    SubscriptionRepository, TenantRepository, UserRepository,
};
use crate::service::auth::hash_password;
use chrono::{Duration, Utc};
use std::sync::Arc;
use validator::Validate;

/// Role seeded alongside Admin for ordinary staff accounts
const MEMBER_ROLE: &str = "Member";

pub struct TenantService<T, U, S, R, E, D, P, A, L>
where
    T: TenantRepository,
    U: UserRepository,
    S: SubscriptionRepository,
    R: RolePermissionRepository,
    E: EmployeeRepository,
    D: DepartmentRepository,
    P: PositionRepository,
    A: AttendanceRepository,
    L: LeaveRepository,
{
    tenants: Arc<T>,
    users: Arc<U>,
    subscriptions: Arc<S>,
    role_permissions: Arc<R>,
    employees: Arc<E>,
    departments: Arc<D>,
    positions: Arc<P>,
    attendance: Arc<A>,
    leave: Arc<L>,
    cache_manager: Option<CacheManager>,
    lifecycle: LifecycleConfig,
}

impl<T, U, S, R, E, D, P, A, L> TenantService<T, U, S, R, E, D, P, A, L>
where
    T: TenantRepository,
    U: UserRepository,
    S: SubscriptionRepository,
    R: RolePermissionRepository,
    E: EmployeeRepository,
    D: DepartmentRepository,
    P: PositionRepository,
    A: AttendanceRepository,
    L: LeaveRepository,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenants: Arc<T>,
        users: Arc<U>,
        subscriptions: Arc<S>,
        role_permissions: Arc<R>,
        employees: Arc<E>,
        departments: Arc<D>,
        positions: Arc<P>,
        attendance: Arc<A>,
        leave: Arc<L>,
        cache_manager: Option<CacheManager>,
        lifecycle: LifecycleConfig,
    ) -> Self {
        Self {
            tenants,
            users,
            subscriptions,
            role_permissions,
            employees,
            departments,
            positions,
            attendance,
            leave,
            cache_manager,
            lifecycle,
        }
    }

    // ==================== Signup ====================

    /// Register a new tenant. The tenant starts in Provisioning with an
    /// inactive admin user and a trial subscription; the provisioner
    /// worker finishes setup and activates it.
    pub async fn signup(&self, input: SignupInput) -> Result<Tenant> {
        input.validate()?;

        if self.tenants.find_by_domain(&input.domain).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Domain {} is already registered",
                input.domain
            )));
        }

        // Resolve the plan before any row is written; a bad plan code
        // must not leave an orphan tenant reserving the domain.
        let plan = match input.plan_code.as_deref() {
            Some(code) => self
                .subscriptions
                .find_plan_by_code(code)
                .await?
                .ok_or_else(|| AppError::BadRequest(format!("Unknown plan: {}", code)))?,
            None => self
                .subscriptions
                .find_default_plan()
                .await?
                .ok_or_else(|| AppError::Internal(anyhow::anyhow!("No default plan configured")))?,
        };

        let password_hash = hash_password(&input.admin_password)?;

        let tenant = self.tenants.create(&input).await?;

        self.users
            .create(&NewUser {
                tenant_id: Some(tenant.id),
                email: input.admin_email.clone(),
                name: input.admin_name.clone(),
                password_hash,
                role: TENANT_ADMIN_ROLE.to_string(),
                is_active: false,
            })
            .await?;

        let now = Utc::now();
        let trial_end = now + Duration::days(self.lifecycle.trial_days);
        self.subscriptions
            .open(&NewSubscription {
                tenant_id: tenant.id,
                plan_id: plan.id,
                status: SubscriptionStatus::Trialing,
                current_period_start: now,
                current_period_end: trial_end,
                trial_ends_at: Some(trial_end),
                provider_subscription_id: None,
            })
            .await?;

        tracing::info!(tenant_id = %tenant.id, domain = %tenant.domain, "Tenant signed up");
        Ok(tenant)
    }

    // ==================== Queries ====================

    pub async fn get_tenant(&self, id: StringUuid) -> Result<Tenant> {
        self.tenants
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tenant {} not found", id)))
    }

    pub async fn list_tenants(&self, offset: i64, limit: i64) -> Result<(Vec<Tenant>, i64)> {
        let tenants = self.tenants.list(offset, limit).await?;
        let total = self.tenants.count().await?;
        Ok((tenants, total))
    }

    pub async fn update_profile(&self, id: StringUuid, input: UpdateTenantInput) -> Result<Tenant> {
        input.validate()?;

        let before = self.get_tenant(id).await?;
        if let Some(domain) = input.domain.as_deref() {
            if domain != before.domain {
                if self.tenants.find_by_domain(domain).await?.is_some() {
                    return Err(AppError::Conflict(format!(
                        "Domain {} is already registered",
                        domain
                    )));
                }
            }
        }

        let updated = self.tenants.update_profile(id, &input).await?;
        self.invalidate(&before).await;
        Ok(updated)
    }

    // ==================== Lifecycle transitions ====================

    pub async fn suspend(&self, id: StringUuid) -> Result<Tenant> {
        self.transition(id, TenantStatus::Suspended).await
    }

    pub async fn resume(&self, id: StringUuid) -> Result<Tenant> {
        self.transition(id, TenantStatus::Active).await
    }

    pub async fn cancel(&self, id: StringUuid) -> Result<Tenant> {
        let tenant = self.transition(id, TenantStatus::Canceled).await?;
        // Canceled tenants no longer log in
        self.users.deactivate_tenant_users(id).await?;
        if let Some(sub) = self.subscriptions.find_live_by_tenant(id).await? {
            self.subscriptions
                .set_status(sub.id, SubscriptionStatus::Canceled)
                .await?;
        }
        Ok(tenant)
    }

    /// Permanently remove a canceled tenant's data. The tenant row
    /// itself stays behind as a Deleted tombstone.
    pub async fn delete(&self, id: StringUuid) -> Result<Tenant> {
        let tenant = self.get_tenant(id).await?;
        if !tenant.status.can_transition_to(TenantStatus::Deleted) {
            return Err(AppError::Conflict(format!(
                "Cannot delete a tenant in {} state",
                tenant.status
            )));
        }

        self.attendance.delete_all_for_tenant(id).await?;
        self.leave.delete_all_for_tenant(id).await?;
        self.employees.delete_all_for_tenant(id).await?;
        self.departments.delete_all_for_tenant(id).await?;
        self.positions.delete_all_for_tenant(id).await?;
        self.role_permissions.delete_all_for_tenant(id).await?;
        self.subscriptions.delete_all_for_tenant(id).await?;
        self.users.delete_tenant_users(id).await?;

        let deleted = self.tenants.set_status(id, TenantStatus::Deleted).await?;
        self.invalidate(&tenant).await;

        tracing::info!(tenant_id = %id, "Tenant data purged");
        Ok(deleted)
    }

    async fn transition(&self, id: StringUuid, next: TenantStatus) -> Result<Tenant> {
        let tenant = self.get_tenant(id).await?;
        if !tenant.status.can_transition_to(next) {
            return Err(AppError::Conflict(format!(
                "Cannot move tenant from {} to {}",
                tenant.status, next
            )));
        }

        let updated = self.tenants.set_status(id, next).await?;
        self.invalidate(&tenant).await;

        tracing::info!(tenant_id = %id, from = %tenant.status, to = %next, "Tenant transitioned");
        Ok(updated)
    }

    // ==================== Provisioning ====================

    /// Finish setup for tenants still in Provisioning. Returns how many
    /// were activated; failures are logged and retried on the next pass.
    pub async fn provision_pending(&self, limit: i64) -> Result<usize> {
        let pending = self
            .tenants
            .list_by_status(TenantStatus::Provisioning, limit)
            .await?;

        let mut activated = 0;
        for tenant in pending {
            match self.provision_one(&tenant).await {
                Ok(()) => activated += 1,
                Err(e) => {
                    tracing::error!(tenant_id = %tenant.id, error = %e, "Provisioning failed");
                }
            }
        }
        Ok(activated)
    }

    async fn provision_one(&self, tenant: &Tenant) -> Result<()> {
        // A tenant without a live subscription must not go Active;
        // billing enforcement keys off the subscription row.
        if self
            .subscriptions
            .find_live_by_tenant(tenant.id)
            .await?
            .is_none()
        {
            return Err(AppError::Conflict(format!(
                "Tenant {} has no live subscription",
                tenant.id
            )));
        }

        let scope = AccessScope::Tenant(tenant.id);

        if self.departments.list(scope).await?.is_empty() {
            self.departments
                .create(
                    scope,
                    &crate::domain::CreateDepartmentInput {
                        name: "General".to_string(),
                        description: None,
                    },
                )
                .await?;
        }

        for (role, pages) in default_matrix() {
            self.role_permissions
                .replace_role_matrix(scope, role, &pages)
                .await?;
        }

        if let Some(admin) = self
            .users
            .find_by_email(Some(tenant.id), &tenant.admin_email)
            .await?
        {
            if !admin.is_active {
                self.users.set_active(admin.id, true).await?;
            }
        }

        self.transition(tenant.id, TenantStatus::Active).await?;
        tracing::info!(tenant_id = %tenant.id, "Tenant provisioned");
        Ok(())
    }

    // ==================== Grace period enforcement ====================

    /// Cancel tenants whose suspension outlived the grace period.
    pub async fn cancel_expired_suspensions(&self) -> Result<usize> {
        let cutoff = Utc::now() - Duration::days(self.lifecycle.suspension_grace_days);
        let expired = self.tenants.list_suspended_before(cutoff).await?;

        let mut canceled = 0;
        for tenant in expired {
            match self.cancel(tenant.id).await {
                Ok(_) => {
                    canceled += 1;
                    tracing::info!(tenant_id = %tenant.id, "Suspension grace period expired");
                }
                Err(e) => {
                    tracing::error!(tenant_id = %tenant.id, error = %e, "Grace period cancel failed");
                }
            }
        }
        Ok(canceled)
    }

    /// Purge tenants that stayed canceled past the retention window.
    pub async fn purge_expired_cancellations(&self) -> Result<usize> {
        let cutoff = Utc::now() - Duration::days(self.lifecycle.retention_days);
        let expired = self.tenants.list_canceled_before(cutoff).await?;

        let mut purged = 0;
        for tenant in expired {
            match self.delete(tenant.id).await {
                Ok(_) => purged += 1,
                Err(e) => {
                    tracing::error!(tenant_id = %tenant.id, error = %e, "Retention purge failed");
                }
            }
        }
        Ok(purged)
    }

    async fn invalidate(&self, tenant: &Tenant) {
        if let Some(cache) = &self.cache_manager {
            let _ = cache.invalidate_tenant(tenant).await;
        }
    }
}

/// Matrix seeded for every new tenant: Admin gets everything, Member
/// gets day-to-day self-service pages.
fn default_matrix() -> Vec<(&'static str, Vec<PageFlags>)> {
    let admin = KNOWN_PAGES
        .iter()
        .map(|page| PageFlags {
            page_path: page.to_string(),
            can_access: true,
            can_view: true,
            can_create: true,
            can_edit: true,
            can_delete: true,
        })
        .collect();

    let member = ["/attendance", "/leave-requests"]
        .iter()
        .map(|page| PageFlags {
            page_path: page.to_string(),
            can_access: true,
            can_view: true,
            can_create: true,
            can_edit: false,
            can_delete: false,
        })
        .collect();

    vec![(TENANT_ADMIN_ROLE, admin), (MEMBER_ROLE, member)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::attendance::MockAttendanceRepository;
    use crate::repository::department::MockDepartmentRepository;
    use crate::repository::employee::MockEmployeeRepository;
    use crate::repository::leave::MockLeaveRepository;
    use crate::repository::position::MockPositionRepository;
    use crate::repository::role_permission::MockRolePermissionRepository;
    use crate::repository::subscription::MockSubscriptionRepository;
    use crate::repository::tenant::MockTenantRepository;
    use crate::repository::user::MockUserRepository;

    type MockService = TenantService<
        MockTenantRepository,
        MockUserRepository,
        MockSubscriptionRepository,
        MockRolePermissionRepository,
        MockEmployeeRepository,
        MockDepartmentRepository,
        MockPositionRepository,
        MockAttendanceRepository,
        MockLeaveRepository,
    >;

    struct Mocks {
        tenants: MockTenantRepository,
        users: MockUserRepository,
        subscriptions: MockSubscriptionRepository,
        role_permissions: MockRolePermissionRepository,
        employees: MockEmployeeRepository,
        departments: MockDepartmentRepository,
        positions: MockPositionRepository,
        attendance: MockAttendanceRepository,
        leave: MockLeaveRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                tenants: MockTenantRepository::new(),
                users: MockUserRepository::new(),
                subscriptions: MockSubscriptionRepository::new(),
                role_permissions: MockRolePermissionRepository::new(),
                employees: MockEmployeeRepository::new(),
                departments: MockDepartmentRepository::new(),
                positions: MockPositionRepository::new(),
                attendance: MockAttendanceRepository::new(),
                leave: MockLeaveRepository::new(),
            }
        }

        fn into_service(self) -> MockService {
            TenantService::new(
                Arc::new(self.tenants),
                Arc::new(self.users),
                Arc::new(self.subscriptions),
                Arc::new(self.role_permissions),
                Arc::new(self.employees),
                Arc::new(self.departments),
                Arc::new(self.positions),
                Arc::new(self.attendance),
                Arc::new(self.leave),
                None,
                LifecycleConfig::default(),
            )
        }
    }

    fn tenant_in(status: TenantStatus) -> Tenant {
        Tenant {
            status,
            ..Tenant::default()
        }
    }

    fn live_subscription(tenant_id: StringUuid) -> crate::domain::Subscription {
        let now = Utc::now();
        crate::domain::Subscription {
            id: StringUuid::new_v4(),
            tenant_id,
            plan_id: StringUuid::new_v4(),
            status: SubscriptionStatus::Trialing,
            current_period_start: now,
            current_period_end: now + Duration::days(14),
            trial_ends_at: Some(now + Duration::days(14)),
            provider_subscription_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn signup_input(plan_code: Option<&str>) -> SignupInput {
        SignupInput {
            company_name: "Acme Corp".to_string(),
            domain: "acme.example.com".to_string(),
            admin_email: "admin@acme.example.com".to_string(),
            admin_name: "Ada Admin".to_string(),
            admin_password: "correct-horse-battery".to_string(),
            plan_code: plan_code.map(|c| c.to_string()),
        }
    }

    #[tokio::test]
    async fn test_suspend_requires_active() {
        let mut mocks = Mocks::new();
        let tenant = tenant_in(TenantStatus::Provisioning);
        let id = tenant.id;
        mocks
            .tenants
            .expect_find_by_id()
            .returning(move |_| Ok(Some(tenant.clone())));
        mocks.tenants.expect_set_status().never();

        let service = mocks.into_service();
        let result = service.suspend(id).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_resume_moves_suspended_to_active() {
        let mut mocks = Mocks::new();
        let tenant = tenant_in(TenantStatus::Suspended);
        let id = tenant.id;
        let resumed = Tenant {
            status: TenantStatus::Active,
            ..tenant.clone()
        };

        mocks
            .tenants
            .expect_find_by_id()
            .returning(move |_| Ok(Some(tenant.clone())));
        mocks
            .tenants
            .expect_set_status()
            .withf(move |tid, status| *tid == id && *status == TenantStatus::Active)
            .returning(move |_, _| Ok(resumed.clone()));

        let service = mocks.into_service();
        let result = service.resume(id).await.unwrap();
        assert_eq!(result.status, TenantStatus::Active);
    }

    #[tokio::test]
    async fn test_cancel_deactivates_users_and_subscription() {
        let mut mocks = Mocks::new();
        let tenant = tenant_in(TenantStatus::Active);
        let id = tenant.id;
        let canceled = Tenant {
            status: TenantStatus::Canceled,
            ..tenant.clone()
        };

        mocks
            .tenants
            .expect_find_by_id()
            .returning(move |_| Ok(Some(tenant.clone())));
        mocks
            .tenants
            .expect_set_status()
            .returning(move |_, _| Ok(canceled.clone()));
        mocks
            .users
            .expect_deactivate_tenant_users()
            .times(1)
            .returning(|_| Ok(3));
        mocks
            .subscriptions
            .expect_find_live_by_tenant()
            .returning(|_| Ok(None));

        let service = mocks.into_service();
        let result = service.cancel(id).await.unwrap();
        assert_eq!(result.status, TenantStatus::Canceled);
    }

    #[tokio::test]
    async fn test_delete_refuses_active_tenant() {
        let mut mocks = Mocks::new();
        let tenant = tenant_in(TenantStatus::Active);
        let id = tenant.id;
        mocks
            .tenants
            .expect_find_by_id()
            .returning(move |_| Ok(Some(tenant.clone())));
        mocks.employees.expect_delete_all_for_tenant().never();

        let service = mocks.into_service();
        let result = service.delete(id).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_purges_canceled_tenant() {
        let mut mocks = Mocks::new();
        let tenant = tenant_in(TenantStatus::Canceled);
        let id = tenant.id;
        let deleted = Tenant {
            status: TenantStatus::Deleted,
            ..tenant.clone()
        };

        mocks
            .tenants
            .expect_find_by_id()
            .returning(move |_| Ok(Some(tenant.clone())));
        mocks.attendance.expect_delete_all_for_tenant().times(1).returning(|_| Ok(0));
        mocks.leave.expect_delete_all_for_tenant().times(1).returning(|_| Ok(0));
        mocks.employees.expect_delete_all_for_tenant().times(1).returning(|_| Ok(5));
        mocks.departments.expect_delete_all_for_tenant().times(1).returning(|_| Ok(1));
        mocks.positions.expect_delete_all_for_tenant().times(1).returning(|_| Ok(2));
        mocks.role_permissions.expect_delete_all_for_tenant().times(1).returning(|_| Ok(10));
        mocks.subscriptions.expect_delete_all_for_tenant().times(1).returning(|_| Ok(1));
        mocks.users.expect_delete_tenant_users().times(1).returning(|_| Ok(4));
        mocks
            .tenants
            .expect_set_status()
            .withf(move |tid, status| *tid == id && *status == TenantStatus::Deleted)
            .returning(move |_, _| Ok(deleted.clone()));

        let service = mocks.into_service();
        let result = service.delete(id).await.unwrap();
        assert_eq!(result.status, TenantStatus::Deleted);
    }

    #[tokio::test]
    async fn test_provision_one_seeds_and_activates() {
        let mut mocks = Mocks::new();
        let tenant = tenant_in(TenantStatus::Provisioning);
        let id = tenant.id;
        let lookup = tenant.clone();
        let activated = Tenant {
            status: TenantStatus::Active,
            ..tenant.clone()
        };

        mocks
            .tenants
            .expect_list_by_status()
            .returning(move |_, _| Ok(vec![tenant.clone()]));
        mocks
            .tenants
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lookup.clone())));
        mocks
            .subscriptions
            .expect_find_live_by_tenant()
            .returning(move |tid| Ok(Some(live_subscription(tid))));
        mocks.departments.expect_list().returning(|_| Ok(vec![]));
        mocks
            .departments
            .expect_create()
            .times(1)
            .returning(|scope, input| {
                let now = Utc::now();
                Ok(crate::domain::Department {
                    id: StringUuid::new_v4(),
                    tenant_id: scope.require_tenant()?,
                    name: input.name.clone(),
                    description: input.description.clone(),
                    created_at: now,
                    updated_at: now,
                })
            });
        mocks
            .role_permissions
            .expect_replace_role_matrix()
            .times(2)
            .returning(|_, _, _| Ok(vec![]));
        mocks.users.expect_find_by_email().returning(|_, _| Ok(None));
        mocks
            .tenants
            .expect_set_status()
            .withf(move |tid, status| *tid == id && *status == TenantStatus::Active)
            .returning(move |_, _| Ok(activated.clone()));

        let service = mocks.into_service();
        let count = service.provision_pending(10).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_signup_unknown_plan_writes_nothing() {
        let mut mocks = Mocks::new();
        mocks.tenants.expect_find_by_domain().returning(|_| Ok(None));
        mocks
            .subscriptions
            .expect_find_plan_by_code()
            .withf(|code| code == "no-such-plan")
            .returning(|_| Ok(None));
        mocks.tenants.expect_create().never();
        mocks.users.expect_create().never();
        mocks.subscriptions.expect_open().never();

        let service = mocks.into_service();
        let result = service.signup(signup_input(Some("no-such-plan"))).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_provision_waits_for_live_subscription() {
        let mut mocks = Mocks::new();
        let tenant = tenant_in(TenantStatus::Provisioning);
        mocks
            .tenants
            .expect_list_by_status()
            .returning(move |_, _| Ok(vec![tenant.clone()]));
        mocks
            .subscriptions
            .expect_find_live_by_tenant()
            .returning(|_| Ok(None));
        mocks.role_permissions.expect_replace_role_matrix().never();
        mocks.tenants.expect_set_status().never();

        let service = mocks.into_service();
        // Left in Provisioning for the next pass, not activated
        let count = service.provision_pending(10).await.unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_default_matrix_covers_known_pages_for_admin() {
        let matrix = default_matrix();
        let (role, pages) = &matrix[0];
        assert_eq!(*role, TENANT_ADMIN_ROLE);
        assert_eq!(pages.len(), KNOWN_PAGES.len());
        assert!(pages.iter().all(|p| p.can_access && p.can_delete));
    }
}
