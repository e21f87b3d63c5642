//! Application state shared across handlers and workers

use crate::cache::CacheManager;
use crate::config::Config;
use crate::jwt::JwtManager;
use crate::repository::{
    AlertRepositoryImpl, AttendanceRepositoryImpl, AuditRepositoryImpl, DepartmentRepositoryImpl,
    EmployeeRepositoryImpl, LeaveRepositoryImpl, PositionRepositoryImpl,
    RolePermissionRepositoryImpl, SubscriptionRepositoryImpl, TenantRepositoryImpl,
    UserRepositoryImpl, WebhookEventRepositoryImpl,
};
use crate::service::{
    AttendanceService, AuthService, BillingService, DirectoryService, EmployeeService,
    LeaveService, RbacService, TenantService,
};
use sqlx::MySqlPool;
use std::sync::Arc;

pub type AppTenantService = TenantService<
    TenantRepositoryImpl,
    UserRepositoryImpl,
    SubscriptionRepositoryImpl,
    RolePermissionRepositoryImpl,
    EmployeeRepositoryImpl,
    DepartmentRepositoryImpl,
    PositionRepositoryImpl,
    AttendanceRepositoryImpl,
    LeaveRepositoryImpl,
>;
pub type AppAuthService = AuthService<UserRepositoryImpl, TenantRepositoryImpl>;
pub type AppRbacService = RbacService<RolePermissionRepositoryImpl>;
pub type AppEmployeeService =
    EmployeeService<EmployeeRepositoryImpl, DepartmentRepositoryImpl, PositionRepositoryImpl>;
pub type AppDirectoryService = DirectoryService<DepartmentRepositoryImpl, PositionRepositoryImpl>;
pub type AppAttendanceService = AttendanceService<AttendanceRepositoryImpl, EmployeeRepositoryImpl>;
pub type AppLeaveService = LeaveService<LeaveRepositoryImpl, EmployeeRepositoryImpl>;
pub type AppBillingService = BillingService<
    WebhookEventRepositoryImpl,
    SubscriptionRepositoryImpl,
    TenantRepositoryImpl,
    AlertRepositoryImpl,
>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: MySqlPool,
    pub jwt_manager: JwtManager,
    pub cache_manager: CacheManager,
    pub tenant_repo: Arc<TenantRepositoryImpl>,
    pub audit_repo: Arc<AuditRepositoryImpl>,
    pub tenant_service: Arc<AppTenantService>,
    pub auth_service: Arc<AppAuthService>,
    pub rbac_service: Arc<AppRbacService>,
    pub employee_service: Arc<AppEmployeeService>,
    pub directory_service: Arc<AppDirectoryService>,
    pub attendance_service: Arc<AppAttendanceService>,
    pub leave_service: Arc<AppLeaveService>,
    pub billing_service: Arc<AppBillingService>,
}

impl AppState {
    pub fn new(config: Config, db_pool: MySqlPool, cache_manager: CacheManager) -> Self {
        let jwt_manager = JwtManager::new(config.jwt.clone());

        let tenant_repo = Arc::new(TenantRepositoryImpl::new(db_pool.clone()));
        let user_repo = Arc::new(UserRepositoryImpl::new(db_pool.clone()));
        let subscription_repo = Arc::new(SubscriptionRepositoryImpl::new(db_pool.clone()));
        let role_permission_repo = Arc::new(RolePermissionRepositoryImpl::new(db_pool.clone()));
        let employee_repo = Arc::new(EmployeeRepositoryImpl::new(db_pool.clone()));
        let department_repo = Arc::new(DepartmentRepositoryImpl::new(db_pool.clone()));
        let position_repo = Arc::new(PositionRepositoryImpl::new(db_pool.clone()));
        let attendance_repo = Arc::new(AttendanceRepositoryImpl::new(db_pool.clone()));
        let leave_repo = Arc::new(LeaveRepositoryImpl::new(db_pool.clone()));
        let webhook_event_repo = Arc::new(WebhookEventRepositoryImpl::new(db_pool.clone()));
        let alert_repo = Arc::new(AlertRepositoryImpl::new(db_pool.clone()));
        let audit_repo = Arc::new(AuditRepositoryImpl::new(db_pool.clone()));

        let tenant_service = Arc::new(TenantService::new(
            tenant_repo.clone(),
            user_repo.clone(),
            subscription_repo.clone(),
            role_permission_repo.clone(),
            employee_repo.clone(),
            department_repo.clone(),
            position_repo.clone(),
            attendance_repo.clone(),
            leave_repo.clone(),
            Some(cache_manager.clone()),
            config.lifecycle.clone(),
        ));
        let auth_service = Arc::new(AuthService::new(
            user_repo.clone(),
            tenant_repo.clone(),
            jwt_manager.clone(),
            config.jwt.access_token_ttl_secs,
        ));
        let rbac_service = Arc::new(RbacService::new(
            role_permission_repo.clone(),
            Some(cache_manager.clone()),
        ));
        let employee_service = Arc::new(EmployeeService::new(
            employee_repo.clone(),
            department_repo.clone(),
            position_repo.clone(),
        ));
        let directory_service = Arc::new(DirectoryService::new(
            department_repo.clone(),
            position_repo.clone(),
        ));
        let attendance_service = Arc::new(AttendanceService::new(
            attendance_repo.clone(),
            employee_repo.clone(),
        ));
        let leave_service = Arc::new(LeaveService::new(leave_repo.clone(), employee_repo.clone()));
        let billing_service = Arc::new(BillingService::new(
            webhook_event_repo,
            subscription_repo,
            tenant_repo.clone(),
            alert_repo,
            Some(cache_manager.clone()),
            config.billing.webhook_secret.clone(),
        ));

        Self {
            config: Arc::new(config),
            db_pool,
            jwt_manager,
            cache_manager,
            tenant_repo,
            audit_repo,
            tenant_service,
            auth_service,
            rbac_service,
            employee_service,
            directory_service,
            attendance_service,
            leave_service,
            billing_service,
        }
    }

    /// Readiness probe: (database ok, cache ok)
    pub async fn check_ready(&self) -> (bool, bool) {
        let db_ok = sqlx::query("SELECT 1").execute(&self.db_pool).await.is_ok();
        let cache_ok = self.cache_manager.ping().await;
        (db_ok, cache_ok)
    }
}
