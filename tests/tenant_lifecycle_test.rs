//! Tenant lifecycle integration tests: signup, provisioning, and the
//! suspend/cancel/delete path.

use peopleops_core::config::LifecycleConfig;
use peopleops_core::domain::{AccessScope, SignupInput, TenantStatus, TENANT_ADMIN_ROLE};
use peopleops_core::repository::{
    AttendanceRepositoryImpl, DepartmentRepositoryImpl, EmployeeRepositoryImpl,
    LeaveRepositoryImpl, PositionRepositoryImpl, RolePermissionRepositoryImpl,
    SubscriptionRepositoryImpl, TenantRepository, TenantRepositoryImpl, UserRepository,
    UserRepositoryImpl,
};
use peopleops_core::service::TenantService;
use sqlx::MySqlPool;
use std::sync::Arc;

mod common;

type TestTenantService = TenantService<
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

fn tenant_service(pool: &MySqlPool) -> TestTenantService {
    TenantService::new(
        Arc::new(TenantRepositoryImpl::new(pool.clone())),
        Arc::new(UserRepositoryImpl::new(pool.clone())),
        Arc::new(SubscriptionRepositoryImpl::new(pool.clone())),
        Arc::new(RolePermissionRepositoryImpl::new(pool.clone())),
        Arc::new(EmployeeRepositoryImpl::new(pool.clone())),
        Arc::new(DepartmentRepositoryImpl::new(pool.clone())),
        Arc::new(PositionRepositoryImpl::new(pool.clone())),
        Arc::new(AttendanceRepositoryImpl::new(pool.clone())),
        Arc::new(LeaveRepositoryImpl::new(pool.clone())),
        None,
        LifecycleConfig::default(),
    )
}

fn signup_input(domain: &str) -> SignupInput {
    SignupInput {
        company_name: "Acme Corp".to_string(),
        domain: domain.to_string(),
        admin_email: format!("admin@{}", domain),
        admin_name: "Ada Admin".to_string(),
        admin_password: "correct horse battery".to_string(),
        plan_code: None,
    }
}

fn unique_domain(prefix: &str) -> String {
    format!("{}-{}.example.com", prefix, uuid::Uuid::new_v4().simple())
}

#[tokio::test]
async fn test_signup_starts_provisioning_with_inactive_admin() {
    let pool = match common::get_test_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping test: could not connect to database: {}", e);
            return;
        }
    };
    common::setup_database(&pool).await.unwrap();

    let service = tenant_service(&pool);
    let domain = unique_domain("signup");

    let tenant = service.signup(signup_input(&domain)).await.unwrap();
    assert_eq!(tenant.status, TenantStatus::Provisioning);
    assert_eq!(tenant.domain, domain);

    // Admin user exists but cannot log in yet
    let users = UserRepositoryImpl::new(pool.clone());
    let admin = users
        .find_by_email(Some(tenant.id), &tenant.admin_email)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(admin.role, TENANT_ADMIN_ROLE);
    assert!(!admin.is_active);

    // A trial subscription was opened on the default plan
    let subs = SubscriptionRepositoryImpl::new(pool.clone());
    use peopleops_core::repository::SubscriptionRepository;
    let sub = subs.find_live_by_tenant(tenant.id).await.unwrap().unwrap();
    assert!(sub.trial_ends_at.is_some());
}

#[tokio::test]
async fn test_duplicate_domain_rejected() {
    let pool = match common::get_test_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping test: could not connect to database: {}", e);
            return;
        }
    };
    common::setup_database(&pool).await.unwrap();

    let service = tenant_service(&pool);
    let domain = unique_domain("dup");

    service.signup(signup_input(&domain)).await.unwrap();
    let result = service.signup(signup_input(&domain)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_provisioning_seeds_matrix_and_activates() {
    let pool = match common::get_test_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping test: could not connect to database: {}", e);
            return;
        }
    };
    common::setup_database(&pool).await.unwrap();

    let service = tenant_service(&pool);
    let domain = unique_domain("prov");
    let tenant = service.signup(signup_input(&domain)).await.unwrap();

    let activated = service.provision_pending(100).await.unwrap();
    assert!(activated >= 1);

    let refreshed = service.get_tenant(tenant.id).await.unwrap();
    assert_eq!(refreshed.status, TenantStatus::Active);

    // Admin role has a full matrix row for every known page
    use peopleops_core::domain::KNOWN_PAGES;
    use peopleops_core::repository::RolePermissionRepository;
    let perms = RolePermissionRepositoryImpl::new(pool.clone());
    let matrix = perms
        .find_for_role(AccessScope::Tenant(tenant.id), TENANT_ADMIN_ROLE)
        .await
        .unwrap();
    assert_eq!(matrix.len(), KNOWN_PAGES.len());

    // Admin user can now log in
    let users = UserRepositoryImpl::new(pool.clone());
    let admin = users
        .find_by_email(Some(tenant.id), &tenant.admin_email)
        .await
        .unwrap()
        .unwrap();
    assert!(admin.is_active);
}

#[tokio::test]
async fn test_suspend_cancel_delete_path() {
    let pool = match common::get_test_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping test: could not connect to database: {}", e);
            return;
        }
    };
    common::setup_database(&pool).await.unwrap();

    let service = tenant_service(&pool);
    let domain = unique_domain("life");
    let tenant = service.signup(signup_input(&domain)).await.unwrap();
    service.provision_pending(100).await.unwrap();

    let suspended = service.suspend(tenant.id).await.unwrap();
    assert_eq!(suspended.status, TenantStatus::Suspended);
    assert!(suspended.suspended_at.is_some());

    // Deleting a suspended tenant is refused
    assert!(service.delete(tenant.id).await.is_err());

    let canceled = service.cancel(tenant.id).await.unwrap();
    assert_eq!(canceled.status, TenantStatus::Canceled);
    assert!(canceled.canceled_at.is_some());

    let deleted = service.delete(tenant.id).await.unwrap();
    assert_eq!(deleted.status, TenantStatus::Deleted);

    // Tombstone row survives, child rows are gone
    let tenants = TenantRepositoryImpl::new(pool.clone());
    assert!(tenants.find_by_id(tenant.id).await.unwrap().is_some());
    let users = UserRepositoryImpl::new(pool.clone());
    assert!(users
        .find_by_email(Some(tenant.id), &tenant.admin_email)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_invalid_transition_rejected() {
    let pool = match common::get_test_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping test: could not connect to database: {}", e);
            return;
        }
    };
    common::setup_database(&pool).await.unwrap();

    let service = tenant_service(&pool);
    let domain = unique_domain("inv");
    let tenant = service.signup(signup_input(&domain)).await.unwrap();

    // Provisioning tenants cannot be suspended
    assert!(service.suspend(tenant.id).await.is_err());
}
