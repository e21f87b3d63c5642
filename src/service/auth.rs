//! Authentication business logic

use crate::domain::{LoginInput, StringUuid, Tenant, TenantStatus, User};
use crate::error::{AppError, Result};
use crate::jwt::JwtManager;
use crate::middleware::AuthUser;
use crate::repository::{TenantRepository, UserRepository};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::Arc;
use validator::Validate;

/// Hash a password with Argon2id
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Successful login or impersonation result
#[derive(Debug, Clone, serde::Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub expires_in: i64,
}

pub struct AuthService<U: UserRepository, T: TenantRepository> {
    users: Arc<U>,
    tenants: Arc<T>,
    jwt: JwtManager,
    access_token_ttl_secs: i64,
}

impl<U: UserRepository, T: TenantRepository> AuthService<U, T> {
    pub fn new(users: Arc<U>, tenants: Arc<T>, jwt: JwtManager, access_token_ttl_secs: i64) -> Self {
        Self {
            users,
            tenants,
            jwt,
            access_token_ttl_secs,
        }
    }

    /// Log a user in within a tenant (or the platform when `tenant_id`
    /// is `None`). The failure mode never reveals whether the email exists.
    pub async fn login(
        &self,
        tenant_id: Option<StringUuid>,
        input: LoginInput,
    ) -> Result<(TokenPair, User)> {
        input.validate()?;

        let user = self
            .users
            .find_by_email(tenant_id, &input.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        if !user.is_active || !verify_password(&input.password, &user.password_hash) {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let token =
            self.jwt
                .create_access_token(user.id, &user.email, user.tenant_id, &user.role)?;

        Ok((
            TokenPair {
                access_token: token,
                expires_in: self.access_token_ttl_secs,
            },
            user,
        ))
    }

    /// Issue a short-lived impersonation token for a SuperAdmin to act
    /// as the named tenant's admin. The tenant must be servable.
    pub async fn impersonate(
        &self,
        super_admin: &AuthUser,
        tenant_id: StringUuid,
    ) -> Result<(TokenPair, Tenant)> {
        if !super_admin.is_super_admin() {
            return Err(AppError::Forbidden(
                "Only SuperAdmins may impersonate".to_string(),
            ));
        }

        let tenant = self
            .tenants
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tenant {} not found", tenant_id)))?;

        if tenant.status != TenantStatus::Active && tenant.status != TenantStatus::Suspended {
            return Err(AppError::Conflict(format!(
                "Tenant is {} and cannot be impersonated",
                tenant.status
            )));
        }

        let token = self.jwt.create_impersonation_token(
            super_admin.user_id,
            &super_admin.email,
            tenant_id,
        )?;

        Ok((
            TokenPair {
                access_token: token,
                expires_in: self.jwt.impersonation_ttl_secs(),
            },
            tenant,
        ))
    }
}
