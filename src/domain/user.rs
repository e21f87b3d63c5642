//! User domain model

use super::common::StringUuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Role name reserved for platform administrators. SuperAdmin users
/// carry no tenant_id; the pairing is enforced at creation time.
pub const SUPER_ADMIN_ROLE: &str = "SuperAdmin";

/// Default role granted to the tenant's first user during provisioning
pub const TENANT_ADMIN_ROLE: &str = "Admin";

/// User entity. `tenant_id` is NULL exactly for platform (SuperAdmin) users.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: StringUuid,
    pub tenant_id: Option<StringUuid>,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_super_admin(&self) -> bool {
        self.tenant_id.is_none() && self.role == SUPER_ADMIN_ROLE
    }
}

/// Input for creating a user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 64))]
    pub role: String,
}

/// Input for login
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(tenant_id: Option<StringUuid>, role: &str) -> User {
        let now = Utc::now();
        User {
            id: StringUuid::new_v4(),
            tenant_id,
            email: "a@b.test".to_string(),
            name: "A".to_string(),
            password_hash: String::new(),
            role: role.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_super_admin_requires_null_tenant() {
        assert!(user(None, SUPER_ADMIN_ROLE).is_super_admin());
        assert!(!user(Some(StringUuid::new_v4()), SUPER_ADMIN_ROLE).is_super_admin());
        assert!(!user(None, TENANT_ADMIN_ROLE).is_super_admin());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let mut u = user(None, SUPER_ADMIN_ROLE);
        u.password_hash = "secret-hash".to_string();
        let json = serde_json::to_string(&u).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
