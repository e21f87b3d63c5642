//! Tenant domain model and lifecycle state machine

use super::common::StringUuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Tenant lifecycle status
///
/// signup -> Provisioning -> Active -> Suspended -> Canceled -> Deleted
/// Transitions outside of `can_transition_to` are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    #[default]
    Provisioning,
    Active,
    Suspended,
    Canceled,
    Deleted,
}

impl TenantStatus {
    /// Whether the lifecycle state machine allows moving to `next`.
    pub fn can_transition_to(&self, next: TenantStatus) -> bool {
        use TenantStatus::*;
        matches!(
            (self, next),
            (Provisioning, Active)
                | (Provisioning, Canceled)
                | (Active, Suspended)
                | (Active, Canceled)
                | (Suspended, Active)
                | (Suspended, Canceled)
                | (Canceled, Deleted)
        )
    }

    /// Tenants in these states still serve requests (possibly restricted)
    pub fn is_servable(&self) -> bool {
        matches!(self, TenantStatus::Active | TenantStatus::Suspended)
    }
}

impl std::str::FromStr for TenantStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "provisioning" => Ok(TenantStatus::Provisioning),
            "active" => Ok(TenantStatus::Active),
            "suspended" => Ok(TenantStatus::Suspended),
            "canceled" => Ok(TenantStatus::Canceled),
            "deleted" => Ok(TenantStatus::Deleted),
            _ => Err(format!("Unknown tenant status: {}", s)),
        }
    }
}

impl std::fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TenantStatus::Provisioning => write!(f, "provisioning"),
            TenantStatus::Active => write!(f, "active"),
            TenantStatus::Suspended => write!(f, "suspended"),
            TenantStatus::Canceled => write!(f, "canceled"),
            TenantStatus::Deleted => write!(f, "deleted"),
        }
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for TenantStatus {
    fn decode(
        value: sqlx::mysql::MySqlValueRef<'r>,
    ) -> std::result::Result<Self, sqlx::error::BoxDynError> {
        let s: String = sqlx::Decode::<'r, sqlx::MySql>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl sqlx::Type<sqlx::MySql> for TenantStatus {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for TenantStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        let s = self.to_string();
        <&str as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&s.as_str(), buf)
    }
}

/// Tenant entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: StringUuid,
    pub name: String,
    /// Hostname the tenant is served under (used for Host-based resolution)
    pub domain: String,
    pub status: TenantStatus,
    pub admin_email: String,
    pub admin_name: String,
    pub suspended_at: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Tenant {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: StringUuid::new_v4(),
            name: String::new(),
            domain: String::new(),
            status: TenantStatus::default(),
            admin_email: String::new(),
            admin_name: String::new(),
            suspended_at: None,
            canceled_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for tenant signup
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupInput {
    #[validate(length(min = 1, max = 255))]
    pub company_name: String,
    #[validate(length(min = 1, max = 253), custom(function = "validate_domain"))]
    pub domain: String,
    #[validate(email)]
    pub admin_email: String,
    #[validate(length(min = 1, max = 255))]
    pub admin_name: String,
    #[validate(length(min = 8, max = 128))]
    pub admin_password: String,
    /// Plan to start the trial on; falls back to the default plan
    pub plan_code: Option<String>,
}

/// Input for updating tenant profile fields
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTenantInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 253), custom(function = "validate_domain"))]
    pub domain: Option<String>,
}

/// Validate hostname format (lowercase labels separated by dots)
fn validate_domain(domain: &str) -> Result<(), validator::ValidationError> {
    if DOMAIN_REGEX.is_match(domain) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_domain"))
    }
}

lazy_static::lazy_static! {
    pub static ref DOMAIN_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-z0-9]+(?:[.-][a-z0-9]+)*$").unwrap();
}
