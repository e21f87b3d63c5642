//! Configuration management for PeopleOps Core

use anyhow::{Context, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server host
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Redis configuration
    pub redis: RedisConfig,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Billing webhook configuration
    pub billing: BillingConfig,
    /// Tenant lifecycle configuration
    pub lifecycle: LifecycleConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub access_token_ttl_secs: i64,
    /// Impersonation tokens are deliberately short-lived
    pub impersonation_token_ttl_secs: i64,
    pub private_key_pem: Option<String>,
    pub public_key_pem: Option<String>,
}

/// Billing provider webhook settings
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Shared secret for verifying webhook signatures (HMAC-SHA256).
    /// When unset, verification is skipped; only for local development.
    pub webhook_secret: Option<String>,
}

/// Tenant lifecycle worker settings
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Interval between provisioner ticks, seconds
    pub provision_poll_secs: u64,
    /// Interval between grace-period enforcement ticks, seconds
    pub enforce_poll_secs: u64,
    /// Days a Suspended tenant is kept before cancellation
    pub suspension_grace_days: i64,
    /// Days a Canceled tenant is kept before soft deletion
    pub retention_days: i64,
    /// Trial length granted at signup, days
    pub trial_days: i64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            provision_poll_secs: 15,
            enforce_poll_secs: 3600,
            suspension_grace_days: 14,
            retention_days: 30,
            trial_days: 14,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid HTTP_PORT")?,
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").context("DATABASE_URL is required")?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .unwrap_or(2),
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").context("JWT_SECRET is required")?,
                issuer: env::var("JWT_ISSUER")
                    .unwrap_or_else(|_| "https://peopleops.local".to_string()),
                access_token_ttl_secs: env::var("JWT_ACCESS_TOKEN_TTL_SECS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .unwrap_or(3600),
                impersonation_token_ttl_secs: env::var("JWT_IMPERSONATION_TTL_SECS")
                    .unwrap_or_else(|_| "900".to_string())
                    .parse()
                    .unwrap_or(900),
                private_key_pem: env::var("JWT_PRIVATE_KEY")
                    .ok()
                    .map(|value| value.replace("\\n", "\n")),
                public_key_pem: env::var("JWT_PUBLIC_KEY")
                    .ok()
                    .map(|value| value.replace("\\n", "\n")),
            },
            billing: BillingConfig {
                webhook_secret: env::var("BILLING_WEBHOOK_SECRET").ok(),
            },
            lifecycle: LifecycleConfig {
                provision_poll_secs: env::var("LIFECYCLE_PROVISION_POLL_SECS")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse()
                    .unwrap_or(15),
                enforce_poll_secs: env::var("LIFECYCLE_ENFORCE_POLL_SECS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .unwrap_or(3600),
                suspension_grace_days: env::var("LIFECYCLE_SUSPENSION_GRACE_DAYS")
                    .unwrap_or_else(|_| "14".to_string())
                    .parse()
                    .unwrap_or(14),
                retention_days: env::var("LIFECYCLE_RETENTION_DAYS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
                trial_days: env::var("SIGNUP_TRIAL_DAYS")
                    .unwrap_or_else(|_| "14".to_string())
                    .parse()
                    .unwrap_or(14),
            },
        })
    }

    /// HTTP bind address
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_addr() {
        let config = Config {
            http_host: "127.0.0.1".to_string(),
            http_port: 9090,
            database: DatabaseConfig {
                url: "mysql://localhost/peopleops".to_string(),
                max_connections: 10,
                min_connections: 2,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
            },
            jwt: JwtConfig {
                secret: "secret".to_string(),
                issuer: "https://peopleops.local".to_string(),
                access_token_ttl_secs: 3600,
                impersonation_token_ttl_secs: 900,
                private_key_pem: None,
                public_key_pem: None,
            },
            billing: BillingConfig {
                webhook_secret: None,
            },
            lifecycle: LifecycleConfig::default(),
        };
        assert_eq!(config.http_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn test_lifecycle_defaults() {
        let lifecycle = LifecycleConfig::default();
        assert_eq!(lifecycle.suspension_grace_days, 14);
        assert_eq!(lifecycle.retention_days, 30);
    }
}
