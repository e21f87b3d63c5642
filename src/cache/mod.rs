//! Redis cache layer
//!
//! Caches the two lookups on the hot path of every request: tenant
//! resolution by domain, and the role-permission matrix consulted by the
//! authorization policy.

use crate::config::RedisConfig;
use crate::domain::{RolePermission, StringUuid, Tenant};
use crate::error::{AppError, Result};
use redis::{aio::ConnectionManager, AsyncCommands};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Cache key prefixes
mod keys {
    pub const TENANT_BY_DOMAIN: &str = "peopleops:tenant_domain";
    pub const TENANT_BY_ID: &str = "peopleops:tenant";
    pub const ROLE_MATRIX: &str = "peopleops:role_matrix";
}

/// Default TTLs
mod ttl {
    pub const TENANT_SECS: u64 = 60; // short: status changes must propagate fast
    pub const ROLE_MATRIX_SECS: u64 = 300; // 5 minutes
}

/// Cache manager for Redis operations
#[derive(Clone)]
pub struct CacheManager {
    conn: ConnectionManager,
}

impl CacheManager {
    /// Create a new cache manager
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create Redis client: {}", e)))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { conn })
    }

    /// Health probe used by the readiness endpoint
    pub async fn ping(&self) -> bool {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .is_ok()
    }

    /// Get a value from cache
    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;

        match value {
            Some(v) => {
                let parsed = serde_json::from_str(&v)
                    .map_err(|e| AppError::Internal(anyhow::anyhow!("Cache deserialize error: {}", e)))?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Set a value in cache with TTL
    async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let serialized = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Cache serialize error: {}", e)))?;

        let _: () = conn.set_ex(key, serialized, ttl.as_secs()).await?;
        Ok(())
    }

    /// Delete a key from cache
    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    /// Delete keys matching a pattern
    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(pattern)
            .query_async(&mut conn)
            .await?;

        if !keys.is_empty() {
            conn.del::<_, ()>(keys).await?;
        }
        Ok(())
    }

    // ==================== Tenant Cache ====================

    pub async fn get_tenant_by_domain(&self, domain: &str) -> Result<Option<Tenant>> {
        let key = format!("{}:{}", keys::TENANT_BY_DOMAIN, domain);
        self.get(&key).await
    }

    pub async fn get_tenant_by_id(&self, tenant_id: StringUuid) -> Result<Option<Tenant>> {
        let key = format!("{}:{}", keys::TENANT_BY_ID, tenant_id);
        self.get(&key).await
    }

    /// Cache a tenant under both its id and domain keys
    pub async fn set_tenant(&self, tenant: &Tenant) -> Result<()> {
        let ttl = Duration::from_secs(ttl::TENANT_SECS);
        let id_key = format!("{}:{}", keys::TENANT_BY_ID, tenant.id);
        let domain_key = format!("{}:{}", keys::TENANT_BY_DOMAIN, tenant.domain);
        self.set(&id_key, tenant, ttl).await?;
        self.set(&domain_key, tenant, ttl).await
    }

    /// Invalidate a tenant after any status or profile change
    pub async fn invalidate_tenant(&self, tenant: &Tenant) -> Result<()> {
        let id_key = format!("{}:{}", keys::TENANT_BY_ID, tenant.id);
        let domain_key = format!("{}:{}", keys::TENANT_BY_DOMAIN, tenant.domain);
        self.delete(&id_key).await?;
        self.delete(&domain_key).await
    }

    // ==================== Role Matrix Cache ====================

    pub async fn get_role_matrix(
        &self,
        tenant_id: StringUuid,
        role_name: &str,
    ) -> Result<Option<Vec<RolePermission>>> {
        let key = format!("{}:{}:{}", keys::ROLE_MATRIX, tenant_id, role_name);
        self.get(&key).await
    }

    pub async fn set_role_matrix(
        &self,
        tenant_id: StringUuid,
        role_name: &str,
        matrix: &[RolePermission],
    ) -> Result<()> {
        let key = format!("{}:{}:{}", keys::ROLE_MATRIX, tenant_id, role_name);
        self.set(&key, &matrix.to_vec(), Duration::from_secs(ttl::ROLE_MATRIX_SECS))
            .await
    }

    /// Invalidate one role's matrix, or the whole tenant's when `None`
    pub async fn invalidate_role_matrix(
        &self,
        tenant_id: StringUuid,
        role_name: Option<&str>,
    ) -> Result<()> {
        match role_name {
            Some(role) => {
                let key = format!("{}:{}:{}", keys::ROLE_MATRIX, tenant_id, role);
                self.delete(&key).await
            }
            None => {
                let pattern = format!("{}:{}:*", keys::ROLE_MATRIX, tenant_id);
                self.delete_pattern(&pattern).await
            }
        }
    }
}
