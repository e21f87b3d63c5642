//! JWT token handling

use crate::config::JwtConfig;
use crate::domain::{StringUuid, TENANT_ADMIN_ROLE};
use crate::error::{AppError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Audience for all PeopleOps access tokens
const AUDIENCE: &str = "peopleops";

/// Access token claims. Platform (SuperAdmin) tokens carry no
/// `tenant_id`; impersonation tokens additionally carry the acting
/// SuperAdmin's user id in `act`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Email
    pub email: String,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Token type discriminator (prevents token confusion attacks)
    #[serde(default)]
    pub token_type: String,
    /// Tenant ID (absent for platform tokens)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Role within the tenant (or SuperAdmin for platform tokens)
    pub role: String,
    /// Actor claim: user id of the impersonating SuperAdmin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub act: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    pub fn is_impersonation(&self) -> bool {
        self.act.is_some()
    }
}

/// JWT token manager
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Self {
        let algorithm = if config.private_key_pem.is_some() {
            Algorithm::RS256
        } else {
            Algorithm::HS256
        };
        let encoding_key = match config.private_key_pem.as_ref() {
            Some(private_key) => EncodingKey::from_rsa_pem(private_key.as_bytes())
                .expect("Failed to load JWT private key"),
            None => EncodingKey::from_secret(config.secret.as_bytes()),
        };
        let decoding_key = match config.public_key_pem.as_ref() {
            Some(public_key) => DecodingKey::from_rsa_pem(public_key.as_bytes())
                .expect("Failed to load JWT public key"),
            None => match config.private_key_pem.as_ref() {
                Some(private_key) => DecodingKey::from_rsa_pem(private_key.as_bytes())
                    .expect("Failed to load JWT private key"),
                None => DecodingKey::from_secret(config.secret.as_bytes()),
            },
        };
        Self {
            config,
            encoding_key,
            decoding_key,
            algorithm,
        }
    }

    /// Create a Validation with a strict leeway (5 seconds) instead of the
    /// default 60 seconds, so impersonation tokens expire promptly.
    fn strict_validation(&self) -> Validation {
        let mut v = Validation::new(self.algorithm);
        v.leeway = 5;
        v.set_audience(&[AUDIENCE]);
        v
    }

    /// Create an access token for a regular or platform user
    pub fn create_access_token(
        &self,
        user_id: StringUuid,
        email: &str,
        tenant_id: Option<StringUuid>,
        role: &str,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.access_token_ttl_secs);

        let claims = AccessClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iss: self.config.issuer.clone(),
            aud: AUDIENCE.to_string(),
            token_type: "access".to_string(),
            tenant_id: tenant_id.map(|id| id.to_string()),
            role: role.to_string(),
            act: None,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        let header = Header::new(self.algorithm);
        encode(&header, &claims, &self.encoding_key).map_err(|e| AppError::Internal(e.into()))
    }

    /// Create a short-lived impersonation token scoped to `tenant_id`,
    /// acting as the tenant's admin role on behalf of `impersonator_id`.
    pub fn create_impersonation_token(
        &self,
        impersonator_id: StringUuid,
        impersonator_email: &str,
        tenant_id: StringUuid,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.impersonation_token_ttl_secs);

        let claims = AccessClaims {
            sub: impersonator_id.to_string(),
            email: impersonator_email.to_string(),
            iss: self.config.issuer.clone(),
            aud: AUDIENCE.to_string(),
            token_type: "access".to_string(),
            tenant_id: Some(tenant_id.to_string()),
            role: TENANT_ADMIN_ROLE.to_string(),
            act: Some(impersonator_id.to_string()),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        let header = Header::new(self.algorithm);
        encode(&header, &claims, &self.encoding_key).map_err(|e| AppError::Internal(e.into()))
    }

    /// Verify an access token and return its claims
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.strict_validation())?;
        if data.claims.token_type != "access" {
            return Err(AppError::Unauthorized("Invalid token type".to_string()));
        }
        Ok(data.claims)
    }

    /// Impersonation token TTL in seconds (exposed for API responses)
    pub fn impersonation_ttl_secs(&self) -> i64 {
        self.config.impersonation_token_ttl_secs
    }
}
