//! JWT token verification
//!
//! The pipeline only consumes verification; token creation exists for
//! tooling and tests. Supports HS256 by default and RS256 when PEM keys
//! are configured, mirroring how the identity service signs tokens.

use crate::config::JwtConfig;
use crate::domain::{AuthenticatedUser, UserRole};
use crate::error::{AppError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Access token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID, decimal string)
    pub sub: String,
    /// Email
    pub email: String,
    /// Platform role: SUPER_ADMIN, TENANT_ADMIN or EDITOR
    pub role: String,
    /// Tenant the user belongs to; absent for platform-level accounts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
    /// Issuer
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    /// Build the request-scoped user from verified claims.
    pub fn into_user(self) -> Result<AuthenticatedUser> {
        let id: i64 = self
            .sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid user ID in token".to_string()))?;
        let role: UserRole = self
            .role
            .parse()
            .map_err(|_| AppError::Unauthorized("Unknown role in token".to_string()))?;
        Ok(AuthenticatedUser {
            id,
            email: self.email,
            role,
            tenant_id: self.tenant_id,
        })
    }
}

/// JWT verifier
#[derive(Clone)]
pub struct JwtVerifier {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtVerifier {
    pub fn new(config: JwtConfig) -> Self {
        let algorithm = if config.private_key_pem.is_some() || config.public_key_pem.is_some() {
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
    /// default 60 seconds, so tokens expire promptly while still tolerating
    /// minor clock skew.
    fn strict_validation(&self) -> Validation {
        let mut v = Validation::new(self.algorithm);
        v.leeway = 5;
        v.validate_aud = false;
        v.set_issuer(&[&self.config.issuer]);
        v
    }

    /// Verify an access token and return its claims.
    pub fn verify(&self, token: &str) -> Result<AccessClaims> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.strict_validation())?;
        Ok(data.claims)
    }

    /// Create an access token. Used by tooling and tests; issuance flows
    /// live in the identity service, not here.
    pub fn create_token(
        &self,
        user_id: i64,
        email: &str,
        role: UserRole,
        tenant_id: Option<i64>,
    ) -> Result<String> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            tenant_id,
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.config.access_token_ttl_secs)).timestamp(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?;
        Ok(token)
    }
}
