//! Authentication guard
//!
//! First link in the chain. Verifies the bearer token and publishes the
//! [`AuthenticatedUser`](crate::domain::AuthenticatedUser) into the guard
//! context for the guards behind it. Token issuance happens in the
//! identity service; this side only verifies.

use crate::error::{AppError, Result};
use crate::guard::{Guard, GuardContext};
use crate::jwt::JwtVerifier;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use std::sync::Arc;

pub struct AuthGuard {
    verifier: Arc<JwtVerifier>,
}

impl AuthGuard {
    pub fn new(verifier: Arc<JwtVerifier>) -> Self {
        Self { verifier }
    }
}

/// Extract and validate a Bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing authorization token".to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid authorization header encoding".to_string()))?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("Authorization header must use Bearer scheme".to_string())
    })
}

#[async_trait::async_trait]
impl Guard for AuthGuard {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn check(&self, ctx: &mut GuardContext<'_>) -> Result<()> {
        if ctx.policy.public {
            return Ok(());
        }

        let token = bearer_token(ctx.headers)?;
        let claims = self
            .verifier
            .verify(token)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;
        ctx.user = Some(claims.into_user()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::domain::UserRole;
    use crate::guard::test_support::ContextFixture;
    use crate::guard::RoutePolicy;

    fn verifier() -> Arc<JwtVerifier> {
        Arc::new(JwtVerifier::new(JwtConfig {
            secret: "test-secret-key-for-jwt-signing-must-be-long".to_string(),
            issuer: "https://sitefab.test".to_string(),
            access_token_ttl_secs: 3600,
            private_key_pem: None,
            public_key_pem: None,
        }))
    }

    #[tokio::test]
    async fn test_public_route_allows_without_token() {
        let guard = AuthGuard::new(verifier());
        let mut fixture = ContextFixture {
            policy: RoutePolicy::public(),
            ..ContextFixture::default()
        };
        let mut ctx = fixture.ctx();
        guard.check(&mut ctx).await.unwrap();
        assert!(ctx.user.is_none());
    }

    #[tokio::test]
    async fn test_missing_token_is_401() {
        let guard = AuthGuard::new(verifier());
        let mut fixture = ContextFixture::default();
        let mut ctx = fixture.ctx();
        let err = guard.check(&mut ctx).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_wrong_scheme_is_401() {
        let guard = AuthGuard::new(verifier());
        let mut fixture = ContextFixture::default();
        fixture
            .headers
            .insert(AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        let mut ctx = fixture.ctx();
        assert!(guard.check(&mut ctx).await.is_err());
    }

    #[tokio::test]
    async fn test_valid_token_populates_user() {
        let verifier = verifier();
        let token = verifier
            .create_token(42, "admin@acme.com", UserRole::TenantAdmin, Some(7))
            .unwrap();

        let guard = AuthGuard::new(Arc::clone(&verifier));
        let mut fixture = ContextFixture::default();
        fixture
            .headers
            .insert(AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
        let mut ctx = fixture.ctx();
        guard.check(&mut ctx).await.unwrap();

        let user = ctx.user.unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.tenant_id, Some(7));
    }

    #[tokio::test]
    async fn test_garbage_token_is_401() {
        let guard = AuthGuard::new(verifier());
        let mut fixture = ContextFixture::default();
        fixture
            .headers
            .insert(AUTHORIZATION, "Bearer not.a.token".parse().unwrap());
        let mut ctx = fixture.ctx();
        let err = guard.check(&mut ctx).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
