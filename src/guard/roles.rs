//! Role guard
//!
//! Checks the authenticated user's role against the route's declared
//! allow-list. Routes without an allow-list accept any authenticated
//! role.

use crate::error::{AppError, Result};
use crate::guard::{Guard, GuardContext};

pub struct RolesGuard;

#[async_trait::async_trait]
impl Guard for RolesGuard {
    fn name(&self) -> &'static str {
        "roles"
    }

    async fn check(&self, ctx: &mut GuardContext<'_>) -> Result<()> {
        if ctx.policy.public {
            return Ok(());
        }
        let Some(allowed) = &ctx.policy.allowed_roles else {
            return Ok(());
        };
        // AuthGuard runs first; without a user there is nothing to check
        let Some(user) = &ctx.user else {
            return Ok(());
        };
        if allowed.contains(&user.role) {
            Ok(())
        } else {
            Err(AppError::InsufficientRole(format!(
                "role {} is not allowed on this route",
                user.role
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::guard::test_support::{user, ContextFixture};
    use crate::guard::RoutePolicy;

    #[tokio::test]
    async fn test_role_in_allow_list_passes() {
        let mut fixture = ContextFixture {
            policy: RoutePolicy::roles([UserRole::TenantAdmin]),
            user: Some(user(1, UserRole::TenantAdmin, Some(7))),
            ..ContextFixture::default()
        };
        let mut ctx = fixture.ctx();
        RolesGuard.check(&mut ctx).await.unwrap();
    }

    #[tokio::test]
    async fn test_role_outside_allow_list_is_denied() {
        let mut fixture = ContextFixture {
            policy: RoutePolicy::roles([UserRole::SuperAdmin, UserRole::TenantAdmin]),
            user: Some(user(2, UserRole::Editor, Some(7))),
            ..ContextFixture::default()
        };
        let mut ctx = fixture.ctx();
        let err = RolesGuard.check(&mut ctx).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientRole(_)));
    }

    #[tokio::test]
    async fn test_no_allow_list_accepts_any_role() {
        let mut fixture = ContextFixture {
            user: Some(user(3, UserRole::Editor, Some(7))),
            ..ContextFixture::default()
        };
        let mut ctx = fixture.ctx();
        RolesGuard.check(&mut ctx).await.unwrap();
    }

    #[tokio::test]
    async fn test_public_route_skips_role_check() {
        let mut fixture = ContextFixture {
            policy: RoutePolicy {
                public: true,
                allowed_roles: Some(vec![UserRole::SuperAdmin]),
            },
            ..ContextFixture::default()
        };
        let mut ctx = fixture.ctx();
        RolesGuard.check(&mut ctx).await.unwrap();
    }
}
