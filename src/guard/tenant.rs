//! Tenant isolation guard
//!
//! Enforces that a tenant-scoped user only acts inside the tenant context
//! the middleware attached. Authentication itself is AuthGuard's job; an
//! absent user means the route was public or AuthGuard already rejected,
//! so this guard defers. The isolation rules:
//!
//! - SUPER_ADMIN operates in any context, including platform context
//! - platform context (no tenant) is off-limits to everyone else
//! - a user without a tenant of their own cannot act in tenant context
//! - a user may never act inside another tenant's context

use crate::error::{AppError, Result};
use crate::guard::{Guard, GuardContext};

pub struct TenantGuard;

#[async_trait::async_trait]
impl Guard for TenantGuard {
    fn name(&self) -> &'static str {
        "tenant"
    }

    async fn check(&self, ctx: &mut GuardContext<'_>) -> Result<()> {
        if ctx.policy.public {
            return Ok(());
        }
        let Some(user) = &ctx.user else {
            return Ok(());
        };
        if user.is_super_admin() {
            return Ok(());
        }

        let Some(request_tenant_id) = ctx.request_tenant_id() else {
            return Err(AppError::ReservedDomainAccess);
        };
        let Some(user_tenant_id) = user.tenant_id else {
            return Err(AppError::Forbidden(
                "User is not associated with any tenant".to_string(),
            ));
        };
        if user_tenant_id != request_tenant_id {
            return Err(AppError::CrossTenantDenied {
                user_tenant_id,
                request_tenant_id,
            });
        }
        Ok(())
    }
}
