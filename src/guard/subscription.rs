//! Subscription guard
//!
//! Administrative routes additionally require the resolved tenant's
//! subscription to be active. Everything else passes through untouched;
//! platform endpoints and SUPER_ADMIN are exempt. The status lookup is
//! the pipeline's optional second database round-trip.

use crate::error::{AppError, Result};
use crate::guard::{Guard, GuardContext};
use crate::repository::TenantRepository;
use std::sync::Arc;

const ACTIVE_SUBSCRIPTION: &str = "active";

pub struct SubscriptionGuard<R: TenantRepository> {
    tenants: Arc<R>,
}

impl<R: TenantRepository> SubscriptionGuard<R> {
    pub fn new(tenants: Arc<R>) -> Self {
        Self { tenants }
    }
}

#[async_trait::async_trait]
impl<R: TenantRepository> Guard for SubscriptionGuard<R> {
    fn name(&self) -> &'static str {
        "subscription"
    }

    async fn check(&self, ctx: &mut GuardContext<'_>) -> Result<()> {
        if !ctx.is_admin_route || ctx.policy.public {
            return Ok(());
        }
        let Some(user) = &ctx.user else {
            return Ok(());
        };
        if user.is_super_admin() {
            return Ok(());
        }
        let Some(tenant_id) = ctx.request_tenant_id() else {
            // global/platform endpoints carry no subscription
            return Ok(());
        };

        let status = self.tenants.subscription_status(tenant_id).await?;
        match status.as_deref() {
            Some(ACTIVE_SUBSCRIPTION) => Ok(()),
            _ => Err(AppError::SubscriptionRequired(format!(
                "tenant {} does not have an active subscription",
                tenant_id
            ))),
        }
    }
}
