//! Request authorization guards
//!
//! Four guards evaluated as an explicit ordered pipeline after the tenant
//! context middleware has run:
//!
//! AuthGuard -> RolesGuard -> TenantGuard -> SubscriptionGuard
//!
//! The ordering is a real dependency, not a registration accident:
//! TenantGuard and SubscriptionGuard assume AuthGuard already populated
//! the authenticated user, and each defers (allows) when it is absent
//! rather than re-deriving it. The [`GuardPipeline`] type makes that
//! order visible in code; the first denial is terminal.

pub mod auth;
pub mod roles;
pub mod subscription;
pub mod tenant;

pub use auth::AuthGuard;
pub use roles::RolesGuard;
pub use subscription::SubscriptionGuard;
pub use tenant::TenantGuard;

use crate::domain::{AuthenticatedUser, UserRole};
use crate::error::{AppError, Result};
use crate::tenancy::RequestTenantContext;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

/// Per-route authorization policy.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    /// Public routes pass every guard unconditionally.
    pub public: bool,
    /// Roles allowed on this route; `None` means any authenticated role.
    pub allowed_roles: Option<Vec<UserRole>>,
}

impl RoutePolicy {
    pub fn public() -> Self {
        Self {
            public: true,
            allowed_roles: None,
        }
    }

    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn roles(roles: impl IntoIterator<Item = UserRole>) -> Self {
        Self {
            public: false,
            allowed_roles: Some(roles.into_iter().collect()),
        }
    }
}

/// Longest-prefix-match registry of route policies.
///
/// Routes with no matching rule require authentication with any role,
/// which is the safe default for an API surface.
#[derive(Debug, Clone)]
pub struct RoutePolicyRegistry {
    rules: Vec<(String, RoutePolicy)>,
    admin_prefix: String,
}

impl RoutePolicyRegistry {
    pub fn new(admin_prefix: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            admin_prefix: admin_prefix.into(),
        }
    }

    pub fn route(mut self, prefix: impl Into<String>, policy: RoutePolicy) -> Self {
        self.rules.push((prefix.into(), policy));
        self
    }

    pub fn policy_for(&self, path: &str) -> RoutePolicy {
        self.rules
            .iter()
            .filter(|(prefix, _)| path.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, policy)| policy.clone())
            .unwrap_or_default()
    }

    /// Whether the path is under the administrative prefix that the
    /// subscription guard watches.
    pub fn is_admin_path(&self, path: &str) -> bool {
        path.starts_with(&self.admin_prefix)
    }
}

/// Everything a guard may look at for one request.
pub struct GuardContext<'a> {
    pub path: &'a str,
    pub headers: &'a HeaderMap,
    pub policy: &'a RoutePolicy,
    pub is_admin_route: bool,
    pub tenant: Option<&'a RequestTenantContext>,
    /// Populated by AuthGuard; later guards read it, never rebuild it.
    pub user: Option<AuthenticatedUser>,
}

impl GuardContext<'_> {
    /// The tenant the request resolved to, if any. Absent context and
    /// platform context both count as "no tenant".
    pub fn request_tenant_id(&self) -> Option<i64> {
        self.tenant.and_then(|t| t.tenant_id)
    }
}

/// One link in the authorization chain.
#[async_trait::async_trait]
pub trait Guard: Send + Sync {
    fn name(&self) -> &'static str;
    async fn check(&self, ctx: &mut GuardContext<'_>) -> Result<()>;
}

/// Ordered chain of guards; the order given at construction is the order
/// of evaluation.
pub struct GuardPipeline {
    guards: Vec<Arc<dyn Guard>>,
}

impl GuardPipeline {
    pub fn new(guards: Vec<Arc<dyn Guard>>) -> Self {
        Self { guards }
    }

    pub async fn evaluate(&self, ctx: &mut GuardContext<'_>) -> Result<()> {
        for guard in &self.guards {
            if let Err(err) = guard.check(ctx).await {
                debug!(guard = guard.name(), path = ctx.path, "request denied");
                return Err(err);
            }
        }
        Ok(())
    }
}

/// Shared state for the guard middleware.
#[derive(Clone)]
pub struct GuardLayerState {
    pub pipeline: Arc<GuardPipeline>,
    pub policies: Arc<RoutePolicyRegistry>,
}

/// Run the guard pipeline for one request, then hand the authenticated
/// user to the handler through request extensions.
pub async fn guard_middleware(
    State(state): State<GuardLayerState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let path = request.uri().path().to_string();
    let policy = state.policies.policy_for(&path);
    let is_admin_route = state.policies.is_admin_path(&path);
    let tenant = request.extensions().get::<RequestTenantContext>().cloned();

    let user = {
        let mut ctx = GuardContext {
            path: &path,
            headers: request.headers(),
            policy: &policy,
            is_admin_route,
            tenant: tenant.as_ref(),
            user: None,
        };
        state.pipeline.evaluate(&mut ctx).await?;
        ctx.user
    };

    if let Some(user) = user {
        request.extensions_mut().insert(user);
    }
    Ok(next.run(request).await)
}
