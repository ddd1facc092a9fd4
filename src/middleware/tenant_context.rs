//! Tenant context middleware
//!
//! Runs before the guard chain on every request. Decides whether the
//! route needs tenant resolution at all, extracts the tenant signal from
//! headers, invokes the resolver and attaches the resulting
//! [`RequestTenantContext`] to the request. Reserved-domain traffic is a
//! success (platform context), never a rejection.
//!
//! Resolution failures cross the HTTP boundary through an explicit
//! [`BoundaryPolicy`]: production collapses them to one generic 400 so
//! probing requests cannot enumerate tenants, development surfaces the
//! specific reason. Liveness failures keep their 403 in both modes.

use crate::config::Environment;
use crate::domain::TenantStatus;
use crate::error::{AppError, TenancyError};
use crate::repository::{TenantDomainRepository, TenantRepository};
use crate::tenancy::{
    normalize_host, DomainResolver, RequestTenantContext, ReservedDomainRegistry, ResolvedBy,
};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, warn};

/// Route prefixes that never carry tenant context: operational endpoints
/// and the deprecated public purge routes kept for old cron clients.
const EXEMPT_PREFIXES: &[&str] = &[
    "/health",
    "/ready",
    "/metrics",
    "/api/pages/purge-orphans",
    "/api/sections/purge-orphans",
];

/// Only API-shaped paths trigger resolution; anything else is static or
/// front-end serving and proceeds without tenant context.
const API_PREFIX: &str = "/api/";

/// Domain-bearing headers, in trust order.
const DOMAIN_HEADERS: &[&str] = &["x-tenant-host", "x-tenant-domain", "x-forwarded-host", "host"];

const TENANT_ID_HEADER: &str = "x-tenant-id";

/// How resolution failures are presented at the HTTP boundary.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryPolicy {
    production: bool,
}

impl BoundaryPolicy {
    pub fn new(environment: Environment) -> Self {
        Self {
            production: environment == Environment::Production,
        }
    }

    /// Map a resolution failure to its outward-facing error. The internal
    /// taxonomy is always logged; what the client sees depends on mode.
    pub fn map(&self, err: TenancyError) -> AppError {
        match err {
            TenancyError::Store(e) => e,
            TenancyError::TenantInactive(id) => {
                AppError::TenantInactive(format!("tenant {} is not active", id))
            }
            other => {
                if self.production {
                    warn!(reason = %other, "tenant resolution failed");
                    AppError::BadRequest("Unable to resolve tenant for request".to_string())
                } else {
                    AppError::BadRequest(other.to_string())
                }
            }
        }
    }
}

/// Shared state for the tenant context middleware.
pub struct TenantContextState<T: TenantRepository, D: TenantDomainRepository> {
    pub tenants: Arc<T>,
    pub resolver: Arc<DomainResolver<T, D>>,
    pub reserved: Arc<ReservedDomainRegistry>,
    pub boundary: BoundaryPolicy,
}

impl<T: TenantRepository, D: TenantDomainRepository> Clone for TenantContextState<T, D> {
    fn clone(&self) -> Self {
        Self {
            tenants: Arc::clone(&self.tenants),
            resolver: Arc::clone(&self.resolver),
            reserved: Arc::clone(&self.reserved),
            boundary: self.boundary,
        }
    }
}

/// Attach a [`RequestTenantContext`] to every request that needs one.
pub async fn tenant_context_middleware<T, D>(
    State(state): State<TenantContextState<T, D>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError>
where
    T: TenantRepository + 'static,
    D: TenantDomainRepository + 'static,
{
    let path = request.uri().path();
    if is_exempt(path) || !path.starts_with(API_PREFIX) {
        return Ok(next.run(request).await);
    }

    match resolve_context(&state, request.headers()).await {
        Ok(ctx) => {
            counter!(
                "sitefab_tenant_resolution_total",
                "outcome" => "resolved",
                "resolved_by" => ctx.resolved_by.to_string()
            )
            .increment(1);
            debug!(tenant_id = ?ctx.tenant_id, resolved_by = %ctx.resolved_by, "tenant context attached");
            request.extensions_mut().insert(ctx);
            Ok(next.run(request).await)
        }
        Err(err) => {
            counter!("sitefab_tenant_resolution_total", "outcome" => "failed").increment(1);
            Err(state.boundary.map(err))
        }
    }
}

fn is_exempt(path: &str) -> bool {
    EXEMPT_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Extract the tenant signal and resolve it.
///
/// Priority: explicit `X-Tenant-Id`, then the domain-bearing headers.
/// No signal at all is a client error, not platform context; platform
/// context is only ever entered through a reserved hostname.
async fn resolve_context<T, D>(
    state: &TenantContextState<T, D>,
    headers: &HeaderMap,
) -> Result<RequestTenantContext, TenancyError>
where
    T: TenantRepository,
    D: TenantDomainRepository,
{
    if let Some(raw) = headers.get(TENANT_ID_HEADER) {
        let value = raw
            .to_str()
            .map_err(|_| TenancyError::InvalidTenantHeader("not valid UTF-8".to_string()))?;
        let id: i64 = value.trim().parse().map_err(|_| {
            TenancyError::InvalidTenantHeader(format!("'{}' is not an integer", value))
        })?;

        let tenant = state
            .tenants
            .find_by_id(id)
            .await
            .map_err(TenancyError::Store)?
            .ok_or(TenancyError::TenantNotFound(id))?;
        if !tenant.is_active || tenant.status == TenantStatus::Suspended {
            return Err(TenancyError::TenantNotFound(id));
        }
        return Ok(RequestTenantContext::for_tenant(tenant, ResolvedBy::Header));
    }

    let Some(raw_host) = domain_signal(headers) else {
        return Err(TenancyError::MissingTenantSignal);
    };
    let host = normalize_host(&raw_host);

    if state.reserved.is_reserved(&host) {
        return Ok(RequestTenantContext::platform());
    }

    let (tenant, resolved_by) = state.resolver.resolve(&host).await?;
    // The resolver already filters on liveness; re-validate anyway so a
    // non-routable tenant can never slip through a future lookup path.
    if !tenant.is_routable() {
        return Err(TenancyError::TenantInactive(tenant.id));
    }
    Ok(RequestTenantContext::for_tenant(tenant, resolved_by))
}

fn domain_signal(headers: &HeaderMap) -> Option<String> {
    DOMAIN_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .map(|s| s.to_string())
        .next()
}
