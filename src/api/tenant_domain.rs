//! Tenant domain management endpoints
//!
//! All routes live under the administrative prefix, so the full guard
//! chain (including the subscription guard) has already run by the time
//! a handler executes. Handlers scope every operation to the tenant the
//! pipeline resolved; a SUPER_ADMIN operating from a reserved domain
//! names the target tenant explicitly.

use crate::domain::{AddDomainInput, AuthenticatedUser, TenantDomain};
use crate::error::{AppError, Result};
use crate::repository::{TenantDomainRepository, TenantRepository};
use crate::server::AppState;
use crate::service::DomainHealth;
use crate::tenancy::RequestTenantContext;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TenantScopeQuery {
    pub tenant_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct HealthCheckRequest {
    pub domain: String,
}

/// Pick the tenant an administrative call operates on: the resolved
/// request tenant wins; a SUPER_ADMIN in platform context may name one;
/// anyone else falls back to their own tenant.
fn resolve_scope(
    user: &AuthenticatedUser,
    tenant: Option<&RequestTenantContext>,
    query: Option<i64>,
) -> Result<i64> {
    if let Some(id) = tenant.and_then(|t| t.tenant_id) {
        return Ok(id);
    }
    if user.is_super_admin() {
        if let Some(id) = query {
            return Ok(id);
        }
    }
    user.tenant_id
        .ok_or_else(|| AppError::BadRequest("no tenant scope for this request".to_string()))
}

fn current_user(user: Option<Extension<AuthenticatedUser>>) -> Result<AuthenticatedUser> {
    user.map(|Extension(user)| user)
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
}

/// GET /api/admin/domains
pub async fn list_domains<T, D>(
    State(state): State<AppState<T, D>>,
    tenant: Option<Extension<RequestTenantContext>>,
    user: Option<Extension<AuthenticatedUser>>,
    Query(query): Query<TenantScopeQuery>,
) -> Result<Json<Vec<TenantDomain>>>
where
    T: TenantRepository + 'static,
    D: TenantDomainRepository + 'static,
{
    let user = current_user(user)?;
    let tenant_id = resolve_scope(&user, tenant.as_deref(), query.tenant_id)?;
    let domains = state.domain_service.list(tenant_id).await?;
    Ok(Json(domains))
}

/// POST /api/admin/domains
pub async fn add_domain<T, D>(
    State(state): State<AppState<T, D>>,
    tenant: Option<Extension<RequestTenantContext>>,
    user: Option<Extension<AuthenticatedUser>>,
    Query(query): Query<TenantScopeQuery>,
    Json(input): Json<AddDomainInput>,
) -> Result<(StatusCode, Json<TenantDomain>)>
where
    T: TenantRepository + 'static,
    D: TenantDomainRepository + 'static,
{
    let user = current_user(user)?;
    let tenant_id = resolve_scope(&user, tenant.as_deref(), query.tenant_id)?;
    let created = state.domain_service.add_domain(tenant_id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/admin/domains/{id}
pub async fn remove_domain<T, D>(
    State(state): State<AppState<T, D>>,
    tenant: Option<Extension<RequestTenantContext>>,
    user: Option<Extension<AuthenticatedUser>>,
    Query(query): Query<TenantScopeQuery>,
    Path(domain_id): Path<i64>,
) -> Result<StatusCode>
where
    T: TenantRepository + 'static,
    D: TenantDomainRepository + 'static,
{
    let user = current_user(user)?;
    let tenant_id = resolve_scope(&user, tenant.as_deref(), query.tenant_id)?;
    state
        .domain_service
        .remove_domain(tenant_id, domain_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/domains/{id}/primary
pub async fn set_primary_domain<T, D>(
    State(state): State<AppState<T, D>>,
    tenant: Option<Extension<RequestTenantContext>>,
    user: Option<Extension<AuthenticatedUser>>,
    Query(query): Query<TenantScopeQuery>,
    Path(domain_id): Path<i64>,
) -> Result<StatusCode>
where
    T: TenantRepository + 'static,
    D: TenantDomainRepository + 'static,
{
    let user = current_user(user)?;
    let tenant_id = resolve_scope(&user, tenant.as_deref(), query.tenant_id)?;
    state
        .domain_service
        .set_primary(tenant_id, domain_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/domains/health-check
///
/// Probes a candidate hostname before the operator binds it.
pub async fn check_domain_health<T, D>(
    State(state): State<AppState<T, D>>,
    user: Option<Extension<AuthenticatedUser>>,
    Json(request): Json<HealthCheckRequest>,
) -> Result<Json<DomainHealth>>
where
    T: TenantRepository + 'static,
    D: TenantDomainRepository + 'static,
{
    current_user(user)?;
    let host = crate::tenancy::normalize_host(&request.domain);
    if host.is_empty() {
        return Err(AppError::BadRequest("domain must not be empty".to_string()));
    }
    let health = state.health_service.probe(&host).await;
    Ok(Json(health))
}
