//! Request-scoped tenant context
//!
//! Created exactly once per request by the tenant-context middleware and
//! read by guards and handlers through request extensions. Never
//! persisted and never reconstructed downstream.

use crate::domain::Tenant;
use serde::{Deserialize, Serialize};

/// Which resolution strategy produced a tenant binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedBy {
    /// Matched an active `TenantDomain` row
    CustomDomain,
    /// Matched the legacy `domain` field or a `<slug>.sitefab.app` host
    Subdomain,
    /// Bound directly through the `X-Tenant-Id` header
    Header,
    /// Reserved platform hostname; request runs in platform context
    Reserved,
}

impl std::fmt::Display for ResolvedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedBy::CustomDomain => write!(f, "custom_domain"),
            ResolvedBy::Subdomain => write!(f, "subdomain"),
            ResolvedBy::Header => write!(f, "header"),
            ResolvedBy::Reserved => write!(f, "reserved"),
        }
    }
}

/// Tenant binding attached to one request.
///
/// `tenant_id == None` is a meaningful state: the request runs in
/// platform/super-admin context, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct RequestTenantContext {
    pub tenant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<Tenant>,
    pub resolved_by: ResolvedBy,
}

impl RequestTenantContext {
    /// Context for a request bound to a tenant.
    pub fn for_tenant(tenant: Tenant, resolved_by: ResolvedBy) -> Self {
        Self {
            tenant_id: Some(tenant.id),
            tenant: Some(tenant),
            resolved_by,
        }
    }

    /// Platform context for reserved-domain traffic.
    pub fn platform() -> Self {
        Self {
            tenant_id: None,
            tenant: None,
            resolved_by: ResolvedBy::Reserved,
        }
    }

    pub fn is_platform(&self) -> bool {
        self.tenant_id.is_none()
    }
}
