//! Domain resolution
//!
//! Maps a normalized hostname to a tenant through three strategies, tried
//! in order, each only when the previous one yielded nothing:
//!
//! 1. the tenant's legacy `domain` field (treated as subdomain-level trust)
//! 2. an active, verified `TenantDomain` binding
//! 3. slug extraction from a `<slug>.sitefab.app` host
//!
//! Reserved hostnames fail before step 1 and never reach the store, even
//! when a tenant coincidentally shares the slug or domain. Uniqueness of
//! domains and slugs is the store's job; the resolver takes the first
//! match and does not deduplicate.

use crate::config::TenancyConfig;
use crate::domain::Tenant;
use crate::error::TenancyError;
use crate::repository::{TenantDomainRepository, TenantRepository};
use crate::tenancy::context::ResolvedBy;
use crate::tenancy::reserved::ReservedDomainRegistry;
use std::sync::Arc;
use tracing::debug;

pub struct DomainResolver<T: TenantRepository, D: TenantDomainRepository> {
    tenants: Arc<T>,
    tenant_domains: Arc<D>,
    reserved: Arc<ReservedDomainRegistry>,
    base_suffix: String,
    panel_suffix: String,
}

impl<T: TenantRepository, D: TenantDomainRepository> DomainResolver<T, D> {
    pub fn new(
        tenants: Arc<T>,
        tenant_domains: Arc<D>,
        reserved: Arc<ReservedDomainRegistry>,
        tenancy: &TenancyConfig,
    ) -> Self {
        Self {
            tenants,
            tenant_domains,
            reserved,
            base_suffix: format!(".{}", tenancy.base_domain),
            panel_suffix: tenancy.panel_suffix.clone(),
        }
    }

    /// Resolve a normalized hostname to a tenant and the strategy that
    /// matched it.
    pub async fn resolve(&self, host: &str) -> Result<(Tenant, ResolvedBy), TenancyError> {
        if self.reserved.is_reserved(host) {
            return Err(TenancyError::ReservedDomain(host.to_string()));
        }

        // Step 1: legacy direct match on the tenant's own domain field
        if let Some(tenant) = self
            .tenants
            .find_routable_by_domain(host)
            .await
            .map_err(TenancyError::Store)?
        {
            debug!(host, tenant_id = tenant.id, "resolved via legacy domain field");
            return Ok((tenant, ResolvedBy::Subdomain));
        }

        // Step 2: verified domain binding
        if let Some(tenant) = self
            .tenant_domains
            .find_routable_tenant_by_domain(host)
            .await
            .map_err(TenancyError::Store)?
        {
            debug!(host, tenant_id = tenant.id, "resolved via domain binding");
            return Ok((tenant, ResolvedBy::CustomDomain));
        }

        // Step 3: slug extraction, only for hosts under the platform suffix
        if let Some(slug) = self.extract_slug(host) {
            if let Some(tenant) = self
                .tenants
                .find_routable_by_slug(&slug)
                .await
                .map_err(TenancyError::Store)?
            {
                debug!(host, slug, tenant_id = tenant.id, "resolved via slug");
                return Ok((tenant, ResolvedBy::Subdomain));
            }
        }

        Err(TenancyError::DomainNotFound(host.to_string()))
    }

    /// `acme.sitefab.app` -> `acme`; `acme-panel.sitefab.app` -> `acme`.
    /// Returns `None` for hosts outside the platform suffix and for
    /// multi-label subdomains, which are not platform-issued.
    fn extract_slug(&self, host: &str) -> Option<String> {
        let subdomain = host.strip_suffix(&self.base_suffix)?;
        if subdomain.is_empty() || subdomain.contains('.') {
            return None;
        }
        let slug = subdomain
            .strip_suffix(&self.panel_suffix)
            .unwrap_or(subdomain);
        if slug.is_empty() {
            return None;
        }
        Some(slug.to_string())
    }
}
