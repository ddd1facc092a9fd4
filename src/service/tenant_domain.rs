//! Tenant domain management
//!
//! Binding, unbinding and promoting the hostnames a tenant serves from.
//! Uses the shared reserved registry so an operator can never bind a
//! control-plane hostname to a tenant, no matter which path the request
//! took.

use crate::domain::{AddDomainInput, DomainType, TenantDomain};
use crate::error::{AppError, Result};
use crate::repository::tenant_domain::CreateDomainRow;
use crate::repository::{TenantDomainRepository, TenantRepository};
use crate::tenancy::{normalize_host, ReservedDomainRegistry};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

pub struct TenantDomainService<T: TenantRepository, D: TenantDomainRepository> {
    tenants: Arc<T>,
    domains: Arc<D>,
    reserved: Arc<ReservedDomainRegistry>,
}

impl<T: TenantRepository, D: TenantDomainRepository> TenantDomainService<T, D> {
    pub fn new(tenants: Arc<T>, domains: Arc<D>, reserved: Arc<ReservedDomainRegistry>) -> Self {
        Self {
            tenants,
            domains,
            reserved,
        }
    }

    pub async fn list(&self, tenant_id: i64) -> Result<Vec<TenantDomain>> {
        self.domains.list_for_tenant(tenant_id).await
    }

    /// Bind a new hostname to a tenant.
    ///
    /// Platform-issued subdomains are trusted as verified at creation;
    /// custom domains start unverified until DNS verification completes
    /// in the provisioning flow.
    pub async fn add_domain(&self, tenant_id: i64, input: AddDomainInput) -> Result<TenantDomain> {
        let input = AddDomainInput {
            domain: normalize_host(&input.domain),
            ..input
        };
        input.validate()?;

        if self.reserved.is_reserved(&input.domain) {
            return Err(AppError::Conflict(format!(
                "domain '{}' is reserved for platform use",
                input.domain
            )));
        }

        self.tenants
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tenant {} not found", tenant_id)))?;

        if let Some(existing) = self.domains.find_by_domain(&input.domain).await? {
            return Err(AppError::Conflict(format!(
                "domain '{}' is already bound to tenant {}",
                existing.domain, existing.tenant_id
            )));
        }

        let row = CreateDomainRow {
            tenant_id,
            domain: input.domain.clone(),
            domain_type: input.domain_type,
            is_primary: input.is_primary,
            is_verified: input.domain_type == DomainType::Subdomain,
        };
        let created = self.domains.create(&row).await?;

        if input.is_primary {
            self.domains.set_primary(tenant_id, created.id).await?;
        }

        info!(tenant_id, domain = %created.domain, "domain bound");
        Ok(created)
    }

    /// Soft-delete a binding. The last active domain of a tenant cannot
    /// be removed, or the site would become unreachable.
    pub async fn remove_domain(&self, tenant_id: i64, domain_id: i64) -> Result<()> {
        let domain = self.owned_domain(tenant_id, domain_id).await?;

        let active = self.domains.count_active_for_tenant(tenant_id).await?;
        if active <= 1 {
            return Err(AppError::Conflict(
                "cannot remove the last active domain of a tenant".to_string(),
            ));
        }

        self.domains.deactivate(domain.id).await?;
        info!(tenant_id, domain = %domain.domain, "domain unbound");
        Ok(())
    }

    /// Promote a binding to primary, demoting the current primary.
    pub async fn set_primary(&self, tenant_id: i64, domain_id: i64) -> Result<()> {
        let domain = self.owned_domain(tenant_id, domain_id).await?;
        if !domain.is_active {
            return Err(AppError::Conflict(
                "cannot promote an inactive domain".to_string(),
            ));
        }
        self.domains.set_primary(tenant_id, domain_id).await
    }

    async fn owned_domain(&self, tenant_id: i64, domain_id: i64) -> Result<TenantDomain> {
        let domain = self
            .domains
            .find_by_id(domain_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tenant domain {} not found", domain_id)))?;
        if domain.tenant_id != tenant_id {
            // present as not-found so another tenant's ids stay opaque
            return Err(AppError::NotFound(format!(
                "Tenant domain {} not found",
                domain_id
            )));
        }
        Ok(domain)
    }
}
