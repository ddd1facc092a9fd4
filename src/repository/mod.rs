//! Data access layer

pub mod tenant;
pub mod tenant_domain;

pub use tenant::{TenantRepository, TenantRepositoryImpl};
pub use tenant_domain::{TenantDomainRepository, TenantDomainRepositoryImpl};

#[cfg(test)]
pub use tenant::MockTenantRepository;
#[cfg(test)]
pub use tenant_domain::MockTenantDomainRepository;
