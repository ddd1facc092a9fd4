//! Business logic services

pub mod domain_health;
pub mod tenant_domain;

pub use domain_health::{DomainHealth, DomainHealthService};
pub use tenant_domain::TenantDomainService;
