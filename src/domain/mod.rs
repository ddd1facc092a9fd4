//! Domain models

pub mod tenant;
pub mod tenant_domain;
pub mod user;

pub use tenant::{Tenant, TenantStatus};
pub use tenant_domain::{AddDomainInput, DomainType, TenantDomain};
pub use user::{AuthenticatedUser, UserRole};
