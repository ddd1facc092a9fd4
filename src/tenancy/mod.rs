//! Tenant resolution
//!
//! Binds a hostname to a tenant through three fallback strategies, after
//! carving out the platform's own reserved hostnames. The middleware in
//! `middleware::tenant_context` drives this once per request.

pub mod context;
pub mod normalizer;
pub mod reserved;
pub mod resolver;

pub use context::{RequestTenantContext, ResolvedBy};
pub use normalizer::normalize_host;
pub use reserved::ReservedDomainRegistry;
pub use resolver::DomainResolver;
