//! HTTP middleware for SiteFab Core
//!
//! - Tenant-context middleware: binds every API request to a tenant (or
//!   to platform context) before guards and handlers run
//! - Error response normalization for framework-level rejections
//! - Observability layer: request IDs and HTTP metrics

pub mod error_response;
pub mod observability;
pub mod tenant_context;

pub use error_response::normalize_error_response;
pub use observability::ObservabilityLayer;
pub use tenant_context::{tenant_context_middleware, BoundaryPolicy, TenantContextState};
