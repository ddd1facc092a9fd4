//! Request context endpoint
//!
//! Exposes the tenant binding and caller identity the pipeline attached
//! to the current request. Downstream services use the same two
//! extensions to scope their queries; this endpoint makes the contract
//! observable.

use crate::domain::AuthenticatedUser;
use crate::tenancy::RequestTenantContext;
use axum::{Extension, Json};
use serde_json::{json, Value};

/// GET /api/context
pub async fn whoami(
    tenant: Option<Extension<RequestTenantContext>>,
    user: Option<Extension<AuthenticatedUser>>,
) -> Json<Value> {
    let tenant = tenant.map(|Extension(ctx)| {
        json!({
            "tenant_id": ctx.tenant_id,
            "slug": ctx.tenant.as_ref().map(|t| t.slug.clone()),
            "resolved_by": ctx.resolved_by,
        })
    });
    let user = user.map(|Extension(user)| {
        json!({
            "id": user.id,
            "email": user.email,
            "role": user.role,
            "tenant_id": user.tenant_id,
        })
    });

    Json(json!({
        "tenant": tenant,
        "user": user,
    }))
}
