//! Unified error handling for SiteFab Core

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Resolution-layer failures.
///
/// These are raised while binding a request to a tenant and are kept
/// distinct from [`AppError`] so the HTTP boundary can decide how much
/// detail to expose (see `middleware::tenant_context::BoundaryPolicy`).
#[derive(Error, Debug)]
pub enum TenancyError {
    #[error("domain '{0}' is reserved for platform use")]
    ReservedDomain(String),

    #[error("no tenant found for domain '{0}'")]
    DomainNotFound(String),

    #[error("invalid tenant id header: {0}")]
    InvalidTenantHeader(String),

    #[error("no tenant information in request headers")]
    MissingTenantSignal,

    #[error("tenant {0} not found or inactive")]
    TenantNotFound(i64),

    #[error("tenant {0} is inactive or suspended")]
    TenantInactive(i64),

    /// Store failures propagate unchanged so they surface as internal
    /// errors, never as a silent platform-context fallback.
    #[error(transparent)]
    Store(AppError),
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Tenant is inactive or suspended: {0}")]
    TenantInactive(String),

    #[error("Cross-tenant access denied: user belongs to tenant {user_tenant_id}, request resolved to tenant {request_tenant_id}")]
    CrossTenantDenied {
        user_tenant_id: i64,
        request_tenant_id: i64,
    },

    #[error("Only SUPER_ADMIN may access this domain")]
    ReservedDomainAccess,

    #[error("Insufficient role: {0}")]
    InsufficientRole(String),

    #[error("Subscription required: {0}")]
    SubscriptionRequired(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation", msg.clone())
            }
            AppError::TenantInactive(msg) => {
                (StatusCode::FORBIDDEN, "tenant_inactive", msg.clone())
            }
            AppError::CrossTenantDenied { .. } => (
                StatusCode::FORBIDDEN,
                "cross_tenant_denied",
                self.to_string(),
            ),
            AppError::ReservedDomainAccess => {
                (StatusCode::FORBIDDEN, "reserved_domain", self.to_string())
            }
            AppError::InsufficientRole(msg) => {
                (StatusCode::FORBIDDEN, "insufficient_role", msg.clone())
            }
            AppError::SubscriptionRequired(msg) => (
                StatusCode::PAYMENT_REQUIRED,
                "subscription_required",
                msg.clone(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Jwt(e) => {
                tracing::error!("JWT error: {:?}", e);
                (
                    StatusCode::UNAUTHORIZED,
                    "jwt_error",
                    "Invalid or expired token".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        });

        (status, body).into_response()
    }
}

// Conversion from validation errors
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}
