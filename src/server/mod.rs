//! Server initialization and routing
//!
//! Assembles the per-request pipeline in its required order:
//!
//! observability -> error normalization -> tenant context -> guard chain
//! (auth, roles, tenant, subscription) -> handler
//!
//! The guard chain only wraps the API surface; operational endpoints sit
//! outside it.

use crate::api;
use crate::config::Config;
use crate::domain::UserRole;
use crate::guard::{
    guard_middleware, AuthGuard, GuardLayerState, GuardPipeline, RolesGuard, RoutePolicy,
    RoutePolicyRegistry, SubscriptionGuard, TenantGuard,
};
use crate::jwt::JwtVerifier;
use crate::middleware::{
    normalize_error_response, tenant_context_middleware, BoundaryPolicy, ObservabilityLayer,
    TenantContextState,
};
use crate::repository::{
    TenantDomainRepository, TenantDomainRepositoryImpl, TenantRepository, TenantRepositoryImpl,
};
use crate::service::{DomainHealthService, TenantDomainService};
use crate::tenancy::{DomainResolver, ReservedDomainRegistry};
use anyhow::Result;
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::{mysql::MySqlPoolOptions, MySqlPool};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Administrative routes; the subscription guard watches this prefix.
const ADMIN_PREFIX: &str = "/api/admin";

/// Application state shared across handlers
pub struct AppState<T: TenantRepository, D: TenantDomainRepository> {
    pub config: Arc<Config>,
    pub tenants: Arc<T>,
    pub tenant_domains: Arc<D>,
    pub reserved: Arc<ReservedDomainRegistry>,
    pub resolver: Arc<DomainResolver<T, D>>,
    pub jwt_verifier: Arc<JwtVerifier>,
    pub domain_service: Arc<TenantDomainService<T, D>>,
    pub health_service: Arc<DomainHealthService>,
    pub db_pool: Option<MySqlPool>,
    pub metrics_handle: Option<PrometheusHandle>,
}

impl<T: TenantRepository, D: TenantDomainRepository> Clone for AppState<T, D> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            tenants: Arc::clone(&self.tenants),
            tenant_domains: Arc::clone(&self.tenant_domains),
            reserved: Arc::clone(&self.reserved),
            resolver: Arc::clone(&self.resolver),
            jwt_verifier: Arc::clone(&self.jwt_verifier),
            domain_service: Arc::clone(&self.domain_service),
            health_service: Arc::clone(&self.health_service),
            db_pool: self.db_pool.clone(),
            metrics_handle: self.metrics_handle.clone(),
        }
    }
}

impl<T: TenantRepository, D: TenantDomainRepository> AppState<T, D> {
    /// Wire repositories into the resolver and services. The reserved
    /// registry is constructed once here and shared by every consumer.
    pub fn assemble(
        config: Config,
        tenants: Arc<T>,
        tenant_domains: Arc<D>,
        db_pool: Option<MySqlPool>,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Self {
        let reserved = Arc::new(ReservedDomainRegistry::standard());
        let resolver = Arc::new(DomainResolver::new(
            Arc::clone(&tenants),
            Arc::clone(&tenant_domains),
            Arc::clone(&reserved),
            &config.tenancy,
        ));
        let jwt_verifier = Arc::new(JwtVerifier::new(config.jwt.clone()));
        let domain_service = Arc::new(TenantDomainService::new(
            Arc::clone(&tenants),
            Arc::clone(&tenant_domains),
            Arc::clone(&reserved),
        ));
        let health_service = Arc::new(DomainHealthService::new(config.tenancy.probe_timeout_secs));

        Self {
            config: Arc::new(config),
            tenants,
            tenant_domains,
            reserved,
            resolver,
            jwt_verifier,
            domain_service,
            health_service,
            db_pool,
            metrics_handle,
        }
    }
}

impl AppState<TenantRepositoryImpl, TenantDomainRepositoryImpl> {
    pub fn production(
        config: Config,
        pool: MySqlPool,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Self {
        Self::assemble(
            config,
            Arc::new(TenantRepositoryImpl::new(pool.clone())),
            Arc::new(TenantDomainRepositoryImpl::new(pool.clone())),
            Some(pool),
            metrics_handle,
        )
    }
}

/// The route policies the guards consult. Everything under `/api` needs
/// authentication; the admin surface is limited to admin roles.
fn route_policies() -> RoutePolicyRegistry {
    RoutePolicyRegistry::new(ADMIN_PREFIX)
        .route("/api", RoutePolicy::authenticated())
        .route(
            ADMIN_PREFIX,
            RoutePolicy::roles([UserRole::SuperAdmin, UserRole::TenantAdmin]),
        )
}

async fn metrics_endpoint<T, D>(
    axum::extract::State(state): axum::extract::State<AppState<T, D>>,
) -> impl IntoResponse
where
    T: TenantRepository + 'static,
    D: TenantDomainRepository + 'static,
{
    match &state.metrics_handle {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Build the full application router around the given state.
pub fn build_router<T, D>(state: AppState<T, D>) -> Router
where
    T: TenantRepository + 'static,
    D: TenantDomainRepository + 'static,
{
    let tenant_state = TenantContextState {
        tenants: Arc::clone(&state.tenants),
        resolver: Arc::clone(&state.resolver),
        reserved: Arc::clone(&state.reserved),
        boundary: BoundaryPolicy::new(state.config.environment),
    };

    let pipeline = GuardPipeline::new(vec![
        Arc::new(AuthGuard::new(Arc::clone(&state.jwt_verifier))),
        Arc::new(RolesGuard),
        Arc::new(TenantGuard),
        Arc::new(SubscriptionGuard::new(Arc::clone(&state.tenants))),
    ]);
    let guard_state = GuardLayerState {
        pipeline: Arc::new(pipeline),
        policies: Arc::new(route_policies()),
    };

    let api_routes = Router::new()
        .route("/api/context", get(api::context::whoami))
        .route(
            "/api/admin/domains",
            get(api::tenant_domain::list_domains::<T, D>)
                .post(api::tenant_domain::add_domain::<T, D>),
        )
        .route(
            "/api/admin/domains/{id}",
            delete(api::tenant_domain::remove_domain::<T, D>),
        )
        .route(
            "/api/admin/domains/{id}/primary",
            post(api::tenant_domain::set_primary_domain::<T, D>),
        )
        .route(
            "/api/admin/domains/health-check",
            post(api::tenant_domain::check_domain_health::<T, D>),
        )
        .layer(axum::middleware::from_fn_with_state(
            guard_state,
            guard_middleware,
        ));

    let ops_routes = Router::new()
        .route("/health", get(api::health::health))
        .route("/ready", get(api::health::ready))
        .route("/metrics", get(metrics_endpoint::<T, D>));

    let mut router = Router::new()
        .merge(api_routes)
        .merge(ops_routes)
        .layer(axum::middleware::from_fn_with_state(
            tenant_state,
            tenant_context_middleware::<T, D>,
        ))
        .layer(axum::middleware::from_fn(normalize_error_response))
        .layer(ObservabilityLayer)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    if let Some(pool) = state.db_pool.clone() {
        router = router.layer(Extension(pool));
    }

    router
}

/// Connect to the store, assemble state and serve until shutdown.
pub async fn run(config: Config) -> Result<()> {
    let pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    let metrics_handle = crate::telemetry::metrics::install_prometheus_recorder();
    crate::telemetry::metrics::describe_metrics();

    let addr = config.http_addr();
    let state = AppState::production(config, pool, Some(metrics_handle));
    let router = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, router).await?;
    Ok(())
}
