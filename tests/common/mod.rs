//! Shared fixtures for integration tests
//!
//! Runs the full router against in-memory repositories, so the whole
//! pipeline (tenant context middleware + guard chain + handlers) is
//! exercised without a database.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use sitefab_core::config::{Config, DatabaseConfig, Environment, JwtConfig, TenancyConfig};
use sitefab_core::domain::{Tenant, TenantDomain, UserRole};
use sitefab_core::error::Result;
use sitefab_core::repository::tenant_domain::CreateDomainRow;
use sitefab_core::repository::{TenantDomainRepository, TenantRepository};
use sitefab_core::server::{build_router, AppState};
use std::sync::{Arc, Mutex};

/// In-memory stand-in for the tenants table.
pub struct InMemoryTenants {
    rows: Mutex<Vec<Tenant>>,
}

impl InMemoryTenants {
    pub fn new(rows: Vec<Tenant>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    fn all(&self) -> Vec<Tenant> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl TenantRepository for InMemoryTenants {
    async fn find_by_id(&self, id: i64) -> Result<Option<Tenant>> {
        Ok(self.all().into_iter().find(|t| t.id == id))
    }

    async fn find_routable_by_domain(&self, domain: &str) -> Result<Option<Tenant>> {
        Ok(self
            .all()
            .into_iter()
            .find(|t| t.domain.as_deref() == Some(domain) && t.is_routable()))
    }

    async fn find_routable_by_slug(&self, slug: &str) -> Result<Option<Tenant>> {
        Ok(self
            .all()
            .into_iter()
            .find(|t| t.slug == slug && t.is_routable()))
    }

    async fn subscription_status(&self, id: i64) -> Result<Option<String>> {
        Ok(self
            .all()
            .into_iter()
            .find(|t| t.id == id)
            .map(|t| t.subscription_status))
    }
}

/// In-memory stand-in for the tenant_domains table, joined against the
/// shared tenants fixture.
pub struct InMemoryTenantDomains {
    rows: Mutex<Vec<TenantDomain>>,
    tenants: Arc<InMemoryTenants>,
}

impl InMemoryTenantDomains {
    pub fn new(rows: Vec<TenantDomain>, tenants: Arc<InMemoryTenants>) -> Self {
        Self {
            rows: Mutex::new(rows),
            tenants,
        }
    }

    fn all(&self) -> Vec<TenantDomain> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl TenantDomainRepository for InMemoryTenantDomains {
    async fn find_routable_tenant_by_domain(&self, domain: &str) -> Result<Option<Tenant>> {
        let Some(row) = self
            .all()
            .into_iter()
            .find(|d| d.domain == domain && d.is_active && d.is_verified)
        else {
            return Ok(None);
        };
        Ok(self
            .tenants
            .find_by_id(row.tenant_id)
            .await?
            .filter(|t| t.is_routable()))
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<TenantDomain>> {
        Ok(self.all().into_iter().find(|d| d.domain == domain))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<TenantDomain>> {
        Ok(self.all().into_iter().find(|d| d.id == id))
    }

    async fn list_for_tenant(&self, tenant_id: i64) -> Result<Vec<TenantDomain>> {
        let mut rows: Vec<_> = self
            .all()
            .into_iter()
            .filter(|d| d.tenant_id == tenant_id && d.is_active)
            .collect();
        rows.sort_by_key(|d| !d.is_primary);
        Ok(rows)
    }

    async fn count_active_for_tenant(&self, tenant_id: i64) -> Result<i64> {
        Ok(self
            .all()
            .iter()
            .filter(|d| d.tenant_id == tenant_id && d.is_active)
            .count() as i64)
    }

    async fn create(&self, row: &CreateDomainRow) -> Result<TenantDomain> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        let created = TenantDomain {
            id,
            tenant_id: row.tenant_id,
            domain: row.domain.clone(),
            domain_type: row.domain_type,
            is_primary: row.is_primary,
            is_active: true,
            is_verified: row.is_verified,
            ..TenantDomain::default()
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn deactivate(&self, id: i64) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        for row in rows.iter_mut() {
            if row.id == id {
                row.is_active = false;
                row.is_primary = false;
            }
        }
        Ok(())
    }

    async fn set_primary(&self, tenant_id: i64, id: i64) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        for row in rows.iter_mut() {
            if row.tenant_id == tenant_id {
                row.is_primary = row.id == id;
            }
        }
        Ok(())
    }
}

pub fn tenant(id: i64, slug: &str) -> Tenant {
    Tenant {
        id,
        slug: slug.to_string(),
        ..Tenant::default()
    }
}

pub fn domain_binding(id: i64, tenant_id: i64, domain: &str) -> TenantDomain {
    TenantDomain {
        id,
        tenant_id,
        domain: domain.to_string(),
        is_verified: true,
        ..TenantDomain::default()
    }
}

pub fn test_config(environment: Environment) -> Config {
    Config {
        http_host: "127.0.0.1".to_string(),
        http_port: 0,
        environment,
        database: DatabaseConfig {
            url: "mysql://unused".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        jwt: JwtConfig {
            secret: "integration-test-secret-key-that-is-long-enough".to_string(),
            issuer: "https://sitefab.test".to_string(),
            access_token_ttl_secs: 3600,
            private_key_pem: None,
            public_key_pem: None,
        },
        tenancy: TenancyConfig {
            probe_timeout_secs: 1,
            ..TenancyConfig::default()
        },
    }
}

pub struct TestPlatform {
    pub state: AppState<InMemoryTenants, InMemoryTenantDomains>,
    pub router: Router,
}

impl TestPlatform {
    pub fn token(&self, user_id: i64, role: UserRole, tenant_id: Option<i64>) -> String {
        self.state
            .jwt_verifier
            .create_token(user_id, "user@example.com", role, tenant_id)
            .unwrap()
    }
}

/// Assemble the full router over in-memory repositories.
pub fn platform(
    tenants: Vec<Tenant>,
    domains: Vec<TenantDomain>,
    environment: Environment,
) -> TestPlatform {
    let tenants = Arc::new(InMemoryTenants::new(tenants));
    let domains = Arc::new(InMemoryTenantDomains::new(domains, Arc::clone(&tenants)));
    let state = AppState::assemble(test_config(environment), tenants, domains, None, None);
    let router = build_router(state.clone());
    TestPlatform { state, router }
}
