//! Tenant repository

use crate::domain::Tenant;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Tenant>>;
    /// Legacy single-domain lookup, filtered to routable tenants.
    async fn find_routable_by_domain(&self, domain: &str) -> Result<Option<Tenant>>;
    /// Slug lookup, filtered to routable tenants.
    async fn find_routable_by_slug(&self, slug: &str) -> Result<Option<Tenant>>;
    /// Current subscription status of a tenant, if the tenant exists.
    async fn subscription_status(&self, id: i64) -> Result<Option<String>>;
}

pub struct TenantRepositoryImpl {
    pool: MySqlPool,
}

impl TenantRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const TENANT_COLUMNS: &str = "id, slug, domain, is_active, status, subscription_status, default_language, created_at, updated_at";

#[async_trait]
impl TenantRepository for TenantRepositoryImpl {
    async fn find_by_id(&self, id: i64) -> Result<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    async fn find_routable_by_domain(&self, domain: &str) -> Result<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE domain = ? AND is_active = 1 AND status = 'active'"
        ))
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    async fn find_routable_by_slug(&self, slug: &str) -> Result<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE slug = ? AND is_active = 1 AND status = 'active'"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    async fn subscription_status(&self, id: i64) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT subscription_status FROM tenants WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|r| r.0))
    }
}
