//! Tenant domain repository

use crate::domain::{DomainType, Tenant, TenantDomain};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

/// Input for inserting a domain binding row
#[derive(Debug, Clone)]
pub struct CreateDomainRow {
    pub tenant_id: i64,
    pub domain: String,
    pub domain_type: DomainType,
    pub is_primary: bool,
    pub is_verified: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantDomainRepository: Send + Sync {
    /// Resolve a hostname through an active, verified binding joined to a
    /// tenant that is itself routable. Hostname uniqueness is enforced by
    /// the store, so at most one row can match.
    async fn find_routable_tenant_by_domain(&self, domain: &str) -> Result<Option<Tenant>>;
    /// Any binding row for this hostname, active or not.
    async fn find_by_domain(&self, domain: &str) -> Result<Option<TenantDomain>>;
    async fn find_by_id(&self, id: i64) -> Result<Option<TenantDomain>>;
    /// Active bindings of one tenant, primary first.
    async fn list_for_tenant(&self, tenant_id: i64) -> Result<Vec<TenantDomain>>;
    async fn count_active_for_tenant(&self, tenant_id: i64) -> Result<i64>;
    async fn create(&self, row: &CreateDomainRow) -> Result<TenantDomain>;
    /// Soft delete: flips `is_active` off, keeps the row.
    async fn deactivate(&self, id: i64) -> Result<()>;
    /// Mark one binding primary and clear the flag on the tenant's others.
    async fn set_primary(&self, tenant_id: i64, id: i64) -> Result<()>;
}

pub struct TenantDomainRepositoryImpl {
    pool: MySqlPool,
}

impl TenantDomainRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const DOMAIN_COLUMNS: &str =
    "id, tenant_id, domain, domain_type, is_primary, is_active, is_verified, created_at, updated_at";

#[async_trait]
impl TenantDomainRepository for TenantDomainRepositoryImpl {
    async fn find_routable_tenant_by_domain(&self, domain: &str) -> Result<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT t.id, t.slug, t.domain, t.is_active, t.status, t.subscription_status,
                   t.default_language, t.created_at, t.updated_at
            FROM tenants t
            INNER JOIN tenant_domains td ON td.tenant_id = t.id
            WHERE td.domain = ? AND td.is_active = 1 AND td.is_verified = 1
              AND t.is_active = 1 AND t.status = 'active'
            "#,
        )
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<TenantDomain>> {
        let row = sqlx::query_as::<_, TenantDomain>(&format!(
            "SELECT {DOMAIN_COLUMNS} FROM tenant_domains WHERE domain = ?"
        ))
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<TenantDomain>> {
        let row = sqlx::query_as::<_, TenantDomain>(&format!(
            "SELECT {DOMAIN_COLUMNS} FROM tenant_domains WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_for_tenant(&self, tenant_id: i64) -> Result<Vec<TenantDomain>> {
        let rows = sqlx::query_as::<_, TenantDomain>(&format!(
            "SELECT {DOMAIN_COLUMNS} FROM tenant_domains
             WHERE tenant_id = ? AND is_active = 1
             ORDER BY is_primary DESC, created_at ASC"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count_active_for_tenant(&self, tenant_id: i64) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tenant_domains WHERE tenant_id = ? AND is_active = 1",
        )
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    async fn create(&self, row: &CreateDomainRow) -> Result<TenantDomain> {
        let result = sqlx::query(
            r#"
            INSERT INTO tenant_domains (tenant_id, domain, domain_type, is_primary, is_active, is_verified, created_at, updated_at)
            VALUES (?, ?, ?, ?, 1, ?, NOW(), NOW())
            "#,
        )
        .bind(row.tenant_id)
        .bind(&row.domain)
        .bind(row.domain_type)
        .bind(row.is_primary)
        .bind(row.is_verified)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id() as i64;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create tenant domain")))
    }

    async fn deactivate(&self, id: i64) -> Result<()> {
        let result = sqlx::query(
            "UPDATE tenant_domains SET is_active = 0, is_primary = 0, updated_at = NOW() WHERE id = ?",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Tenant domain {} not found", id)));
        }

        Ok(())
    }

    async fn set_primary(&self, tenant_id: i64, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE tenant_domains SET is_primary = 0, updated_at = NOW()
             WHERE tenant_id = ? AND is_primary = 1",
        )
        .bind(tenant_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            "UPDATE tenant_domains SET is_primary = 1, updated_at = NOW()
             WHERE id = ? AND tenant_id = ? AND is_active = 1",
        )
        .bind(id)
        .bind(tenant_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Tenant domain {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }
}
