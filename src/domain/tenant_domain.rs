//! Tenant domain bindings
//!
//! A `TenantDomain` row binds one hostname to one tenant. Hostnames are
//! globally unique across all tenants (enforced by the store). Rows are
//! soft-deleted: removal flips `is_active` rather than deleting, except
//! that the last active domain of a tenant cannot be removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// How a domain binding was provisioned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainType {
    /// Customer-owned hostname pointed at the platform
    Custom,
    /// Platform-issued `<slug>.sitefab.app` hostname
    Subdomain,
}

impl std::str::FromStr for DomainType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "custom" => Ok(DomainType::Custom),
            "subdomain" => Ok(DomainType::Subdomain),
            _ => Err(format!("Unknown domain type: {}", s)),
        }
    }
}

impl std::fmt::Display for DomainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainType::Custom => write!(f, "custom"),
            DomainType::Subdomain => write!(f, "subdomain"),
        }
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for DomainType {
    fn decode(
        value: sqlx::mysql::MySqlValueRef<'r>,
    ) -> std::result::Result<Self, sqlx::error::BoxDynError> {
        let s: String = sqlx::Decode::<'r, sqlx::MySql>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl sqlx::Type<sqlx::MySql> for DomainType {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for DomainType {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> std::result::Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let s = match self {
            DomainType::Custom => "custom",
            DomainType::Subdomain => "subdomain",
        };
        <&str as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&s, buf)
    }
}

/// Verified binding of one hostname to one tenant
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TenantDomain {
    pub id: i64,
    pub tenant_id: i64,
    pub domain: String,
    pub domain_type: DomainType,
    pub is_primary: bool,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for TenantDomain {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            tenant_id: 0,
            domain: String::new(),
            domain_type: DomainType::Custom,
            is_primary: false,
            is_active: true,
            is_verified: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for binding a new domain to a tenant
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddDomainInput {
    #[validate(length(min = 1, max = 253), custom(function = "validate_hostname"))]
    pub domain: String,
    pub domain_type: DomainType,
    #[serde(default)]
    pub is_primary: bool,
}

/// Validate hostname shape (labels of letters/digits/hyphens, dot-separated)
fn validate_hostname(domain: &str) -> std::result::Result<(), validator::ValidationError> {
    if HOSTNAME_REGEX.is_match(domain) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_hostname"))
    }
}

lazy_static::lazy_static! {
    pub static ref HOSTNAME_REGEX: regex::Regex = regex::Regex::new(
        r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?(\.[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?)+$"
    ).unwrap();
}
