//! Tenant domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Tenant lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    #[default]
    Active,
    Suspended,
    TrialExpired,
}

impl std::str::FromStr for TenantStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(TenantStatus::Active),
            "suspended" => Ok(TenantStatus::Suspended),
            "trial_expired" => Ok(TenantStatus::TrialExpired),
            _ => Err(format!("Unknown tenant status: {}", s)),
        }
    }
}

impl std::fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TenantStatus::Active => write!(f, "active"),
            TenantStatus::Suspended => write!(f, "suspended"),
            TenantStatus::TrialExpired => write!(f, "trial_expired"),
        }
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for TenantStatus {
    fn decode(
        value: sqlx::mysql::MySqlValueRef<'r>,
    ) -> std::result::Result<Self, sqlx::error::BoxDynError> {
        let s: String = sqlx::Decode::<'r, sqlx::MySql>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl sqlx::Type<sqlx::MySql> for TenantStatus {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for TenantStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> std::result::Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let s = match self {
            TenantStatus::Active => "active",
            TenantStatus::Suspended => "suspended",
            TenantStatus::TrialExpired => "trial_expired",
        };
        <&str as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&s, buf)
    }
}

/// Tenant entity
///
/// `domain` is the legacy single-domain field kept for sites bound before
/// multi-domain support landed; new bindings live in `tenant_domains`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: i64,
    pub slug: String,
    pub domain: Option<String>,
    pub is_active: bool,
    pub status: TenantStatus,
    pub subscription_status: String,
    pub default_language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Whether this tenant may serve request traffic.
    pub fn is_routable(&self) -> bool {
        self.is_active && self.status == TenantStatus::Active
    }
}

impl Default for Tenant {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            slug: String::new(),
            domain: None,
            is_active: true,
            status: TenantStatus::default(),
            subscription_status: "active".to_string(),
            default_language: "en".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

// Regex for slug validation (lowercase alphanumeric with hyphens)
lazy_static::lazy_static! {
    pub static ref SLUG_REGEX: regex::Regex = regex::Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}
