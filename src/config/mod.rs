//! Configuration management for SiteFab Core

use anyhow::{Context, Result};
use std::env;

/// Deployment environment; controls how much resolution-failure detail
/// leaks across the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn from_env_var(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server host
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Database configuration
    pub database: DatabaseConfig,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Tenancy configuration
    pub tenancy: TenancyConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub access_token_ttl_secs: i64,
    pub private_key_pem: Option<String>,
    pub public_key_pem: Option<String>,
}

/// Tenant-resolution knobs
#[derive(Debug, Clone)]
pub struct TenancyConfig {
    /// Platform base domain; `<slug>.<base_domain>` hosts resolve by slug
    pub base_domain: String,
    /// Marker suffix stripped from a subdomain before slug lookup
    /// (`acme-panel.sitefab.app` serves the admin panel of `acme`)
    pub panel_suffix: String,
    /// Hard timeout for domain health probes, in seconds
    pub probe_timeout_secs: u64,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            base_domain: "sitefab.app".to_string(),
            panel_suffix: "-panel".to_string(),
            probe_timeout_secs: 5,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid HTTP_PORT")?,
            environment: Environment::from_env_var(
                &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            ),
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").context("DATABASE_URL is required")?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .unwrap_or(2),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").context("JWT_SECRET is required")?,
                issuer: env::var("JWT_ISSUER")
                    .unwrap_or_else(|_| "https://id.sitefab.app".to_string()),
                access_token_ttl_secs: env::var("JWT_ACCESS_TOKEN_TTL_SECS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .unwrap_or(3600),
                private_key_pem: env::var("JWT_PRIVATE_KEY")
                    .ok()
                    .map(|value| value.replace("\\n", "\n")),
                public_key_pem: env::var("JWT_PUBLIC_KEY")
                    .ok()
                    .map(|value| value.replace("\\n", "\n")),
            },
            tenancy: TenancyConfig {
                base_domain: env::var("TENANCY_BASE_DOMAIN")
                    .unwrap_or_else(|_| "sitefab.app".to_string()),
                panel_suffix: env::var("TENANCY_PANEL_SUFFIX")
                    .unwrap_or_else(|_| "-panel".to_string()),
                probe_timeout_secs: env::var("DOMAIN_PROBE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            },
        })
    }

    /// Get HTTP server address
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}
