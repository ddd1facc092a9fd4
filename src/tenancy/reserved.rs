//! Reserved platform hostnames
//!
//! Single source of truth for control-plane domains that must never
//! resolve to a tenant. Constructed once at startup and shared by the
//! resolver, the context middleware and domain management; per-caller
//! copies of this list are how reserved domains leak.

use std::collections::HashSet;

/// Hostnames owned by the platform itself.
const RESERVED_HOSTS: &[&str] = &[
    "sitefab.app",
    "api.sitefab.app",
    "portal.sitefab.app",
    "admin.sitefab.app",
    "localhost",
];

/// Registry of hostnames excluded from tenant resolution.
#[derive(Debug, Clone)]
pub struct ReservedDomainRegistry {
    hosts: HashSet<String>,
}

impl ReservedDomainRegistry {
    /// The platform's fixed reserved set.
    pub fn standard() -> Self {
        Self::from_hosts(RESERVED_HOSTS.iter().copied())
    }

    /// Build a registry from arbitrary hostnames. Inputs are lowercased so
    /// membership checks line up with normalized hosts.
    pub fn from_hosts<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hosts: hosts
                .into_iter()
                .map(|h| h.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Whether a normalized hostname belongs to the platform control plane.
    pub fn is_reserved(&self, host: &str) -> bool {
        self.hosts.contains(host)
    }
}

impl Default for ReservedDomainRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
