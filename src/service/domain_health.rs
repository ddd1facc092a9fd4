//! Domain health checks
//!
//! Probes a candidate hostname over HTTPS before (or after) binding it to
//! a tenant. The probe is bounded by a hard timeout; a slow or dead
//! domain is reported as unreachable, it never hangs the caller.

use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Outcome of probing one hostname.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DomainHealth {
    Reachable { status: u16 },
    Unreachable { reason: String },
}

impl DomainHealth {
    pub fn is_reachable(&self) -> bool {
        matches!(self, DomainHealth::Reachable { .. })
    }
}

pub struct DomainHealthService {
    client: reqwest::Client,
    timeout: Duration,
}

impl DomainHealthService {
    pub fn new(timeout_secs: u64) -> Self {
        let timeout = Duration::from_secs(timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(3))
            .build()
            .expect("Failed to build HTTP client");
        Self { client, timeout }
    }

    /// Probe `https://<host>/`.
    pub async fn probe(&self, host: &str) -> DomainHealth {
        self.probe_url(&format!("https://{}/", host)).await
    }

    /// Probe an explicit URL. The outer timeout covers DNS and connect
    /// stalls the client-level timeout can miss; whichever fires first
    /// cancels the in-flight request.
    pub async fn probe_url(&self, url: &str) -> DomainHealth {
        let request = self.client.get(url).send();
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => {
                let status = response.status().as_u16();
                debug!(url, status, "domain probe completed");
                DomainHealth::Reachable { status }
            }
            Ok(Err(err)) => DomainHealth::Unreachable {
                reason: err.to_string(),
            },
            Err(_) => DomainHealth::Unreachable {
                reason: format!("no response within {}s", self.timeout.as_secs()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_reachable_domain_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let service = DomainHealthService::new(5);
        let health = service.probe_url(&server.uri()).await;
        assert!(matches!(health, DomainHealth::Reachable { status: 200 }));
    }

    #[tokio::test]
    async fn test_error_status_still_counts_as_reachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let service = DomainHealthService::new(5);
        let health = service.probe_url(&server.uri()).await;
        assert!(matches!(health, DomainHealth::Reachable { status: 503 }));
        assert!(health.is_reachable());
    }

    #[tokio::test]
    async fn test_slow_domain_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let service = DomainHealthService::new(1);
        let health = service.probe_url(&server.uri()).await;
        assert!(matches!(health, DomainHealth::Unreachable { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let service = DomainHealthService::new(1);
        // nothing listens on this port
        let health = service.probe_url("http://127.0.0.1:9/").await;
        assert!(!health.is_reachable());
    }

    #[test]
    fn test_health_serialization() {
        let json = serde_json::to_value(DomainHealth::Reachable { status: 200 }).unwrap();
        assert_eq!(json["state"], "reachable");
        assert_eq!(json["status"], 200);

        let json = serde_json::to_value(DomainHealth::Unreachable {
            reason: "timed out".to_string(),
        })
        .unwrap();
        assert_eq!(json["state"], "unreachable");
    }
}
