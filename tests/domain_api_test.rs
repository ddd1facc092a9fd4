//! Domain management API through the full pipeline

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{domain_binding, platform, tenant};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sitefab_core::config::Environment;
use sitefab_core::domain::UserRole;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Tenant-Id", "7")
        .header("Authorization", format!("Bearer {}", token));
    match body {
        Some(value) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn add_and_list_domains() {
    let fixture = platform(
        vec![tenant(7, "acme")],
        vec![domain_binding(1, 7, "acme.sitefab.app")],
        Environment::Development,
    );
    let token = fixture.token(1, UserRole::TenantAdmin, Some(7));

    let response = fixture
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/api/admin/domains",
            &token,
            Some(json!({"domain": "Shop.Acme.COM", "domain_type": "custom"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["domain"], "shop.acme.com");
    assert_eq!(created["is_verified"], false);

    let response = fixture
        .router
        .oneshot(request("GET", "/api/admin/domains", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    let domains: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["domain"].as_str().unwrap())
        .collect();
    assert!(domains.contains(&"shop.acme.com"));
    assert!(domains.contains(&"acme.sitefab.app"));
}

#[tokio::test]
async fn reserved_domain_cannot_be_bound() {
    let fixture = platform(vec![tenant(7, "acme")], vec![], Environment::Development);
    let token = fixture.token(1, UserRole::TenantAdmin, Some(7));

    let response = fixture
        .router
        .oneshot(request(
            "POST",
            "/api/admin/domains",
            &token,
            Some(json!({"domain": "portal.sitefab.app", "domain_type": "custom"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn duplicate_domain_is_conflict() {
    let fixture = platform(
        vec![tenant(7, "acme"), tenant(8, "globex")],
        vec![domain_binding(1, 8, "shop.example.com")],
        Environment::Development,
    );
    let token = fixture.token(1, UserRole::TenantAdmin, Some(7));

    let response = fixture
        .router
        .oneshot(request(
            "POST",
            "/api/admin/domains",
            &token,
            Some(json!({"domain": "shop.example.com", "domain_type": "custom"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn last_domain_cannot_be_removed() {
    let fixture = platform(
        vec![tenant(7, "acme")],
        vec![domain_binding(1, 7, "acme.sitefab.app")],
        Environment::Development,
    );
    let token = fixture.token(1, UserRole::TenantAdmin, Some(7));

    let response = fixture
        .router
        .oneshot(request("DELETE", "/api/admin/domains/1", &token, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn second_domain_can_be_removed() {
    let fixture = platform(
        vec![tenant(7, "acme")],
        vec![
            domain_binding(1, 7, "acme.sitefab.app"),
            domain_binding(2, 7, "shop.acme.com"),
        ],
        Environment::Development,
    );
    let token = fixture.token(1, UserRole::TenantAdmin, Some(7));

    let response = fixture
        .router
        .clone()
        .oneshot(request("DELETE", "/api/admin/domains/2", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = fixture
        .router
        .oneshot(request("GET", "/api/admin/domains", &token, None))
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn another_tenants_domain_reads_as_not_found() {
    let fixture = platform(
        vec![tenant(7, "acme"), tenant(8, "globex")],
        vec![
            domain_binding(1, 7, "acme.sitefab.app"),
            domain_binding(2, 8, "globex.sitefab.app"),
        ],
        Environment::Development,
    );
    let token = fixture.token(1, UserRole::TenantAdmin, Some(7));

    let response = fixture
        .router
        .oneshot(request("DELETE", "/api/admin/domains/2", &token, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn set_primary_promotes_and_demotes() {
    let mut primary = domain_binding(1, 7, "acme.sitefab.app");
    primary.is_primary = true;
    let fixture = platform(
        vec![tenant(7, "acme")],
        vec![primary, domain_binding(2, 7, "shop.acme.com")],
        Environment::Development,
    );
    let token = fixture.token(1, UserRole::TenantAdmin, Some(7));

    let response = fixture
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/api/admin/domains/2/primary",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = fixture
        .router
        .oneshot(request("GET", "/api/admin/domains", &token, None))
        .await
        .unwrap();
    let listed = body_json(response).await;
    // primary sorts first
    assert_eq!(listed[0]["domain"], "shop.acme.com");
    assert_eq!(listed[0]["is_primary"], true);
    assert_eq!(listed[1]["is_primary"], false);
}

#[tokio::test]
async fn super_admin_manages_any_tenant_from_platform_context() {
    let fixture = platform(
        vec![tenant(7, "acme")],
        vec![domain_binding(1, 7, "acme.sitefab.app")],
        Environment::Development,
    );
    let token = fixture.token(99, UserRole::SuperAdmin, None);

    let response = fixture
        .router
        .oneshot(
            Request::builder()
                .uri("/api/admin/domains?tenant_id=7")
                .header("Host", "admin.sitefab.app")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn health_check_reports_unreachable_domain() {
    let fixture = platform(vec![tenant(7, "acme")], vec![], Environment::Development);
    let token = fixture.token(1, UserRole::TenantAdmin, Some(7));

    let response = fixture
        .router
        .oneshot(request(
            "POST",
            "/api/admin/domains/health-check",
            &token,
            Some(json!({"domain": "definitely-not-real.invalid"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["state"], "unreachable");
}
