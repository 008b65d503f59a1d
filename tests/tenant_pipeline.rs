//! End-to-end admission, feature and quota behaviour through the HTTP stack.

use axum::http::{Method, StatusCode};
use glamo_tenancy::plans::types::limits;

mod common;
use common::{request, send, test_app, Call};

#[tokio::test]
async fn test_health_needs_no_tenant() {
    let app = test_app();
    let (status, body) = send(&app.router, request("/health", Call::default())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_health_ignores_invalid_tenant() {
    let app = test_app();
    let (status, _) = send(
        &app.router,
        request(
            "/health",
            Call {
                host: Some("fechado.glamo.app"),
                ..Default::default()
            },
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_protected_route_without_tenant_is_unauthorized() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        request(
            "/api/v1/tenant",
            Call {
                host: Some("www.glamo.app"),
                ..Default::default()
            },
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "tenant_not_identified");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_public_route_runs_without_tenant() {
    let app = test_app();
    let (status, _) = send(&app.router, request("/api/v1/auth/login", Call::default())).await;
    // Admitted anonymously; the demo host has no login handler.
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_subdomain_context_reaches_handler() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        request(
            "/api/v1/tenant",
            Call {
                host: Some("SalaoXYZ.glamo.app:443"),
                ..Default::default()
            },
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenantId"], "t-xyz");
    assert_eq!(body["extracted"], "t-xyz");
    assert_eq!(body["slug"], "salaoxyz");
    assert_eq!(body["planType"], "STARTER");
    let features: Vec<&str> = body["features"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f.as_str())
        .collect();
    assert!(features.contains(&"reports"));
    assert!(!features.contains(&"marketing"));
}

#[tokio::test]
async fn test_invalid_tenants_are_forbidden() {
    let app = test_app();
    let cases = [
        ("fechado.glamo.app", "tenant_deactivated"),
        ("encerrado.glamo.app", "tenant_deactivated"),
        ("teste.glamo.app", "tenant_trial_expired"),
    ];
    for (host, code) in cases {
        let (status, body) = send(
            &app.router,
            request(
                "/api/v1/tenant",
                Call {
                    host: Some(host),
                    ..Default::default()
                },
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{host}");
        assert_eq!(body["error"], code, "{host}");
    }

    let (status, body) = send(
        &app.router,
        request(
            "/api/v1/tenant",
            Call {
                tenant_header: Some("t-ghost"),
                ..Default::default()
            },
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "tenant_not_found");
}

#[tokio::test]
async fn test_trial_before_deadline_is_admitted() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        request(
            "/api/v1/tenant",
            Call {
                host: Some("novo.glamo.app"),
                ..Default::default()
            },
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenantId"], "t-fresh");
}

#[tokio::test]
async fn test_header_identifies_unauthenticated_caller() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        request(
            "/api/v1/tenant",
            Call {
                host: Some("api.glamo.app"),
                tenant_header: Some("t-abc"),
                ..Default::default()
            },
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenantId"], "t-abc");
    assert_eq!(body["planType"], "FREE");
}

#[tokio::test]
async fn test_principal_claim_beats_header() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        request(
            "/api/v1/tenant",
            Call {
                tenant_header: Some("t-abc"),
                principal_tenant: Some("t-xyz"),
                ..Default::default()
            },
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenantId"], "t-xyz");
}

#[tokio::test]
async fn test_subdomain_beats_principal_claim() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        request(
            "/api/v1/tenant",
            Call {
                host: Some("barbearia.glamo.app"),
                principal_tenant: Some("t-xyz"),
                ..Default::default()
            },
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenantId"], "t-abc");
}

#[tokio::test]
async fn test_feature_marker_enforced() {
    let app = test_app();
    let call = |host| Call {
        host: Some(host),
        ..Default::default()
    };

    let (status, body) = send(
        &app.router,
        request("/api/v1/marketing/campaigns", call("salaoxyz.glamo.app")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "feature_unavailable");

    let (status, _) = send(
        &app.router,
        request("/api/v1/marketing/campaigns", call("estudio.glamo.app")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Tenant override enables a feature the plan lacks.
    let (status, body) = send(
        &app.router,
        request("/api/v1/marketing/campaigns", call("promo.glamo.app")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenantId"], "t-promo");

    // FREE has no reports.
    let (status, _) = send(
        &app.router,
        request("/api/v1/reports/summary", call("barbearia.glamo.app")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_client_quota_enforced_at_limit() {
    let app = test_app();
    app.usage.set("t-xyz", limits::MAX_CLIENTS, 499);
    let create = || {
        request(
            "/api/v1/clients",
            Call {
                method: Some(Method::POST),
                host: Some("salaoxyz.glamo.app"),
                ..Default::default()
            },
        )
    };

    let (status, body) = send(&app.router, create()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["total"], 500);

    let (status, body) = send(&app.router, create()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "quota_exceeded");
    assert_eq!(body["current"], 500);
    assert_eq!(body["limit"], 500);
    assert!(body["message"].as_str().unwrap().contains("clientes"));

    // Listing is not gated by the create marker.
    let (status, body) = send(
        &app.router,
        request(
            "/api/v1/clients",
            Call {
                host: Some("salaoxyz.glamo.app"),
                ..Default::default()
            },
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 500);
}

#[tokio::test]
async fn test_quota_counts_are_per_tenant() {
    let app = test_app();
    app.usage.set("t-abc", limits::MAX_CLIENTS, 50);

    let (status, _) = send(
        &app.router,
        request(
            "/api/v1/clients",
            Call {
                method: Some(Method::POST),
                host: Some("barbearia.glamo.app"),
                ..Default::default()
            },
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app.router,
        request(
            "/api/v1/clients",
            Call {
                method: Some(Method::POST),
                host: Some("salaoxyz.glamo.app"),
                ..Default::default()
            },
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_spawned_work_keeps_tenant_only_when_scoped() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        request(
            "/api/v1/reports/summary",
            Call {
                host: Some("estudio.glamo.app"),
                ..Default::default()
            },
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scopedTask"], "t-pro");
    assert!(body["detachedTask"].is_null());
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    use tower::ServiceExt;

    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(request("/api/v1/tenant", Call::default()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key("x-request-id"));
}
