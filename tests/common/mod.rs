//! Shared fixtures for integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

use glamo_tenancy::config::{LimitRequirement, RouteConfig, TenancyConfig};
use glamo_tenancy::http::{build_app, demo_routes, AppState};
use glamo_tenancy::plans::types::{features, limits};
use glamo_tenancy::plans::PlanType;
use glamo_tenancy::tenancy::{
    AuthenticatedPrincipal, InMemoryTenantRepository, InMemoryUsageCounter, Tenant,
    TenantPipeline, TenantStatus,
};

/// Header the fake auth layer turns into an `AuthenticatedPrincipal`.
pub const PRINCIPAL_TENANT_HEADER: &str = "x-test-principal-tenant";

pub struct TestApp {
    pub router: Router,
    pub usage: InMemoryUsageCounter,
}

pub fn tenant(id: &str, slug: &str, status: TenantStatus, plan: PlanType) -> Tenant {
    Tenant {
        id: id.into(),
        slug: slug.into(),
        status,
        trial_ends_at: None,
        plan_type: plan,
        settings: HashMap::new(),
    }
}

pub fn seeded_repository() -> InMemoryTenantRepository {
    let repo = InMemoryTenantRepository::new();
    repo.insert(tenant("t-xyz", "salaoxyz", TenantStatus::Active, PlanType::Starter));
    repo.insert(tenant("t-abc", "barbearia", TenantStatus::Active, PlanType::Free));
    repo.insert(tenant("t-pro", "estudio", TenantStatus::Active, PlanType::Professional));
    repo.insert(tenant("t-off", "fechado", TenantStatus::Suspended, PlanType::Starter));
    repo.insert(tenant("t-gone", "encerrado", TenantStatus::Cancelled, PlanType::Free));

    let mut trial = tenant("t-trial", "teste", TenantStatus::Trial, PlanType::Free);
    trial.trial_ends_at = Some(Utc::now() - Duration::days(1));
    repo.insert(trial);

    let mut fresh = tenant("t-fresh", "novo", TenantStatus::Trial, PlanType::Free);
    fresh.trial_ends_at = Some(Utc::now() + Duration::days(14));
    repo.insert(fresh);

    let mut promo = tenant("t-promo", "promo", TenantStatus::Active, PlanType::Starter);
    promo.settings.insert("features".into(), json!({ "marketing": true }));
    repo.insert(promo);

    repo
}

pub fn test_config() -> TenancyConfig {
    let mut config = TenancyConfig::default();
    config.routes = vec![
        RouteConfig {
            name: "clients-create".into(),
            path_prefix: "/api/v1/clients".into(),
            methods: vec!["POST".into()],
            required_limit: Some(LimitRequirement {
                resource: limits::MAX_CLIENTS.into(),
                label: "clientes".into(),
            }),
            ..Default::default()
        },
        RouteConfig {
            name: "marketing".into(),
            path_prefix: "/api/v1/marketing".into(),
            required_feature: Some(features::MARKETING.into()),
            ..Default::default()
        },
        RouteConfig {
            name: "reports".into(),
            path_prefix: "/api/v1/reports".into(),
            required_feature: Some(features::REPORTS.into()),
            ..Default::default()
        },
    ];
    config
}

/// Stand-in for the external auth layer.
async fn fake_auth(mut req: Request<Body>, next: Next) -> Response {
    let claim = req
        .headers()
        .get(PRINCIPAL_TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if let Some(tenant_id) = claim {
        req.extensions_mut()
            .insert(AuthenticatedPrincipal::new("user-1", Some(tenant_id)));
    }
    next.run(req).await
}

/// Wrap `routes` with the tenant stack and the fake auth layer.
pub fn app_with(config: &TenancyConfig, routes: Router, usage: InMemoryUsageCounter) -> Router {
    let pipeline = TenantPipeline::from_config(config, Arc::new(seeded_repository()));
    let state = AppState::new(pipeline, Arc::new(usage));
    build_app(
        state,
        routes,
        std::time::Duration::from_secs(config.timeouts.request_secs),
    )
    .layer(middleware::from_fn(fake_auth))
}

pub fn test_app() -> TestApp {
    let usage = InMemoryUsageCounter::new();
    let router = app_with(&test_config(), demo_routes(usage.clone()), usage.clone());
    TestApp { router, usage }
}

#[derive(Default)]
pub struct Call<'a> {
    pub method: Option<Method>,
    pub host: Option<&'a str>,
    pub tenant_header: Option<&'a str>,
    pub principal_tenant: Option<&'a str>,
}

pub fn request(path: &str, call: Call<'_>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(call.method.unwrap_or(Method::GET))
        .uri(path);
    if let Some(host) = call.host {
        builder = builder.header("host", host);
    }
    if let Some(value) = call.tenant_header {
        builder = builder.header("x-tenant-id", value);
    }
    if let Some(value) = call.principal_tenant {
        builder = builder.header(PRINCIPAL_TENANT_HEADER, value);
    }
    builder.body(Body::empty()).unwrap()
}

/// Send one request and decode the JSON body (`Value::Null` when empty).
pub async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
