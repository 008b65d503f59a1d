//! Demo tenant-scoped handlers.
//!
//! A small host application showing how downstream code reads the ambient
//! tenant. Nothing here receives the tenant as a parameter except through
//! the `CurrentTenant` extractor.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::task::JoinError;

use crate::error::TenancyResult;
use crate::http::request::CurrentTenant;
use crate::plans::types::limits;
use crate::tenancy::{context, InMemoryUsageCounter};

/// Routes of the demo host, with their state applied.
pub fn demo_routes(usage: InMemoryUsageCounter) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/tenant", get(tenant_info))
        .route("/api/v1/clients", get(list_clients).post(create_client))
        .route("/api/v1/marketing/campaigns", get(list_campaigns))
        .route("/api/v1/reports/summary", get(report_summary))
        .with_state(usage)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn tenant_info(CurrentTenant(ctx): CurrentTenant) -> impl IntoResponse {
    Json(json!({
        "tenantId": context::current_tenant_id(),
        "slug": context::current_tenant_slug(),
        "planType": context::current_plan_type(),
        "features": context::current_features(),
        "extracted": ctx.tenant_id,
    }))
}

async fn list_clients(State(usage): State<InMemoryUsageCounter>) -> TenancyResult<impl IntoResponse> {
    let ctx = context::require_context()?;
    let total = usage.get(&ctx.tenant_id, limits::MAX_CLIENTS);
    Ok(Json(json!({ "tenantId": ctx.tenant_id, "total": total })))
}

async fn create_client(State(usage): State<InMemoryUsageCounter>) -> TenancyResult<impl IntoResponse> {
    let ctx = context::require_context()?;
    let total = usage.increment(&ctx.tenant_id, limits::MAX_CLIENTS);
    tracing::info!(tenant_id = %ctx.tenant_id, total, "Client created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "tenantId": ctx.tenant_id, "total": total })),
    ))
}

async fn list_campaigns() -> TenancyResult<impl IntoResponse> {
    let ctx = context::require_context()?;
    Ok(Json(json!({ "tenantId": ctx.tenant_id, "campaigns": [] })))
}

/// Background work keeps the tenant only when spawned with `spawn_scoped`.
async fn report_summary() -> TenancyResult<impl IntoResponse> {
    let ctx = context::require_context()?;
    let scoped = context::spawn_scoped(async { context::current_tenant_id() });
    let detached = tokio::spawn(async { context::current_tenant_id() });

    let scoped = joined(scoped.await, "scoped");
    let detached = joined(detached.await, "detached");
    Ok(Json(json!({
        "tenantId": ctx.tenant_id,
        "scopedTask": scoped,
        "detachedTask": detached,
    })))
}

fn joined(result: Result<Option<String>, JoinError>, task: &'static str) -> Option<String> {
    result.unwrap_or_else(|e| {
        tracing::error!(error = %e, task, "Report task failed");
        None
    })
}
