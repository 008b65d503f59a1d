//! Route marker enforcement.
//!
//! Looks up the markers of the matched route and enforces them against the
//! ambient tenant before the handler runs. Usage is read, never reserved.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use std::sync::Arc;

use crate::error::TenancyResult;
use crate::http::server::AppState;
use crate::routing::RouteRequirements;
use crate::tenancy::{context, TenantPipeline};

pub async fn route_guard_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    // Snapshot left by the tenant middleware; a reload may have landed since.
    let pipeline = req
        .extensions()
        .get::<Arc<TenantPipeline>>()
        .cloned()
        .unwrap_or_else(|| state.pipeline.load_full());
    let requirements = pipeline
        .classifier()
        .requirements(Some(req.method().as_str()), req.uri().path())
        .cloned();

    if let Some(requirements) = requirements {
        if let Err(e) = enforce(&state, &pipeline, &requirements).await {
            tracing::debug!(route = %requirements.name, code = e.code(), "Route guard refused request");
            return e.into_response();
        }
    }

    next.run(req).await
}

async fn enforce(
    state: &AppState,
    pipeline: &TenantPipeline,
    requirements: &RouteRequirements,
) -> TenancyResult<()> {
    if let Some(feature) = &requirements.required_feature {
        pipeline.enforcer().enforce_feature_current(feature)?;
    }

    if let Some(limit) = &requirements.required_limit {
        let ctx = context::require_context()?;
        let current = state
            .usage
            .current_usage(&ctx.tenant_id, &limit.resource)
            .await?;
        pipeline
            .enforcer()
            .enforce_limit_current(&limit.resource, current, &limit.label)?;
    }

    Ok(())
}
