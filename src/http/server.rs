//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the host application's routes with the tenant stack
//! - Wire up middleware (tracing, request id, timeout, tenant, guard)
//! - Swap the pipeline when the config file changes
//! - Serve until the shutdown signal fires
//!
//! # Design Decisions
//! - The timeout sits outside the tenant middleware, so a timed-out request
//!   drops its scope along with the handler future
//! - Reloads replace the whole pipeline; in-flight requests finish on the
//!   snapshot they started with

use arc_swap::ArcSwap;
use axum::{middleware, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::TenancyConfig;
use crate::http::middleware::{route_guard_middleware, tenant_context_middleware};
use crate::tenancy::{TenantPipeline, TenantRepository, UsageCounter};

/// State shared by the tenant middleware.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ArcSwap<TenantPipeline>>,
    pub usage: Arc<dyn UsageCounter>,
}

impl AppState {
    pub fn new(pipeline: TenantPipeline, usage: Arc<dyn UsageCounter>) -> Self {
        Self {
            pipeline: Arc::new(ArcSwap::from_pointee(pipeline)),
            usage,
        }
    }
}

/// Wrap `app_routes` with the tenant stack and ambient layers.
#[allow(deprecated)]
pub fn build_app(state: AppState, app_routes: Router, request_timeout: Duration) -> Router {
    app_routes
        .layer(middleware::from_fn_with_state(
            state.clone(),
            route_guard_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state,
            tenant_context_middleware,
        ))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// HTTP server hosting a tenant-aware application.
pub struct HttpServer {
    router: Router,
    state: AppState,
    repository: Arc<dyn TenantRepository>,
}

impl HttpServer {
    pub fn new(
        config: &TenancyConfig,
        repository: Arc<dyn TenantRepository>,
        usage: Arc<dyn UsageCounter>,
        app_routes: Router,
    ) -> Self {
        let pipeline = TenantPipeline::from_config(config, repository.clone());
        let state = AppState::new(pipeline, usage);
        let router = build_app(
            state.clone(),
            app_routes,
            Duration::from_secs(config.timeouts.request_secs),
        );

        Self {
            router,
            state,
            repository,
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Validated configs arriving on `config_updates` replace the pipeline.
    /// Listener and timeout changes need a restart.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: Option<mpsc::UnboundedReceiver<TenancyConfig>>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if let Some(updates) = config_updates {
            tokio::spawn(apply_reloads(
                updates,
                self.state.clone(),
                self.repository.clone(),
            ));
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn apply_reloads(
    mut updates: mpsc::UnboundedReceiver<TenancyConfig>,
    state: AppState,
    repository: Arc<dyn TenantRepository>,
) {
    while let Some(config) = updates.recv().await {
        let pipeline = TenantPipeline::from_config(&config, repository.clone());
        let routes = pipeline.classifier().routes().len();
        state.pipeline.store(Arc::new(pipeline));
        tracing::info!(routes, "Tenant pipeline reloaded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;
    use crate::tenancy::{InMemoryTenantRepository, InMemoryUsageCounter};
    use axum::{body::Body, http::Request, http::StatusCode, routing::get};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_reload_swaps_pipeline() {
        let repository: Arc<dyn TenantRepository> = Arc::new(InMemoryTenantRepository::new());
        let server = HttpServer::new(
            &TenancyConfig::default(),
            repository.clone(),
            Arc::new(InMemoryUsageCounter::new()),
            Router::new().route("/open/ping", get(|| async { "pong" })),
        );
        let app = server.router();

        let request = || Request::get("/open/ping").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let mut config = TenancyConfig::default();
        config.routes.push(RouteConfig {
            name: "open".into(),
            path_prefix: "/open".into(),
            skip_tenant_check: true,
            ..Default::default()
        });
        let (tx, rx) = mpsc::unbounded_channel();
        let reloader = tokio::spawn(apply_reloads(rx, server.state.clone(), repository));
        tx.send(config).unwrap();
        drop(tx);
        reloader.await.unwrap();

        let response = app.oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }
}
