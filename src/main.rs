//! Glamo tenancy host.
//!
//! Serves the demo tenant-scoped application behind the tenant stack.
//!
//! ```text
//!     Client Request
//!         → request id / trace / timeout
//!         → tenant middleware (subdomain > header > principal, validate)
//!         → route guard (features, plan limits)
//!         → handlers (read the ambient tenant)
//!
//!     config watcher → pipeline swap      Ctrl+C / SIGTERM → graceful drain
//! ```

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;

use glamo_tenancy::config::{load_config, watcher::ConfigWatcher, TenancyConfig};
use glamo_tenancy::http::{demo_routes, HttpServer};
use glamo_tenancy::lifecycle::{wait_for_signal, Shutdown};
use glamo_tenancy::observability::{logging, metrics};
use glamo_tenancy::tenancy::{InMemoryTenantRepository, InMemoryUsageCounter};

#[derive(Debug, Parser)]
#[command(name = "glamo-tenancy", version, about = "Tenant-scoped HTTP host")]
struct Args {
    /// Path to the TOML configuration file. Built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => TenancyConfig::default(),
    };

    logging::init_logging(&config.observability);

    if args.check {
        println!(
            "configuration ok: {} base domain(s), {} route(s), {} plan(s)",
            config.resolution.base_domains.len(),
            config.routes.len(),
            config.plans.len()
        );
        return Ok(());
    }

    tracing::info!("glamo-tenancy v{} starting", env!("CARGO_PKG_VERSION"));

    let repository = match &config.store.seed_path {
        Some(path) => InMemoryTenantRepository::load_from_file(Path::new(path))?,
        None => InMemoryTenantRepository::new(),
    };
    tracing::info!(
        tenants = repository.len(),
        base_domains = ?config.resolution.base_domains,
        routes = config.routes.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                error = %e,
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The notify handle must outlive the server for events to flow.
    let (updates, _watcher) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(handle) => (Some(updates), Some(handle)),
                Err(e) => {
                    tracing::warn!(error = %e, "Config hot reload disabled");
                    (None, None)
                }
            }
        }
        None => (None, None),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let usage = InMemoryUsageCounter::new();
    let server = HttpServer::new(
        &config,
        Arc::new(repository),
        Arc::new(usage.clone()),
        demo_routes(usage),
    );

    let shutdown = Shutdown::new();
    let mut server_task = tokio::spawn(server.run(listener, updates, shutdown.subscribe()));

    tokio::select! {
        result = &mut server_task => result??,
        _ = wait_for_signal() => {
            shutdown.trigger();
            server_task.await??;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
