use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glamo_tenancy::config::{load_config, TenancyConfig};
use glamo_tenancy::plans::{PlanCatalog, PlanEnforcer, PlanType};
use glamo_tenancy::tenancy::{
    Admission, AuthenticatedPrincipal, InMemoryTenantRepository, RequestDescriptor,
    TenantPipeline, TenantRepository, TenantResolver, TenantValidator, ValidationVerdict,
};

#[derive(Parser)]
#[command(name = "tenancy-cli")]
#[command(about = "Offline inspection of tenant resolution and plan rules", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tenant seed file (JSON array). Overrides `store.seed_path`.
    #[arg(short, long)]
    seed: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and admit a request as the middleware would
    Resolve {
        #[arg(long)]
        host: Option<String>,
        /// Tenant header value
        #[arg(long)]
        header: Option<String>,
        /// Tenant claim of an authenticated principal
        #[arg(long)]
        principal_tenant: Option<String>,
        #[arg(long, default_value = "GET")]
        method: String,
        #[arg(long, default_value = "/")]
        path: String,
    },
    /// Validate a tenant id against the store
    Validate { tenant_id: String },
    /// Print the plan catalog
    Plans,
    /// Check a usage count against a plan limit
    CheckLimit {
        #[arg(long, value_parser = parse_plan)]
        plan: PlanType,
        #[arg(long)]
        resource: String,
        #[arg(long)]
        current: u64,
    },
}

fn parse_plan(value: &str) -> Result<PlanType, String> {
    PlanType::parse(value).ok_or_else(|| format!("unknown plan '{value}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => TenancyConfig::default(),
    };
    let seed = cli
        .seed
        .clone()
        .or_else(|| config.store.seed_path.as_ref().map(PathBuf::from));
    let repository: Arc<dyn TenantRepository> = Arc::new(match &seed {
        Some(path) => InMemoryTenantRepository::load_from_file(Path::new(path))?,
        None => InMemoryTenantRepository::new(),
    });

    match cli.command {
        Commands::Resolve {
            host,
            header,
            principal_tenant,
            method,
            path,
        } => {
            let mut request = RequestDescriptor::new(path).with_method(method);
            if let Some(host) = host {
                request = request.with_host(host);
            }
            if let Some(header) = header {
                request = request.with_tenant_header(header);
            }
            if let Some(tenant) = principal_tenant {
                request = request.with_principal(AuthenticatedPrincipal::new("cli", Some(tenant)));
            }

            let resolver = TenantResolver::new(&config.resolution, repository.clone());
            let candidate = resolver.resolve(&request).await?;
            let pipeline = TenantPipeline::from_config(&config, repository);
            let admission = match pipeline.admit(&request).await {
                Ok(Admission::Bypass) => json!({ "outcome": "bypass" }),
                Ok(Admission::Anonymous) => json!({ "outcome": "anonymous" }),
                Ok(Admission::Scoped(ctx)) => json!({ "outcome": "scoped", "context": ctx.as_ref() }),
                Err(e) => json!({
                    "outcome": "rejected",
                    "error": e.code(),
                    "message": e.user_message(),
                }),
            };

            print_json(&json!({
                "candidate": candidate.map(|c| json!({
                    "tenantId": c.tenant_id,
                    "source": c.source,
                })),
                "admission": admission,
            }))?;
        }
        Commands::Validate { tenant_id } => {
            let verdict = TenantValidator::new(repository).validate(&tenant_id).await?;
            let output = match verdict {
                ValidationVerdict::Valid(tenant) => json!({ "valid": true, "tenant": tenant }),
                ValidationVerdict::Invalid(reason) => json!({ "valid": false, "reason": reason }),
            };
            print_json(&output)?;
        }
        Commands::Plans => {
            let catalog = PlanCatalog::new(config.plans.clone());
            for (tier, plan) in catalog.iter() {
                println!("{tier}");
                for (resource, limit) in &plan.limits {
                    let shown = if *limit < 0 {
                        "unlimited".to_string()
                    } else {
                        limit.to_string()
                    };
                    println!("  {resource:<26} {shown}");
                }
                let features: Vec<String> = catalog.enabled_features(tier).into_iter().collect();
                println!("  features: {}", features.join(", "));
            }
        }
        Commands::CheckLimit {
            plan,
            resource,
            current,
        } => {
            let enforcer = PlanEnforcer::new(Arc::new(PlanCatalog::new(config.plans.clone())));
            let result = enforcer.check_limit(&plan, &resource, current);
            print_json(&json!({
                "plan": plan,
                "resource": resource,
                "allowed": result.allowed,
                "limit": result.limit,
                "current": result.current,
                "unlimited": result.is_unlimited(),
            }))?;
        }
    }

    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
