//! Per-request tenant admission.
//!
//! # Responsibilities
//! - Classify the request path
//! - Resolve, validate and build the `TenantContext`
//! - Run the remaining request work inside the context scope
//!
//! # Design Decisions
//! - Fail closed: no validated tenant, no protected work
//! - Store failures surface as `TenancyError::Repository`, never as a pass
//! - Built from one config snapshot; a reload builds a new pipeline

use std::future::Future;
use std::sync::Arc;

use crate::config::TenancyConfig;
use crate::error::{TenancyError, TenancyResult};
use crate::observability::metrics;
use crate::plans::{PlanCatalog, PlanEnforcer};
use crate::routing::{PathClassifier, RouteClass};
use crate::tenancy::context;
use crate::tenancy::repository::TenantRepository;
use crate::tenancy::resolver::TenantResolver;
use crate::tenancy::types::{RequestDescriptor, TenantContext};
use crate::tenancy::validator::{TenantValidator, ValidationVerdict};

/// Outcome of admitting a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    /// Tenant-free route; resolution was skipped.
    Bypass,
    /// Public route with no resolvable tenant.
    Anonymous,
    /// Validated tenant; run inside its scope.
    Scoped(Arc<TenantContext>),
}

impl Admission {
    pub fn context(&self) -> Option<&Arc<TenantContext>> {
        match self {
            Admission::Scoped(ctx) => Some(ctx),
            _ => None,
        }
    }
}

/// Resolver + validator + context construction, compiled from config.
pub struct TenantPipeline {
    classifier: PathClassifier,
    resolver: TenantResolver,
    validator: TenantValidator,
    catalog: Arc<PlanCatalog>,
    enforcer: PlanEnforcer,
    tenant_header: String,
}

impl TenantPipeline {
    pub fn from_config(config: &TenancyConfig, repository: Arc<dyn TenantRepository>) -> Self {
        let catalog = Arc::new(PlanCatalog::new(config.plans.clone()));
        Self {
            classifier: PathClassifier::new(&config.resolution, &config.routes),
            resolver: TenantResolver::new(&config.resolution, repository.clone()),
            validator: TenantValidator::new(repository),
            enforcer: PlanEnforcer::new(catalog.clone()),
            catalog,
            tenant_header: config.resolution.tenant_header.to_lowercase(),
        }
    }

    pub fn classifier(&self) -> &PathClassifier {
        &self.classifier
    }

    pub fn enforcer(&self) -> &PlanEnforcer {
        &self.enforcer
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    /// Lowercase name of the tenant header.
    pub fn tenant_header(&self) -> &str {
        &self.tenant_header
    }

    /// Decide how the request may proceed.
    pub async fn admit(&self, request: &RequestDescriptor) -> TenancyResult<Admission> {
        let class = self
            .classifier
            .classify(request.method.as_deref(), &request.path);
        if class == RouteClass::TenantFree {
            return Ok(Admission::Bypass);
        }

        let candidate = self.resolver.resolve(request).await.map_err(|e| {
            tracing::error!(error = %e, path = %request.path, "Tenant resolution failed");
            reject(TenancyError::from(e))
        })?;

        let Some(candidate) = candidate else {
            if class == RouteClass::Public {
                return Ok(Admission::Anonymous);
            }
            tracing::info!(path = %request.path, "No tenant identified for protected route");
            return Err(reject(TenancyError::TenantNotIdentified));
        };

        let verdict = self
            .validator
            .validate(&candidate.tenant_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, tenant_id = %candidate.tenant_id, "Tenant validation failed");
                reject(TenancyError::from(e))
            })?;

        match verdict {
            ValidationVerdict::Valid(tenant) => {
                let ctx = TenantContext::from_tenant(&tenant, &self.catalog);
                tracing::debug!(
                    tenant_id = %ctx.tenant_id,
                    plan = %ctx.plan_type,
                    source = %candidate.source,
                    "Tenant admitted"
                );
                Ok(Admission::Scoped(Arc::new(ctx)))
            }
            ValidationVerdict::Invalid(reason) => Err(reject(TenancyError::TenantInvalid(reason))),
        }
    }

    /// Admit the request, then drive `work` inside the tenant scope.
    ///
    /// The scope is torn down however `work` ends, including when the
    /// returned future is dropped.
    pub async fn run<F>(&self, request: &RequestDescriptor, work: F) -> TenancyResult<F::Output>
    where
        F: Future,
    {
        match self.admit(request).await? {
            Admission::Scoped(ctx) => Ok(context::enter_scope(ctx, work).await),
            Admission::Bypass | Admission::Anonymous => Ok(work.await),
        }
    }
}

fn reject(err: TenancyError) -> TenancyError {
    metrics::record_rejection(err.code());
    err
}
