//! Tenant resolution and context subsystem.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor (host, tenant header, principal, path)
//!     → pipeline.rs (classify path via routing)
//!     → resolver.rs (subdomain > header > principal claim)
//!     → validator.rs (exists, not deactivated, trial not expired)
//!     → types.rs (TenantContext from tenant + plan catalog)
//!     → context.rs (task-local scope around the rest of the request)
//! ```
//!
//! # Design Decisions
//! - Resolution and validation are separate phases; an unauthenticated
//!   header is only a candidate until the validator has seen it
//! - Every tenant-bearing request re-reads the store (no cross-request cache)
//! - Context is never passed as a parameter; code reads it from the carrier

pub mod context;
pub mod pipeline;
pub mod repository;
pub mod resolver;
pub mod types;
pub mod validator;

pub use context::{
    current_context, current_features, current_plan_type, current_tenant_id, current_tenant_slug,
    enter_scope, enter_scope_sync, has_feature, has_tenant_context, require_context, spawn_scoped,
};
pub use pipeline::{Admission, TenantPipeline};
pub use repository::{InMemoryTenantRepository, InMemoryUsageCounter, TenantRepository, UsageCounter};
pub use resolver::TenantResolver;
pub use types::{
    AuthenticatedPrincipal, RequestDescriptor, ResolutionSource, Tenant, TenantCandidate,
    TenantContext, TenantStatus,
};
pub use validator::{TenantValidator, ValidationVerdict};
