//! Multi-tenant request scoping for the Glamo platform.
//!
//! Identifies the tenant behind each request, validates it, carries its
//! identity through the async call tree, and enforces plan limits and
//! feature flags against it.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod plans;
pub mod routing;
pub mod tenancy;

pub use config::schema::TenancyConfig;
pub use error::{TenancyError, TenancyResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use plans::{PlanCatalog, PlanEnforcer, PlanType};
pub use tenancy::{TenantContext, TenantPipeline};
