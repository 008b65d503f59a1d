//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the tenancy
//! layer. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::plans::catalog::{builtin_plans, PlanConfig};
use crate::plans::PlanType;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TenancyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Tenant resolution settings.
    pub resolution: ResolutionConfig,

    /// Declarative route markers.
    pub routes: Vec<RouteConfig>,

    /// Plan tier table. Defaults to the built-in catalog.
    pub plans: BTreeMap<PlanType, PlanConfig>,

    /// Tenant store settings.
    pub store: StoreConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            resolution: ResolutionConfig::default(),
            routes: Vec::new(),
            plans: builtin_plans(),
            store: StoreConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// How tenants are identified from requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Domains whose subdomains identify tenants (e.g., "glamo.app").
    pub base_domains: Vec<String>,

    /// Subdomain labels that never name a tenant.
    pub reserved_subdomains: Vec<String>,

    /// Header carrying a tenant id for unauthenticated callers.
    pub tenant_header: String,

    /// Path prefixes that never need a tenant (health, docs, static).
    pub tenant_free_paths: Vec<String>,

    /// Path prefixes allowed to run without a tenant (auth, signup).
    pub public_paths: Vec<String>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            base_domains: vec!["glamo.app".to_string()],
            reserved_subdomains: ["www", "api", "app", "admin", "dashboard"]
                .into_iter()
                .map(String::from)
                .collect(),
            tenant_header: "x-tenant-id".to_string(),
            tenant_free_paths: ["/health", "/docs", "/static"]
                .into_iter()
                .map(String::from)
                .collect(),
            public_paths: [
                "/api/v1/auth/register",
                "/api/v1/auth/login",
                "/api/v1/auth/forgot-password",
                "/api/v1/auth/reset-password",
                "/api/v1/invitations/accept",
                "/api/v1/tenants/signup",
                "/api/v1/tenants/check-slug",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Route marker configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging.
    pub name: String,

    /// Path prefix to match.
    pub path_prefix: String,

    /// HTTP methods the route applies to (empty = all).
    #[serde(default)]
    pub methods: Vec<String>,

    /// Route priority (higher = checked first).
    #[serde(default)]
    pub priority: u32,

    /// Run without tenant resolution.
    #[serde(default)]
    pub skip_tenant_check: bool,

    /// Feature the tenant's plan must include.
    #[serde(default)]
    pub required_feature: Option<String>,

    /// Limit checked before the handler runs.
    #[serde(default)]
    pub required_limit: Option<LimitRequirement>,
}

/// A plan limit a route consumes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LimitRequirement {
    /// Limit key in the plan table (e.g., "maxClients").
    pub resource: String,

    /// User-facing resource name (e.g., "clientes").
    pub label: String,
}

/// Tenant store configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file with tenant records loaded into the in-memory store.
    pub seed_path: Option<String>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total handling time) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TenancyConfig::default();
        assert_eq!(config.resolution.base_domains, vec!["glamo.app"]);
        assert_eq!(config.resolution.reserved_subdomains.len(), 5);
        assert_eq!(config.plans.len(), 4);
        assert!(config.routes.is_empty());
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let raw = r#"
            [resolution]
            base_domains = ["glamo.app", "glamo.com.br"]

            [[routes]]
            name = "clients-create"
            path_prefix = "/api/v1/clients"
            required_limit = { resource = "maxClients", label = "clientes" }
        "#;
        let config: TenancyConfig = toml::from_str(raw).unwrap();

        assert_eq!(config.resolution.base_domains.len(), 2);
        assert_eq!(config.resolution.tenant_header, "x-tenant-id");
        assert_eq!(config.plans.len(), 4);
        let limit = config.routes[0].required_limit.as_ref().unwrap();
        assert_eq!(limit.resource, "maxClients");
        assert_eq!(limit.label, "clientes");
    }

    #[test]
    fn test_plans_section_replaces_table() {
        let raw = r#"
            [plans.FREE]
            limits = { maxClients = 10 }
            features = { onlineBooking = true }
        "#;
        let config: TenancyConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.plans.len(), 1);
        assert_eq!(config.plans[&PlanType::Free].limits["maxClients"], 10);
    }
}
