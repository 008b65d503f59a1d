//! Route table and path classification.
//!
//! # Responsibilities
//! - Store compiled route markers
//! - Look up the markers for a path
//! - Classify a path as tenant-free, public or protected
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc, swapped whole on reload)
//! - O(n) prefix scan (acceptable for typical route counts)
//! - Explicit `None` rather than a silent default route

pub use crate::config::schema::LimitRequirement;

use crate::config::{ResolutionConfig, RouteConfig};
use crate::routing::matcher::{any_matches, PathPrefixMatcher};

/// Declarative per-route requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteRequirements {
    pub name: String,
    pub skip_tenant_check: bool,
    pub required_feature: Option<String>,
    pub required_limit: Option<LimitRequirement>,
}

impl From<&RouteConfig> for RouteRequirements {
    fn from(config: &RouteConfig) -> Self {
        Self {
            name: config.name.clone(),
            skip_tenant_check: config.skip_tenant_check,
            required_feature: config.required_feature.clone(),
            required_limit: config.required_limit.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    matcher: PathPrefixMatcher,
    /// Uppercase; empty matches every method.
    methods: Vec<String>,
    priority: u32,
    requirements: RouteRequirements,
}

impl CompiledRoute {
    fn matches(&self, method: Option<&str>, path: &str) -> bool {
        if !self.matcher.matches(path) {
            return false;
        }
        if self.methods.is_empty() {
            return true;
        }
        method.is_some_and(|m| self.methods.iter().any(|allowed| allowed.eq_ignore_ascii_case(m)))
    }
}

/// Ordered route markers, highest priority first.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    pub fn from_config(configs: &[RouteConfig]) -> Self {
        let mut routes: Vec<CompiledRoute> = configs
            .iter()
            .map(|config| CompiledRoute {
                matcher: PathPrefixMatcher::new(config.path_prefix.clone()),
                methods: config.methods.iter().map(|m| m.to_uppercase()).collect(),
                priority: config.priority,
                requirements: RouteRequirements::from(config),
            })
            .collect();

        // Stable sort keeps declaration order among equal priorities; longer
        // prefixes win ties between equal priorities.
        routes.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.matcher.prefix().len().cmp(&a.matcher.prefix().len()))
        });

        Self { routes }
    }

    /// Markers of the first route matching the method and path.
    pub fn match_route(&self, method: Option<&str>, path: &str) -> Option<&RouteRequirements> {
        self.routes
            .iter()
            .find(|route| route.matches(method, path))
            .map(|route| &route.requirements)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// How the tenant pipeline treats a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Never needs a tenant; resolution is skipped.
    TenantFree,
    /// May run without a tenant when none resolves.
    Public,
    /// Fails closed without a tenant.
    Protected,
}

/// Classifies paths using the allowlists and the route table.
#[derive(Debug, Clone, Default)]
pub struct PathClassifier {
    tenant_free: Vec<PathPrefixMatcher>,
    public: Vec<PathPrefixMatcher>,
    routes: RouteTable,
}

impl PathClassifier {
    pub fn new(resolution: &ResolutionConfig, routes: &[RouteConfig]) -> Self {
        Self {
            tenant_free: resolution
                .tenant_free_paths
                .iter()
                .map(PathPrefixMatcher::new)
                .collect(),
            public: resolution
                .public_paths
                .iter()
                .map(PathPrefixMatcher::new)
                .collect(),
            routes: RouteTable::from_config(routes),
        }
    }

    pub fn classify(&self, method: Option<&str>, path: &str) -> RouteClass {
        if any_matches(&self.tenant_free, path) {
            return RouteClass::TenantFree;
        }
        if self
            .routes
            .match_route(method, path)
            .is_some_and(|route| route.skip_tenant_check)
        {
            return RouteClass::TenantFree;
        }
        if any_matches(&self.public, path) {
            return RouteClass::Public;
        }
        RouteClass::Protected
    }

    pub fn requirements(&self, method: Option<&str>, path: &str) -> Option<&RouteRequirements> {
        self.routes.match_route(method, path)
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(name: &str, prefix: &str, priority: u32) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            path_prefix: prefix.into(),
            priority,
            ..Default::default()
        }
    }

    #[test]
    fn test_priority_and_prefix_ordering() {
        let mut marketing = route("marketing", "/api/v1/marketing", 0);
        marketing.required_feature = Some("marketing".into());
        let table = RouteTable::from_config(&[
            route("api", "/api", 0),
            marketing,
            route("override", "/api/v1/marketing/public", 10),
        ]);

        assert_eq!(table.len(), 3);
        assert_eq!(table.match_route(None, "/api/v1/marketing/public/x").unwrap().name, "override");
        let matched = table.match_route(Some("GET"), "/api/v1/marketing/campaigns").unwrap();
        assert_eq!(matched.name, "marketing");
        assert_eq!(matched.required_feature.as_deref(), Some("marketing"));
        assert_eq!(table.match_route(None, "/api/v1/clients").unwrap().name, "api");
        assert!(table.match_route(None, "/other").is_none());
    }

    #[test]
    fn test_method_filter() {
        let mut create = route("clients-create", "/api/v1/clients", 0);
        create.methods = vec!["post".into()];
        create.required_limit = Some(LimitRequirement {
            resource: "maxClients".into(),
            label: "clientes".into(),
        });
        let table = RouteTable::from_config(&[create]);

        assert!(table.match_route(Some("POST"), "/api/v1/clients").is_some());
        assert!(table.match_route(Some("GET"), "/api/v1/clients").is_none());
        assert!(table.match_route(None, "/api/v1/clients").is_none());
    }

    #[test]
    fn test_classification() {
        let mut webhook = route("webhook-in", "/api/v1/webhooks/inbound", 0);
        webhook.skip_tenant_check = true;
        let classifier = PathClassifier::new(&ResolutionConfig::default(), &[webhook]);

        assert_eq!(classifier.classify(None, "/health"), RouteClass::TenantFree);
        assert_eq!(classifier.classify(None, "/docs/openapi.json"), RouteClass::TenantFree);
        assert_eq!(classifier.classify(None, "/static/logo.png"), RouteClass::TenantFree);
        assert_eq!(classifier.classify(None, "/api/v1/webhooks/inbound/stripe"), RouteClass::TenantFree);
        assert_eq!(classifier.classify(None, "/api/v1/auth/login"), RouteClass::Public);
        assert_eq!(classifier.classify(None, "/api/v1/invitations/accept"), RouteClass::Public);
        assert_eq!(classifier.classify(None, "/api/v1/clients"), RouteClass::Protected);
        assert_eq!(classifier.classify(None, "/healthz"), RouteClass::Protected);
    }
}
