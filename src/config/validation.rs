//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (routes reference known limits and features)
//! - Validate value ranges (limits >= -1, timeouts > 0)
//! - Require a plan entry for every tier
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TenancyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::HeaderName;
use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::TenancyConfig;
use crate::plans::{PlanCatalog, PlanType, UNLIMITED};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("at least one base domain is required")]
    NoBaseDomains,

    #[error("invalid base domain '{0}'")]
    InvalidBaseDomain(String),

    #[error("reserved subdomain '{0}' must be a single lowercase label")]
    InvalidReservedSubdomain(String),

    #[error("invalid tenant header name '{0}'")]
    InvalidTenantHeader(String),

    #[error("{section} path '{path}' must start with '/'")]
    InvalidPath { section: &'static str, path: String },

    #[error("route '{0}' has an empty name or invalid path prefix")]
    InvalidRoute(String),

    #[error("duplicate route name '{0}'")]
    DuplicateRoute(String),

    #[error("route '{route}' requires unknown feature '{feature}'")]
    UnknownFeature { route: String, feature: String },

    #[error("route '{route}' requires unknown limit '{resource}'")]
    UnknownResource { route: String, resource: String },

    #[error("route '{0}' skips the tenant check but requires a feature or limit")]
    TenantFreeRouteWithRequirement(String),

    #[error("no plan configured for tier {0}")]
    MissingPlan(PlanType),

    #[error("plan {plan} limit '{resource}' is {value}; use -1 for unlimited")]
    InvalidLimit {
        plan: PlanType,
        resource: String,
        value: i64,
    },

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &TenancyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    validate_resolution(config, &mut errors);
    validate_plans(config, &mut errors);
    validate_routes(config, &mut errors);

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_resolution(config: &TenancyConfig, errors: &mut Vec<ValidationError>) {
    let resolution = &config.resolution;

    if resolution.base_domains.is_empty() {
        errors.push(ValidationError::NoBaseDomains);
    }
    for domain in &resolution.base_domains {
        let bad = domain.is_empty()
            || domain.starts_with('.')
            || domain.contains(':')
            || domain.contains('/')
            || domain.chars().any(char::is_whitespace);
        if bad {
            errors.push(ValidationError::InvalidBaseDomain(domain.clone()));
        }
    }

    for label in &resolution.reserved_subdomains {
        if label.is_empty() || label.contains('.') || *label != label.to_lowercase() {
            errors.push(ValidationError::InvalidReservedSubdomain(label.clone()));
        }
    }

    if HeaderName::from_bytes(resolution.tenant_header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidTenantHeader(
            resolution.tenant_header.clone(),
        ));
    }

    let sections = [
        ("tenant_free", &resolution.tenant_free_paths),
        ("public", &resolution.public_paths),
    ];
    for (section, paths) in sections {
        for path in paths.iter().filter(|p| !p.starts_with('/')) {
            errors.push(ValidationError::InvalidPath {
                section,
                path: path.clone(),
            });
        }
    }
}

fn validate_plans(config: &TenancyConfig, errors: &mut Vec<ValidationError>) {
    for tier in PlanType::ALL {
        if !config.plans.contains_key(&tier) {
            errors.push(ValidationError::MissingPlan(tier));
        }
    }

    for (plan, plan_config) in &config.plans {
        for (resource, value) in &plan_config.limits {
            if *value < UNLIMITED {
                errors.push(ValidationError::InvalidLimit {
                    plan: *plan,
                    resource: resource.clone(),
                    value: *value,
                });
            }
        }
    }
}

fn validate_routes(config: &TenancyConfig, errors: &mut Vec<ValidationError>) {
    let catalog = PlanCatalog::new(config.plans.clone());
    let known_features: HashSet<&str> = config
        .plans
        .values()
        .flat_map(|p| p.features.keys())
        .map(String::as_str)
        .collect();

    let mut names = HashSet::new();
    for route in &config.routes {
        if route.name.is_empty() || !route.path_prefix.starts_with('/') {
            errors.push(ValidationError::InvalidRoute(route.name.clone()));
        }
        if !route.name.is_empty() && !names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRoute(route.name.clone()));
        }
        // Requirements are enforced against the tenant, which a tenant-free
        // route never has.
        if route.skip_tenant_check
            && (route.required_feature.is_some() || route.required_limit.is_some())
        {
            errors.push(ValidationError::TenantFreeRouteWithRequirement(
                route.name.clone(),
            ));
        }
        if let Some(feature) = &route.required_feature {
            if !known_features.contains(feature.as_str()) {
                errors.push(ValidationError::UnknownFeature {
                    route: route.name.clone(),
                    feature: feature.clone(),
                });
            }
        }
        if let Some(limit) = &route.required_limit {
            if !catalog.knows_resource(&limit.resource) {
                errors.push(ValidationError::UnknownResource {
                    route: route.name.clone(),
                    resource: limit.resource.clone(),
                });
            }
        }
    }
}
