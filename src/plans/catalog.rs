//! Plan catalog: tier → limits and features.
//!
//! # Responsibilities
//! - Hold one `PlanConfig` per `PlanType`
//! - Provide the built-in table used when configuration does not override it
//! - Answer limit and feature lookups for a tier
//!
//! # Design Decisions
//! - Lookups are total: a tier missing from the table falls back to the
//!   lowest configured tier (validation rejects such tables at load time)
//! - Unknown resource or feature names are reported as `None`, leaving the
//!   deny decision to the enforcer

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::plans::types::{features, limits, PlanType, UNLIMITED};

/// Limits and features of one plan tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Resource name → maximum count, `-1` for unlimited.
    pub limits: BTreeMap<String, i64>,

    /// Feature name → enabled.
    pub features: BTreeMap<String, bool>,
}

impl PlanConfig {
    fn build(limit_values: &[(&str, i64)], enabled: &[&str]) -> Self {
        let limits = limit_values
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect();
        let features = ALL_FEATURES
            .iter()
            .map(|name| (name.to_string(), enabled.contains(name)))
            .collect();
        Self { limits, features }
    }

    pub fn limit(&self, resource: &str) -> Option<i64> {
        self.limits.get(resource).copied()
    }

    pub fn feature(&self, name: &str) -> Option<bool> {
        self.features.get(name).copied()
    }
}

const ALL_FEATURES: [&str; 8] = [
    features::ONLINE_BOOKING,
    features::REPORTS,
    features::INTEGRATIONS,
    features::MARKETING,
    features::WEBHOOKS,
    features::API_ACCESS,
    features::CUSTOM_BRANDING,
    features::MULTI_LOCATION,
];

/// Immutable table of plan configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalog {
    plans: BTreeMap<PlanType, PlanConfig>,
    empty: PlanConfig,
}

impl PlanCatalog {
    /// Build a catalog from an explicit table.
    pub fn new(plans: BTreeMap<PlanType, PlanConfig>) -> Self {
        Self {
            plans,
            empty: PlanConfig::default(),
        }
    }

    /// The built-in plan table.
    pub fn builtin() -> Self {
        Self::new(builtin_plans())
    }

    /// Configuration for a tier.
    pub fn plan(&self, tier: PlanType) -> &PlanConfig {
        match self.plans.get(&tier) {
            Some(config) => config,
            None => {
                tracing::warn!(plan = %tier, "Plan missing from catalog, using lowest tier");
                self.plans.values().next().unwrap_or(&self.empty)
            }
        }
    }

    pub fn limit(&self, tier: PlanType, resource: &str) -> Option<i64> {
        self.plan(tier).limit(resource)
    }

    pub fn feature(&self, tier: PlanType, name: &str) -> Option<bool> {
        self.plan(tier).feature(name)
    }

    /// Names of the features enabled for a tier.
    pub fn enabled_features(&self, tier: PlanType) -> BTreeSet<String> {
        self.plan(tier)
            .features
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Tiers that have no entry in this catalog.
    pub fn missing_tiers(&self) -> Vec<PlanType> {
        PlanType::ALL
            .into_iter()
            .filter(|tier| !self.plans.contains_key(tier))
            .collect()
    }

    /// True when at least one tier defines the resource.
    pub fn knows_resource(&self, resource: &str) -> bool {
        self.plans.values().any(|p| p.limits.contains_key(resource))
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlanType, &PlanConfig)> {
        self.plans.iter().map(|(tier, config)| (*tier, config))
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// The built-in tier table.
pub fn builtin_plans() -> BTreeMap<PlanType, PlanConfig> {
    use features::*;
    use limits::*;

    let mut plans = BTreeMap::new();
    plans.insert(
        PlanType::Free,
        PlanConfig::build(
            &[
                (MAX_USERS, 1),
                (MAX_CLIENTS, 50),
                (MAX_APPOINTMENTS_PER_MONTH, 100),
                (MAX_SERVICES, 10),
                (MAX_INTEGRATIONS, 0),
                (MAX_WEBHOOKS, 0),
            ],
            &[ONLINE_BOOKING],
        ),
    );
    plans.insert(
        PlanType::Starter,
        PlanConfig::build(
            &[
                (MAX_USERS, 3),
                (MAX_CLIENTS, 500),
                (MAX_APPOINTMENTS_PER_MONTH, 1000),
                (MAX_SERVICES, 50),
                (MAX_INTEGRATIONS, 1),
                (MAX_WEBHOOKS, 0),
            ],
            &[ONLINE_BOOKING, REPORTS, INTEGRATIONS],
        ),
    );
    plans.insert(
        PlanType::Professional,
        PlanConfig::build(
            &[
                (MAX_USERS, 10),
                (MAX_CLIENTS, 5000),
                (MAX_APPOINTMENTS_PER_MONTH, UNLIMITED),
                (MAX_SERVICES, UNLIMITED),
                (MAX_INTEGRATIONS, 5),
                (MAX_WEBHOOKS, 10),
            ],
            &[
                ONLINE_BOOKING,
                REPORTS,
                INTEGRATIONS,
                MARKETING,
                WEBHOOKS,
                API_ACCESS,
                CUSTOM_BRANDING,
            ],
        ),
    );
    plans.insert(
        PlanType::Enterprise,
        PlanConfig::build(
            &[
                (MAX_USERS, UNLIMITED),
                (MAX_CLIENTS, UNLIMITED),
                (MAX_APPOINTMENTS_PER_MONTH, UNLIMITED),
                (MAX_SERVICES, UNLIMITED),
                (MAX_INTEGRATIONS, UNLIMITED),
                (MAX_WEBHOOKS, UNLIMITED),
            ],
            &ALL_FEATURES,
        ),
    );
    plans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_total() {
        let catalog = PlanCatalog::builtin();
        assert!(catalog.missing_tiers().is_empty());
        for tier in PlanType::ALL {
            assert_eq!(catalog.plan(tier).limits.len(), 6);
            assert_eq!(catalog.plan(tier).features.len(), ALL_FEATURES.len());
        }
    }

    #[test]
    fn test_starter_values() {
        let catalog = PlanCatalog::builtin();
        assert_eq!(catalog.limit(PlanType::Starter, limits::MAX_CLIENTS), Some(500));
        assert_eq!(catalog.feature(PlanType::Starter, features::MARKETING), Some(false));
        assert_eq!(catalog.feature(PlanType::Starter, features::REPORTS), Some(true));
    }

    #[test]
    fn test_enterprise_everything_enabled() {
        let catalog = PlanCatalog::builtin();
        let enabled = catalog.enabled_features(PlanType::Enterprise);
        assert_eq!(enabled.len(), ALL_FEATURES.len());
        assert_eq!(catalog.limit(PlanType::Enterprise, limits::MAX_USERS), Some(UNLIMITED));
    }

    #[test]
    fn test_missing_tier_falls_back_to_lowest() {
        let mut plans = builtin_plans();
        plans.remove(&PlanType::Enterprise);
        let catalog = PlanCatalog::new(plans);

        assert_eq!(catalog.missing_tiers(), vec![PlanType::Enterprise]);
        assert_eq!(catalog.plan(PlanType::Enterprise), catalog.plan(PlanType::Free));
    }

    #[test]
    fn test_empty_catalog_has_no_limits() {
        let catalog = PlanCatalog::new(BTreeMap::new());
        assert_eq!(catalog.limit(PlanType::Free, limits::MAX_CLIENTS), None);
        assert!(catalog.enabled_features(PlanType::Free).is_empty());
    }

    #[test]
    fn test_knows_resource() {
        let catalog = PlanCatalog::builtin();
        assert!(catalog.knows_resource(limits::MAX_WEBHOOKS));
        assert!(!catalog.knows_resource("maxSpaceships"));
    }
}
