//! Tenant records, the per-request context, and request descriptors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::plans::{PlanCatalog, PlanSubject, PlanType};

/// Settings key holding per-tenant feature overrides (`{name: bool}`).
pub const FEATURE_OVERRIDES_KEY: &str = "features";

/// Lifecycle status of a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenantStatus {
    Active,
    Trial,
    Suspended,
    Cancelled,
}

impl TenantStatus {
    /// Suspended and cancelled tenants are never usable.
    pub fn is_deactivated(&self) -> bool {
        matches!(self, TenantStatus::Suspended | TenantStatus::Cancelled)
    }
}

/// Persisted tenant record, read-only for this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: String,
    pub slug: String,
    pub status: TenantStatus,
    #[serde(default)]
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub plan_type: PlanType,
    #[serde(default)]
    pub settings: HashMap<String, serde_json::Value>,
}

impl Tenant {
    /// Feature overrides stored under `settings.features`.
    ///
    /// Non-boolean entries are ignored.
    pub fn feature_overrides(&self) -> impl Iterator<Item = (&str, bool)> {
        self.settings
            .get(FEATURE_OVERRIDES_KEY)
            .and_then(|v| v.as_object())
            .into_iter()
            .flat_map(|map| map.iter())
            .filter_map(|(name, value)| value.as_bool().map(|b| (name.as_str(), b)))
    }
}

impl PlanSubject for Tenant {
    fn plan_type(&self) -> PlanType {
        self.plan_type
    }

    fn feature_override(&self, name: &str) -> Option<bool> {
        self.settings
            .get(FEATURE_OVERRIDES_KEY)
            .and_then(|v| v.get(name))
            .and_then(|v| v.as_bool())
    }
}

/// Ambient identity of the tenant a request runs for.
///
/// Built once per request after resolution and validation; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantContext {
    pub tenant_id: String,
    pub slug: Option<String>,
    pub plan_type: PlanType,
    /// Effective feature set: plan features plus tenant overrides.
    pub features: BTreeSet<String>,
}

impl TenantContext {
    pub fn new(
        tenant_id: impl Into<String>,
        slug: Option<String>,
        plan_type: PlanType,
        features: BTreeSet<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            slug,
            plan_type,
            features,
        }
    }

    /// Build the context for a validated tenant.
    pub fn from_tenant(tenant: &Tenant, catalog: &PlanCatalog) -> Self {
        let mut features = catalog.enabled_features(tenant.plan_type);
        for (name, enabled) in tenant.feature_overrides() {
            if enabled {
                features.insert(name.to_string());
            } else {
                features.remove(name);
            }
        }

        let slug = (!tenant.slug.is_empty()).then(|| tenant.slug.clone());
        Self::new(tenant.id.clone(), slug, tenant.plan_type, features)
    }

    pub fn has_feature(&self, name: &str) -> bool {
        self.features.contains(name)
    }
}

impl PlanSubject for TenantContext {
    fn plan_type(&self) -> PlanType {
        self.plan_type
    }

    // The feature set is already effective, so it is authoritative.
    fn feature_override(&self, name: &str) -> Option<bool> {
        Some(self.features.contains(name))
    }
}

/// Principal established by the external authentication layer.
///
/// Inserted into request extensions before the tenant middleware runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedPrincipal {
    pub subject: String,
    pub tenant_id: Option<String>,
}

impl AuthenticatedPrincipal {
    pub fn new(subject: impl Into<String>, tenant_id: Option<String>) -> Self {
        Self {
            subject: subject.into(),
            tenant_id,
        }
    }
}

/// Framework-independent view of an inbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Raw `Host` header, possibly with a port.
    pub host: Option<String>,
    /// Raw tenant header value.
    pub tenant_header: Option<String>,
    pub principal: Option<AuthenticatedPrincipal>,
    /// HTTP method, used only for route-marker matching.
    pub method: Option<String>,
    pub path: String,
}

impl RequestDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_tenant_header(mut self, value: impl Into<String>) -> Self {
        self.tenant_header = Some(value.into());
        self
    }

    pub fn with_principal(mut self, principal: AuthenticatedPrincipal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

/// Strategy that produced a tenant candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Subdomain,
    Header,
    Principal,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionSource::Subdomain => "subdomain",
            ResolutionSource::Header => "header",
            ResolutionSource::Principal => "principal",
        }
    }
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tenant id picked by the resolver, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantCandidate {
    pub tenant_id: String,
    pub source: ResolutionSource,
}
