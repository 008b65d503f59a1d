//! Plan tier and enforcement result types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel limit value meaning "no limit".
pub const UNLIMITED: i64 = -1;

/// Resource names used as limit keys.
pub mod limits {
    pub const MAX_USERS: &str = "maxUsers";
    pub const MAX_CLIENTS: &str = "maxClients";
    pub const MAX_APPOINTMENTS_PER_MONTH: &str = "maxAppointmentsPerMonth";
    pub const MAX_SERVICES: &str = "maxServices";
    pub const MAX_INTEGRATIONS: &str = "maxIntegrations";
    pub const MAX_WEBHOOKS: &str = "maxWebhooks";
}

/// Feature flag names.
pub mod features {
    pub const ONLINE_BOOKING: &str = "onlineBooking";
    pub const REPORTS: &str = "reports";
    pub const INTEGRATIONS: &str = "integrations";
    pub const MARKETING: &str = "marketing";
    pub const WEBHOOKS: &str = "webhooks";
    pub const API_ACCESS: &str = "apiAccess";
    pub const CUSTOM_BRANDING: &str = "customBranding";
    pub const MULTI_LOCATION: &str = "multiLocation";
}

/// Subscription tier of a tenant.
///
/// Serialized as `FREE`, `STARTER`, `PROFESSIONAL` or `ENTERPRISE`.
/// Unrecognized values deserialize to [`PlanType::Free`], the lowest tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum PlanType {
    Free,
    Starter,
    Professional,
    Enterprise,
}

impl PlanType {
    /// Every defined tier, lowest first.
    pub const ALL: [PlanType; 4] = [
        PlanType::Free,
        PlanType::Starter,
        PlanType::Professional,
        PlanType::Enterprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Free => "FREE",
            PlanType::Starter => "STARTER",
            PlanType::Professional => "PROFESSIONAL",
            PlanType::Enterprise => "ENTERPRISE",
        }
    }

    /// Strict parse; `None` for unknown tiers.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "FREE" => Some(PlanType::Free),
            "STARTER" => Some(PlanType::Starter),
            "PROFESSIONAL" => Some(PlanType::Professional),
            "ENTERPRISE" => Some(PlanType::Enterprise),
            _ => None,
        }
    }
}

impl From<String> for PlanType {
    fn from(value: String) -> Self {
        PlanType::parse(&value).unwrap_or_else(|| {
            tracing::warn!(plan = %value, "Unrecognized plan type, falling back to FREE");
            PlanType::Free
        })
    }
}

impl From<PlanType> for &'static str {
    fn from(plan: PlanType) -> Self {
        plan.as_str()
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LimitCheckResult {
    pub allowed: bool,
    /// Configured limit, `-1` when unlimited.
    pub limit: i64,
    pub current: u64,
}

impl LimitCheckResult {
    pub fn is_unlimited(&self) -> bool {
        self.limit == UNLIMITED
    }
}
