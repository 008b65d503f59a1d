//! Plan enforcement.
//!
//! # Responsibilities
//! - Decide whether a feature is available to a subject
//! - Decide whether one more unit of a resource may be created
//! - Turn denials into `QuotaExceeded` / `FeatureUnavailable`
//!
//! # Design Decisions
//! - Pure policy: usage counts come from the caller
//! - Strict comparison: reaching the limit denies the next creation
//! - No locking between check and action; concurrent creations may
//!   overshoot a limit slightly (soft limits)

use std::sync::Arc;

use crate::error::{TenancyError, TenancyResult};
use crate::observability::metrics;
use crate::plans::catalog::PlanCatalog;
use crate::plans::types::{LimitCheckResult, PlanType, UNLIMITED};
use crate::tenancy::context;

/// Anything that can be checked against the plan catalog.
pub trait PlanSubject {
    /// Tier the subject is subscribed to.
    fn plan_type(&self) -> PlanType;

    /// Per-subject feature override, consulted before the catalog.
    fn feature_override(&self, _name: &str) -> Option<bool> {
        None
    }
}

impl PlanSubject for PlanType {
    fn plan_type(&self) -> PlanType {
        *self
    }
}

impl<T: PlanSubject + ?Sized> PlanSubject for Arc<T> {
    fn plan_type(&self) -> PlanType {
        (**self).plan_type()
    }

    fn feature_override(&self, name: &str) -> Option<bool> {
        (**self).feature_override(name)
    }
}

/// Applies the plan catalog to subjects.
#[derive(Debug, Clone)]
pub struct PlanEnforcer {
    catalog: Arc<PlanCatalog>,
}

impl PlanEnforcer {
    pub fn new(catalog: Arc<PlanCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    /// Whether the feature is enabled; undefined flags read as `false`.
    pub fn has_feature<S: PlanSubject + ?Sized>(&self, subject: &S, name: &str) -> bool {
        subject
            .feature_override(name)
            .or_else(|| self.catalog.feature(subject.plan_type(), name))
            .unwrap_or(false)
    }

    /// Check whether one more `resource` may be created given `current` usage.
    pub fn check_limit<S: PlanSubject + ?Sized>(
        &self,
        subject: &S,
        resource: &str,
        current: u64,
    ) -> LimitCheckResult {
        let plan = subject.plan_type();
        let limit = match self.catalog.limit(plan, resource) {
            Some(limit) => limit,
            None => {
                tracing::warn!(plan = %plan, resource = %resource, "Limit not defined for plan, denying");
                0
            }
        };

        let allowed = if limit == UNLIMITED {
            true
        } else {
            // Negative limits other than the sentinel never allow anything.
            u64::try_from(limit).map(|l| current < l).unwrap_or(false)
        };

        LimitCheckResult {
            allowed,
            limit,
            current,
        }
    }

    /// Fail with `QuotaExceeded` when the limit is reached.
    ///
    /// `label` is the user-facing resource name carried in the error.
    pub fn enforce_limit<S: PlanSubject + ?Sized>(
        &self,
        subject: &S,
        resource: &str,
        current: u64,
        label: &str,
    ) -> TenancyResult<()> {
        let result = self.check_limit(subject, resource, current);
        if result.allowed {
            return Ok(());
        }

        tracing::info!(
            plan = %subject.plan_type(),
            resource = %resource,
            current = result.current,
            limit = result.limit,
            "Plan limit reached"
        );
        metrics::record_quota_denied(resource);
        Err(TenancyError::QuotaExceeded {
            resource: label.to_string(),
            current: result.current,
            limit: result.limit,
        })
    }

    /// Fail with `FeatureUnavailable` when the feature is off.
    pub fn enforce_feature<S: PlanSubject + ?Sized>(
        &self,
        subject: &S,
        name: &str,
    ) -> TenancyResult<()> {
        if self.has_feature(subject, name) {
            return Ok(());
        }

        tracing::info!(plan = %subject.plan_type(), feature = %name, "Feature not in plan");
        metrics::record_feature_denied(name);
        Err(TenancyError::FeatureUnavailable {
            feature: name.to_string(),
        })
    }

    /// `enforce_feature` against the ambient tenant context.
    pub fn enforce_feature_current(&self, name: &str) -> TenancyResult<()> {
        let ctx = context::require_context()?;
        self.enforce_feature(&ctx, name)
    }

    /// `enforce_limit` against the ambient tenant context.
    pub fn enforce_limit_current(
        &self,
        resource: &str,
        current: u64,
        label: &str,
    ) -> TenancyResult<()> {
        let ctx = context::require_context()?;
        self.enforce_limit(&ctx, resource, current, label)
    }
}

impl Default for PlanEnforcer {
    fn default() -> Self {
        Self::new(Arc::new(PlanCatalog::builtin()))
    }
}
