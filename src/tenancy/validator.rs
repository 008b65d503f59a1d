//! Tenant lifecycle validation.
//!
//! # Responsibilities
//! - Load the tenant by id on every request
//! - Refuse missing, suspended, cancelled and expired-trial tenants
//!
//! # Design Decisions
//! - No caching across requests: a suspension must take effect on the
//!   very next request
//! - Deactivation is checked before anything else and is unconditional

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::{InvalidReason, RepositoryError};
use crate::tenancy::repository::TenantRepository;
use crate::tenancy::types::{Tenant, TenantStatus};

/// Result of validating a tenant id.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationVerdict {
    Valid(Tenant),
    Invalid(InvalidReason),
}

impl ValidationVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationVerdict::Valid(_))
    }

    pub fn tenant(&self) -> Option<&Tenant> {
        match self {
            ValidationVerdict::Valid(tenant) => Some(tenant),
            ValidationVerdict::Invalid(_) => None,
        }
    }

    pub fn reason(&self) -> Option<InvalidReason> {
        match self {
            ValidationVerdict::Valid(_) => None,
            ValidationVerdict::Invalid(reason) => Some(*reason),
        }
    }
}

/// Decide usability of an already loaded record at instant `now`.
pub fn verdict_for(tenant: Option<Tenant>, now: DateTime<Utc>) -> ValidationVerdict {
    let Some(tenant) = tenant else {
        return ValidationVerdict::Invalid(InvalidReason::NotFound);
    };

    if tenant.status.is_deactivated() {
        return ValidationVerdict::Invalid(InvalidReason::Deactivated);
    }

    if tenant.status == TenantStatus::Trial {
        if let Some(ends_at) = tenant.trial_ends_at {
            if ends_at < now {
                return ValidationVerdict::Invalid(InvalidReason::TrialExpired);
            }
        }
    }

    ValidationVerdict::Valid(tenant)
}

/// Validates tenant ids against the store.
#[derive(Clone)]
pub struct TenantValidator {
    repository: Arc<dyn TenantRepository>,
}

impl TenantValidator {
    pub fn new(repository: Arc<dyn TenantRepository>) -> Self {
        Self { repository }
    }

    pub async fn validate(&self, tenant_id: &str) -> Result<ValidationVerdict, RepositoryError> {
        self.validate_at(tenant_id, Utc::now()).await
    }

    pub async fn validate_at(
        &self,
        tenant_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ValidationVerdict, RepositoryError> {
        let tenant = self.repository.find_by_id(tenant_id).await?;
        let verdict = verdict_for(tenant, now);

        if let ValidationVerdict::Invalid(reason) = &verdict {
            tracing::info!(tenant_id = %tenant_id, reason = %reason, "Tenant rejected");
        }
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plans::PlanType;
    use crate::tenancy::repository::InMemoryTenantRepository;
    use chrono::Duration;
    use std::collections::HashMap;

    fn tenant(status: TenantStatus, trial_ends_at: Option<DateTime<Utc>>) -> Tenant {
        Tenant {
            id: "t-1".into(),
            slug: "salaoxyz".into(),
            status,
            trial_ends_at,
            plan_type: PlanType::Starter,
            settings: HashMap::new(),
        }
    }

    #[test]
    fn test_missing_tenant() {
        let verdict = verdict_for(None, Utc::now());
        assert_eq!(verdict.reason(), Some(InvalidReason::NotFound));
        assert!(verdict.tenant().is_none());
    }

    #[test]
    fn test_status_grid() {
        let now = Utc::now();
        let past = Some(now - Duration::days(1));
        let future = Some(now + Duration::days(1));

        for ends in [None, past, future] {
            for status in [TenantStatus::Suspended, TenantStatus::Cancelled] {
                let verdict = verdict_for(Some(tenant(status, ends)), now);
                assert_eq!(verdict.reason(), Some(InvalidReason::Deactivated));
            }
            assert!(verdict_for(Some(tenant(TenantStatus::Active, ends)), now).is_valid());
        }

        let expired = verdict_for(Some(tenant(TenantStatus::Trial, past)), now);
        assert_eq!(expired.reason(), Some(InvalidReason::TrialExpired));

        assert!(verdict_for(Some(tenant(TenantStatus::Trial, future)), now).is_valid());
        assert!(verdict_for(Some(tenant(TenantStatus::Trial, None)), now).is_valid());
    }

    #[test]
    fn test_trial_ending_exactly_now_is_valid() {
        let now = Utc::now();
        let verdict = verdict_for(Some(tenant(TenantStatus::Trial, Some(now))), now);
        assert!(verdict.is_valid());
    }

    #[tokio::test]
    async fn test_validate_reads_store_every_time() {
        let repo = InMemoryTenantRepository::new();
        repo.insert(tenant(TenantStatus::Active, None));
        let validator = TenantValidator::new(Arc::new(repo.clone()));

        let verdict = validator.validate("t-1").await.unwrap();
        assert_eq!(verdict.tenant().map(|t| t.slug.as_str()), Some("salaoxyz"));

        repo.insert(tenant(TenantStatus::Suspended, None));
        let verdict = validator.validate("t-1").await.unwrap();
        assert_eq!(verdict.reason(), Some(InvalidReason::Deactivated));

        let verdict = validator.validate("missing").await.unwrap();
        assert_eq!(verdict.reason(), Some(InvalidReason::NotFound));
    }
}
