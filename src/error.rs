//! Error taxonomy for tenant admission and plan enforcement.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Why a resolved tenant id was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// No tenant with that id exists.
    NotFound,
    /// Tenant is suspended or cancelled.
    Deactivated,
    /// Trial period ended.
    TrialExpired,
}

impl InvalidReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidReason::NotFound => "not found",
            InvalidReason::Deactivated => "deactivated",
            InvalidReason::TrialExpired => "trial expired",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures of the tenant store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Backend could not be reached.
    #[error("tenant store unavailable: {0}")]
    Unavailable(String),

    #[error("tenant store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tenant record could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors surfaced to request handlers.
///
/// None of these are retried internally; the caller has to change input
/// (another tenant, an upgraded plan) for the outcome to change.
#[derive(Debug, Error)]
pub enum TenancyError {
    /// No tenant could be resolved on a route that requires one.
    #[error("tenant not identified")]
    TenantNotIdentified,

    /// A tenant id was resolved but is not usable.
    #[error("tenant invalid: {0}")]
    TenantInvalid(InvalidReason),

    /// Creating one more `resource` would exceed the plan limit.
    #[error("quota exceeded for {resource}: {current}/{limit}")]
    QuotaExceeded {
        resource: String,
        current: u64,
        limit: i64,
    },

    /// The plan does not include the feature.
    #[error("feature unavailable: {feature}")]
    FeatureUnavailable { feature: String },

    /// Tenant store failure; requests fail closed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl TenancyError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            TenancyError::TenantNotIdentified => "tenant_not_identified",
            TenancyError::TenantInvalid(InvalidReason::NotFound) => "tenant_not_found",
            TenancyError::TenantInvalid(InvalidReason::Deactivated) => "tenant_deactivated",
            TenancyError::TenantInvalid(InvalidReason::TrialExpired) => "tenant_trial_expired",
            TenancyError::QuotaExceeded { .. } => "quota_exceeded",
            TenancyError::FeatureUnavailable { .. } => "feature_unavailable",
            TenancyError::Repository(_) => "internal_error",
        }
    }

    /// Localized (pt-BR) message safe to show to end users.
    ///
    /// Repository detail is never included.
    pub fn user_message(&self) -> String {
        match self {
            TenancyError::TenantNotIdentified => {
                "Não foi possível identificar a empresa desta requisição.".to_string()
            }
            TenancyError::TenantInvalid(InvalidReason::NotFound) => {
                "Empresa não encontrada.".to_string()
            }
            TenancyError::TenantInvalid(InvalidReason::Deactivated) => {
                "Esta conta está desativada. Entre em contato com o suporte.".to_string()
            }
            TenancyError::TenantInvalid(InvalidReason::TrialExpired) => {
                "Seu período de teste expirou. Escolha um plano para continuar.".to_string()
            }
            TenancyError::QuotaExceeded {
                resource,
                current,
                limit,
            } => format!(
                "Limite de {resource} atingido ({current}/{limit}). \
                 Faça upgrade do seu plano para continuar."
            ),
            TenancyError::FeatureUnavailable { feature } => format!(
                "O recurso '{feature}' não está disponível no seu plano. \
                 Faça upgrade para acessá-lo."
            ),
            TenancyError::Repository(_) => {
                "Erro interno. Tente novamente mais tarde.".to_string()
            }
        }
    }
}

/// Result type for tenancy operations.
pub type TenancyResult<T> = Result<T, TenancyError>;
